// src/parse.rs
//! Posting parser: extracts a structured order posting from raw chat text
//! via fixed field markers. Pure function, no state; anything that does not
//! match the full marker set is background noise, not an error.

use once_cell::sync::OnceCell;
use regex::Regex;

/// A posting as extracted from message text, before the ingestion
/// timestamp is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPosting {
    pub city: String,
    pub address: String,
    /// Staffing need: the Y of a "Needed X/Y" pattern (X is already filled).
    pub body_count: u32,
    /// Hourly pay.
    pub paid_amount: u32,
    /// Shift-start phrase, lower-cased; only used for fuzzy duplicate matching.
    pub start: Option<String>,
}

fn re_city() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"•\s*(.*?):").unwrap())
}

fn re_address() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"Address:\s*(?:👉\s*)?([^\n]+)").unwrap())
}

fn re_needed() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"Needed\s*(\d+)/(\d+)").unwrap())
}

fn re_pay() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"Pay:\s*(\d+)\s*per hour").unwrap())
}

fn re_start() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"Start:\s*([^\n]+)").unwrap())
}

/// Parse one raw message. Returns `None` unless every mandatory field
/// (city, address, needed count, pay) matches; the start phrase is optional.
pub fn parse_posting(text: &str) -> Option<ParsedPosting> {
    let city = re_city().captures(text)?.get(1)?.as_str().trim().to_string();
    let address = re_address()
        .captures(text)?
        .get(1)?
        .as_str()
        .trim()
        .to_string();
    let needed = re_needed().captures(text)?;
    let body_count: u32 = needed.get(2)?.as_str().parse().ok()?;
    let paid_amount: u32 = re_pay()
        .captures(text)?
        .get(1)?
        .as_str()
        .parse()
        .ok()?;
    let start = re_start()
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_lowercase())
        .filter(|s| !s.is_empty());

    if city.is_empty() || address.is_empty() {
        return None;
    }

    Some(ParsedPosting {
        city,
        address,
        body_count,
        paid_amount,
        start,
    })
}
