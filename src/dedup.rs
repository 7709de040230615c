// src/dedup.rs
//! # Duplicate Suppressor
//! Collapses near-duplicate reposts of the same job offer within one
//! address. Two interchangeable strategies sit behind [`Suppressor`]:
//!
//! - **Fuzzy** (canonical): a repost is recognized by its shift-start phrase
//!   being almost the same text (similarity strictly above the threshold,
//!   token order and case ignored) within a 12h window. A recognized repost
//!   refreshes the matched entry's timestamp and phrase, so a chain of
//!   reposts keeps collapsing as long as each link stays inside the window.
//! - **Key**: a repost is an exact `(paid_amount, body_count)` match within
//!   a 2h window. Coarser, for data recorded without start phrases.
//!
//! One suppressor instance walks one address's in-window postings in arrival
//! order; `admit` returns whether the posting counts as a distinct offer.
//!
//! Similarity: `strsim::normalized_levenshtein` over lower-cased,
//! token-sorted text, scaled to 0..100.

use std::collections::HashMap;

use chrono::{Duration, NaiveDateTime};
use strsim::normalized_levenshtein;

use crate::config::{DedupMode, EngineConfig};
use crate::ledger::Posting;

/// Case-insensitive, token-order-tolerant similarity in `[0.0, 100.0]`.
pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    normalized_levenshtein(&token_sort_key(a), &token_sort_key(b)) * 100.0
}

fn token_sort_key(s: &str) -> String {
    let mut tokens: Vec<String> = s.split_whitespace().map(str::to_lowercase).collect();
    tokens.sort();
    tokens.join(" ")
}

pub trait Suppressor {
    /// Feed one in-window posting in arrival order. `true` means the posting
    /// represents a distinct offer and is forwarded to aggregation.
    fn admit(&mut self, posting: &Posting) -> bool;
}

/// Fresh suppressor for one address walk, per the configured strategy.
pub fn suppressor_for(config: &EngineConfig) -> Box<dyn Suppressor> {
    match config.dedup_mode {
        DedupMode::Fuzzy => Box::new(FuzzyStartSuppressor::new(
            config.similarity_threshold,
            Duration::hours(config.fuzzy_window_hours),
        )),
        DedupMode::Key => Box::new(KeyWindowSuppressor::new(Duration::hours(
            config.key_window_hours,
        ))),
    }
}

pub struct FuzzyStartSuppressor {
    threshold: f64,
    window: Duration,
    /// Accepted offers so far: `(datetime, start phrase)` in acceptance order.
    accepted: Vec<(NaiveDateTime, String)>,
}

impl FuzzyStartSuppressor {
    pub fn new(threshold: f64, window: Duration) -> Self {
        Self {
            threshold,
            window,
            accepted: Vec::new(),
        }
    }
}

impl Suppressor for FuzzyStartSuppressor {
    fn admit(&mut self, posting: &Posting) -> bool {
        // Postings recorded without a start phrase carry nothing to match on.
        let Some(phrase) = posting.start.as_deref() else {
            return true;
        };

        let mut best: Option<(usize, f64)> = None;
        for (idx, (_, accepted_phrase)) in self.accepted.iter().enumerate() {
            let sim = token_sort_ratio(phrase, accepted_phrase);
            if best.map_or(true, |(_, b)| sim > b) {
                best = Some((idx, sim));
            }
        }

        if let Some((idx, sim)) = best {
            let gap = (posting.datetime - self.accepted[idx].0).abs();
            // Strict > on similarity: exactly-at-threshold is distinct.
            if sim > self.threshold && gap < self.window {
                self.accepted.remove(idx);
                self.accepted.push((posting.datetime, phrase.to_string()));
                return false;
            }
        }

        self.accepted.push((posting.datetime, phrase.to_string()));
        true
    }
}

pub struct KeyWindowSuppressor {
    window: Duration,
    last_seen: HashMap<(u32, u32), NaiveDateTime>,
}

impl KeyWindowSuppressor {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_seen: HashMap::new(),
        }
    }
}

impl Suppressor for KeyWindowSuppressor {
    fn admit(&mut self, posting: &Posting) -> bool {
        let key = (posting.paid_amount, posting.body_count);
        let duplicate = self
            .last_seen
            .get(&key)
            .is_some_and(|prev| (posting.datetime - *prev).abs() < self.window);
        // The key's timestamp refreshes on every sighting, duplicate or not.
        self.last_seen.insert(key, posting.datetime);
        !duplicate
    }
}
