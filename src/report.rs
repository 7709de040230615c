// src/report.rs
//! # Report Renderer
//! Turns an aggregate into operator-facing output: a human-readable text
//! block or flat rows for export. Both are pure functions of the aggregate;
//! `None` is the explicit empty-report signal (no cities at all), which
//! callers must treat differently from rendered output.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::aggregate::{aggregate, Report};
use crate::config::EngineConfig;
use crate::ledger::Streets;
use crate::window::ReportWindow;

/// Output mode for the query interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Rows,
}

impl std::str::FromStr for ReportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "rows" => Ok(Self::Rows),
            other => Err(anyhow::anyhow!("unknown report format: {other:?}")),
        }
    }
}

/// A rendered report, or (via `None` from [`generate_report`]) the explicit
/// empty-report signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedReport {
    Text(String),
    Rows(Vec<ReportRow>),
}

/// Query interface: recompute the aggregate from a streets snapshot and
/// render it. `None` means the aggregate had no cities at all.
pub fn generate_report(
    streets: &Streets,
    window: &ReportWindow,
    config: &EngineConfig,
    format: ReportFormat,
) -> Option<RenderedReport> {
    let report = aggregate(streets, window, config);
    match format {
        ReportFormat::Text => render_text(&report).map(RenderedReport::Text),
        ReportFormat::Rows => render_rows(&report).map(RenderedReport::Rows),
    }
}

/// One exported row: either a price bucket or a surviving address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub city: String,
    pub data_type: &'static str, // "price" | "address"
    pub value: String,
    pub count: u32,
}

/// Human-readable report text. Per city: heading, price-bucket lines,
/// surviving-address lines, blank separator; then the posting total.
/// A city whose addresses were all filtered out still lists its prices.
pub fn render_text(report: &Report) -> Option<String> {
    if report.is_empty() {
        return None;
    }
    let mut lines = Vec::new();
    for (city, info) in &report.cities {
        lines.push(city.clone());
        for (price, count) in &info.unique_requests_by_price {
            lines.push(format!("{price} per hour ({count} requests)"));
        }
        for (address, people) in &info.address_with_people {
            lines.push(format!("Address: {address} ({people} people)"));
        }
        lines.push(String::new());
    }
    lines.push(format!("Total postings ({})", report.total_posting_count));
    Some(lines.join("\n"))
}

/// Flat rows for export: city iteration order, price buckets before
/// addresses. No summary row.
pub fn render_rows(report: &Report) -> Option<Vec<ReportRow>> {
    if report.is_empty() {
        return None;
    }
    let mut rows = Vec::new();
    for (city, info) in &report.cities {
        for (price, count) in &info.unique_requests_by_price {
            rows.push(ReportRow {
                city: city.clone(),
                data_type: "price",
                value: price.to_string(),
                count: *count,
            });
        }
        for (address, people) in &info.address_with_people {
            rows.push(ReportRow {
                city: city.clone(),
                data_type: "address",
                value: address.clone(),
                count: *people,
            });
        }
    }
    Some(rows)
}

/// Pipe-delimited document with a fixed header, UTF-8. Free-text fields
/// containing the delimiter, a quote, or a line break are quoted so they
/// cannot shift the column structure.
pub fn csv_document(rows: &[ReportRow]) -> String {
    let mut out = String::from("City|Data Type|Value|Count\n");
    for row in rows {
        out.push_str(&format!(
            "{}|{}|{}|{}\n",
            csv_field(&row.city),
            row.data_type,
            csv_field(&row.value),
            row.count
        ));
    }
    out
}

fn csv_field(raw: &str) -> String {
    if raw.contains(['|', '"', '\n', '\r']) {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}

/// Write the export file for one `(display_name, window)` query under `dir`.
/// The file is transient; the caller deletes it after transmission.
pub fn write_csv(
    dir: &Path,
    display_name: &str,
    window: &ReportWindow,
    rows: &[ReportRow],
) -> Result<PathBuf> {
    let file_name = format!(
        "report_{}_{}_{}.csv",
        display_name.replace(' ', ""),
        window.start.format("%d%m%Y"),
        window.end.format("%d%m%Y"),
    );
    let path = dir.join(file_name);
    fs::write(&path, csv_document(rows))
        .with_context(|| format!("writing CSV export {}", path.display()))?;
    Ok(path)
}
