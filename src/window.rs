// src/window.rs
//! # Report Window
//! The time range a report query is scoped to: preset ranges ("last 24h",
//! "last 7 days") or an explicit operator-supplied date pair.

use anyhow::{bail, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime, Utc};

/// Operator-facing date format for custom ranges.
pub const DATE_FMT: &str = "%d-%m-%Y";

/// Inclusive time range used to filter postings by ingestion timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl ReportWindow {
    /// Last 24 hours, ending now.
    pub fn last_day() -> Self {
        let now = now_naive();
        Self {
            start: now - Duration::days(1),
            end: now,
        }
    }

    /// Last 7 days, ending now.
    pub fn last_week() -> Self {
        let now = now_naive();
        Self {
            start: now - Duration::weeks(1),
            end: now,
        }
    }

    /// Explicit range. Rejects `end < start`; equal dates are a one-day
    /// window once the end is extended to end-of-day.
    pub fn custom(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self> {
        if end < start {
            bail!("end date must not precede start date");
        }
        Ok(Self { start, end })
    }

    /// Parse a preset selector as entered by the operator.
    pub fn from_preset(selector: &str) -> Result<Self> {
        match selector {
            "day" => Ok(Self::last_day()),
            "week" => Ok(Self::last_week()),
            other => bail!("unknown report range selector: {other:?}"),
        }
    }

    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        self.start <= ts && ts <= self.end
    }
}

/// Parse an operator-entered `DD-MM-YYYY` date.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FMT)
        .map_err(|e| anyhow::anyhow!("invalid date {s:?} (expected DD-MM-YYYY): {e}"))
}

/// Expand a pair of operator dates to a full-day inclusive window
/// (`start` 00:00:00 through `end` 23:59:59).
pub fn day_span(start: NaiveDate, end: NaiveDate) -> Result<ReportWindow> {
    let start = start.and_time(chrono::NaiveTime::MIN);
    let end = end.and_hms_opt(23, 59, 59).expect("static wall-clock time");
    ReportWindow::custom(start, end)
}

fn now_naive() -> NaiveDateTime {
    Utc::now().naive_utc()
}
