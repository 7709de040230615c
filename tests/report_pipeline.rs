// tests/report_pipeline.rs
// End-to-end: raw postings through the ledger, suppressor, aggregate, and
// text renderer, exercised the way a report query runs them.

use std::sync::Arc;

use chrono::NaiveDateTime;
use labor_order_analyzer::ledger::{Ledger, Posting, DATETIME_FMT};
use labor_order_analyzer::report::{generate_report, RenderedReport, ReportFormat};
use labor_order_analyzer::storage::MemoryStore;
use labor_order_analyzer::window::ReportWindow;
use labor_order_analyzer::{DedupMode, EngineConfig};

fn at(ts: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(ts, DATETIME_FMT).unwrap()
}

fn posting(bodies: u32, pay: u32, ts: &str, start: Option<&str>) -> Posting {
    Posting {
        body_count: bodies,
        paid_amount: pay,
        datetime: at(ts),
        start: start.map(str::to_string),
    }
}

fn august() -> ReportWindow {
    ReportWindow::custom(at("2026.08.01 00:00:00"), at("2026.08.31 23:59:59")).unwrap()
}

fn text_of(rendered: Option<RenderedReport>) -> String {
    match rendered {
        Some(RenderedReport::Text(t)) => t,
        other => panic!("expected a text report, got {other:?}"),
    }
}

#[test]
fn scenario_produces_the_exact_report_text() {
    let ledger = Ledger::open(Arc::new(MemoryStore::new())).unwrap();
    // Three offers at one address: 5 below the bar, two 9s. Demand 9+9 = 18,
    // price bucket = the max pay admitted there.
    let rows = [
        posting(5, 500, "2026.08.29 08:00:00", Some("tomorrow 8 am")),
        posting(9, 600, "2026.08.29 09:00:00", Some("friday 10 pm")),
        posting(9, 600, "2026.08.30 10:00:00", Some("saturday 6 am")),
    ];
    for p in rows {
        ledger
            .record("42", "Day Shifts", "Moscow", "Main St 1", p)
            .unwrap();
    }

    let rec = ledger.snapshot("42").unwrap();
    let text = text_of(generate_report(
        &rec.streets,
        &august(),
        &EngineConfig::default(),
        ReportFormat::Text,
    ));

    assert_eq!(
        text,
        "Moscow\n\
         600 per hour (1 requests)\n\
         Address: Main St 1 (18 people)\n\
         \n\
         Total postings (3)"
    );
}

#[test]
fn reposts_collapse_but_still_count_toward_the_raw_total() {
    let ledger = Ledger::open(Arc::new(MemoryStore::new())).unwrap();
    // Same offer pushed three times inside 12h: one distinct offer.
    for ts in [
        "2026.08.29 08:00:00",
        "2026.08.29 11:00:00",
        "2026.08.29 14:00:00",
    ] {
        ledger
            .record(
                "42",
                "Day Shifts",
                "Moscow",
                "Main St 1",
                posting(9, 600, ts, Some("tomorrow 8 am")),
            )
            .unwrap();
    }

    let rec = ledger.snapshot("42").unwrap();
    let text = text_of(generate_report(
        &rec.streets,
        &august(),
        &EngineConfig::default(),
        ReportFormat::Text,
    ));

    assert!(text.contains("Address: Main St 1 (9 people)"));
    assert!(text.contains("Total postings (3)"));
}

#[test]
fn repost_window_boundary_through_the_full_pipeline() {
    let config = EngineConfig::default();

    // 11h59m apart: the second sighting is a repost.
    let ledger = Ledger::open(Arc::new(MemoryStore::new())).unwrap();
    for ts in ["2026.08.29 08:00:00", "2026.08.29 19:59:00"] {
        ledger
            .record(
                "42",
                "Day Shifts",
                "Moscow",
                "Main St 1",
                posting(9, 600, ts, Some("tomorrow 8 am")),
            )
            .unwrap();
    }
    let rec = ledger.snapshot("42").unwrap();
    let text = text_of(generate_report(
        &rec.streets,
        &august(),
        &config,
        ReportFormat::Text,
    ));
    assert!(text.contains("(9 people)"));

    // 12h01m apart: two distinct offers, demand 18.
    let ledger = Ledger::open(Arc::new(MemoryStore::new())).unwrap();
    for ts in ["2026.08.29 08:00:00", "2026.08.29 20:01:00"] {
        ledger
            .record(
                "42",
                "Day Shifts",
                "Moscow",
                "Main St 1",
                posting(9, 600, ts, Some("tomorrow 8 am")),
            )
            .unwrap();
    }
    let rec = ledger.snapshot("42").unwrap();
    let text = text_of(generate_report(
        &rec.streets,
        &august(),
        &config,
        ReportFormat::Text,
    ));
    assert!(text.contains("(18 people)"));
}

#[test]
fn key_strategy_is_selectable_and_ignores_start_phrases() {
    let config = EngineConfig {
        dedup_mode: DedupMode::Key,
        ..EngineConfig::default()
    };

    let ledger = Ledger::open(Arc::new(MemoryStore::new())).unwrap();
    // Different phrases but the same (pay, bodies) key 1h apart: one offer
    // under the key strategy.
    let rows = [
        posting(9, 600, "2026.08.29 08:00:00", Some("tomorrow 8 am")),
        posting(9, 600, "2026.08.29 09:00:00", Some("completely different")),
    ];
    for p in rows {
        ledger
            .record("42", "Day Shifts", "Moscow", "Main St 1", p)
            .unwrap();
    }

    let rec = ledger.snapshot("42").unwrap();
    let text = text_of(generate_report(
        &rec.streets,
        &august(),
        &config,
        ReportFormat::Text,
    ));
    assert!(text.contains("Address: Main St 1 (9 people)"));
    assert!(text.contains("Total postings (2)"));
}
