// src/api.rs
//! HTTP surface: the ingestion callback consumed from the account-supervision
//! collaborator (`POST /ingest`) and the query interface exposed to the
//! front-end collaborator (`GET /report`, `GET /export`, `GET /sources`).

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{NaiveDateTime, Utc};
use metrics::{counter, gauge};
use tower_http::cors::CorsLayer;

use crate::config::EngineConfig;
use crate::ledger::{Ledger, Posting, DATETIME_FMT};
use crate::parse::parse_posting;
use crate::report::{self, generate_report, ReportFormat, ReportRow, RenderedReport};
use crate::window::{day_span, parse_date, ReportWindow};

#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<Ledger>,
    pub config: Arc<EngineConfig>,
}

pub fn create_router(state: AppState) -> Router {
    crate::metrics::ensure_metrics_described();
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/ingest", post(ingest))
        .route("/sources", get(list_sources))
        .route("/report", get(report_query))
        .route("/export", get(export_csv))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(serde::Deserialize)]
struct IngestReq {
    source_id: String,
    display_name: String,
    text: String,
    /// Ingestion timestamp override (fixed ledger pattern); defaults to now.
    #[serde(default)]
    observed_at: Option<String>,
}

#[derive(serde::Serialize)]
struct IngestResp {
    stored: bool,
}

/// Ingestion callback. Non-posting text is swallowed, never an error:
/// malformed chat noise is the common case, not the exception.
async fn ingest(
    State(state): State<AppState>,
    Json(body): Json<IngestReq>,
) -> Result<Json<IngestResp>, (StatusCode, String)> {
    let observed_at = match &body.observed_at {
        Some(raw) => NaiveDateTime::parse_from_str(raw, DATETIME_FMT)
            .map_err(|e| (StatusCode::UNPROCESSABLE_ENTITY, format!("invalid observed_at: {e}")))?,
        None => Utc::now().naive_utc(),
    };

    let Some(parsed) = parse_posting(&body.text) else {
        counter!("orders_skipped_total").increment(1);
        return Ok(Json(IngestResp { stored: false }));
    };

    let posting = Posting {
        body_count: parsed.body_count,
        paid_amount: parsed.paid_amount,
        datetime: observed_at,
        start: parsed.start,
    };
    state
        .ledger
        .record(
            &body.source_id,
            &body.display_name,
            &parsed.city,
            &parsed.address,
            posting,
        )
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("{e:#}")))?;

    counter!("orders_ingested_total").increment(1);
    gauge!("ledger_sources").set(state.ledger.source_count() as f64);
    tracing::info!(
        target: "ingest",
        source = %body.source_id,
        city = %parsed.city,
        "posting recorded"
    );
    Ok(Json(IngestResp { stored: true }))
}

#[derive(serde::Serialize)]
struct SourceOut {
    source_id: String,
    display_name: String,
}

async fn list_sources(State(state): State<AppState>) -> Json<Vec<SourceOut>> {
    let out = state
        .ledger
        .list_sources()
        .into_iter()
        .map(|(source_id, display_name)| SourceOut {
            source_id,
            display_name,
        })
        .collect();
    Json(out)
}

#[derive(serde::Deserialize)]
struct ReportQuery {
    source: String,
    /// "day" | "week"
    range: String,
    /// "text" (default) | "rows"
    #[serde(default)]
    format: Option<String>,
}

#[derive(serde::Serialize)]
struct ReportResp {
    status: &'static str, // "ok" | "empty"
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rows: Option<Vec<ReportRow>>,
}

/// Preset-range report. Unknown selectors are the operator's "invalid input,
/// retry" outcome; an unknown source is simply an empty report.
async fn report_query(
    State(state): State<AppState>,
    Query(q): Query<ReportQuery>,
) -> Result<Json<ReportResp>, (StatusCode, String)> {
    let window = ReportWindow::from_preset(&q.range)
        .map_err(|e| (StatusCode::UNPROCESSABLE_ENTITY, format!("{e:#}")))?;
    let format: ReportFormat = q
        .format
        .as_deref()
        .unwrap_or("text")
        .parse()
        .map_err(|e: anyhow::Error| (StatusCode::UNPROCESSABLE_ENTITY, format!("{e:#}")))?;

    let rendered = state
        .ledger
        .snapshot(&q.source)
        .and_then(|rec| generate_report(&rec.streets, &window, &state.config, format));

    Ok(Json(match rendered {
        Some(RenderedReport::Text(text)) => {
            counter!("reports_generated_total").increment(1);
            ReportResp {
                status: "ok",
                text: Some(text),
                rows: None,
            }
        }
        Some(RenderedReport::Rows(rows)) => {
            counter!("reports_generated_total").increment(1);
            ReportResp {
                status: "ok",
                text: None,
                rows: Some(rows),
            }
        }
        None => {
            counter!("reports_empty_total").increment(1);
            ReportResp {
                status: "empty",
                text: None,
                rows: None,
            }
        }
    }))
}

#[derive(serde::Deserialize)]
struct ExportQuery {
    source: String,
    /// DD-MM-YYYY
    start: String,
    /// DD-MM-YYYY
    end: String,
}

/// Custom-range CSV export. The file is written, transmitted, and deleted in
/// one request; 204 is the empty-report signal.
async fn export_csv(
    State(state): State<AppState>,
    Query(q): Query<ExportQuery>,
) -> Result<(StatusCode, [(&'static str, &'static str); 1], String), (StatusCode, String)> {
    let invalid = |e: anyhow::Error| (StatusCode::UNPROCESSABLE_ENTITY, format!("{e:#}"));
    let start = parse_date(&q.start).map_err(invalid)?;
    let end = parse_date(&q.end).map_err(invalid)?;
    let window = day_span(start, end).map_err(invalid)?;

    let display_name;
    let rendered = match state.ledger.snapshot(&q.source) {
        Some(rec) => {
            display_name = rec.display_name.clone();
            generate_report(&rec.streets, &window, &state.config, ReportFormat::Rows)
        }
        None => {
            display_name = q.source.clone();
            None
        }
    };

    let Some(RenderedReport::Rows(rows)) = rendered else {
        counter!("reports_empty_total").increment(1);
        return Ok((
            StatusCode::NO_CONTENT,
            [("content-type", "text/csv; charset=utf-8")],
            String::new(),
        ));
    };

    let path = report::write_csv(&std::env::temp_dir(), &display_name, &window, &rows)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("{e:#}")))?;
    let body = std::fs::read_to_string(&path)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("{e:#}")))?;
    let _ = std::fs::remove_file(&path);

    counter!("reports_generated_total").increment(1);
    Ok((
        StatusCode::OK,
        [("content-type", "text/csv; charset=utf-8")],
        body,
    ))
}
