// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod aggregate;
pub mod api;
pub mod config;
pub mod dedup;
pub mod ledger;
pub mod metrics;
pub mod parse;
pub mod report;
pub mod storage;
pub mod window;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, AppState};
pub use crate::config::{DedupMode, EngineConfig};
pub use crate::ledger::{Ledger, Posting};
pub use crate::report::{generate_report, RenderedReport, ReportFormat};
pub use crate::window::ReportWindow;
