// src/config.rs
//! Engine configuration: which duplicate-suppression strategy runs and with
//! what thresholds, plus the ledger file location. Loaded from TOML with an
//! env-var path override; a missing file means defaults.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "config/orders.toml";
pub const ENV_CONFIG_PATH: &str = "ORDERS_CONFIG_PATH";

/// Which duplicate-suppression strategy the query path uses. The two are
/// functionally distinct and must never be mixed within one report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupMode {
    /// Fuzzy start-phrase matching, 12h window (canonical).
    Fuzzy,
    /// Exact `(paid_amount, body_count)` key, 2h window (coarse fallback).
    Key,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_dedup_mode")]
    pub dedup_mode: DedupMode,
    /// Duplicate when similarity is strictly above this (0..100 scale).
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,
    /// Fuzzy-strategy repost window, hours.
    #[serde(default = "default_fuzzy_window_hours")]
    pub fuzzy_window_hours: i64,
    /// Key-strategy repost window, hours.
    #[serde(default = "default_key_window_hours")]
    pub key_window_hours: i64,
    #[serde(default = "default_ledger_path")]
    pub ledger_path: String,
}

fn default_dedup_mode() -> DedupMode {
    DedupMode::Fuzzy
}
fn default_similarity_threshold() -> f64 {
    92.0
}
fn default_fuzzy_window_hours() -> i64 {
    12
}
fn default_key_window_hours() -> i64 {
    2
}
fn default_ledger_path() -> String {
    "orders.json".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dedup_mode: default_dedup_mode(),
            similarity_threshold: default_similarity_threshold(),
            fuzzy_window_hours: default_fuzzy_window_hours(),
            key_window_hours: default_key_window_hours(),
            ledger_path: default_ledger_path(),
        }
    }
}

impl EngineConfig {
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading engine config from {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("parsing engine config {}", path.display()))
    }

    /// Load using env var + fallbacks:
    /// 1) $ORDERS_CONFIG_PATH (must exist if set)
    /// 2) config/orders.toml
    /// 3) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            }
            return Err(anyhow!("ORDERS_CONFIG_PATH points to non-existent path"));
        }
        let default = PathBuf::from(DEFAULT_CONFIG_PATH);
        if default.exists() {
            return Self::load_from(&default);
        }
        Ok(Self::default())
    }
}
