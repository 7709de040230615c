// src/ledger.rs
//! # Order Ledger
//! Append-only store of postings grouped by source (a monitored chat), then
//! city, then address, in arrival order. Every write is flushed through the
//! backing [`LedgerStore`](crate::storage::LedgerStore) before returning.
//!
//! Insertion order is part of the contract at every level: the duplicate
//! suppressor walks per-address postings in arrival order, and report output
//! iterates cities/addresses in first-seen order. Hence `IndexMap` throughout.
//!
//! The persisted shape is fixed for compatibility with pre-existing data:
//! `{ source_id: { "chat_name": ..., "streets": { city: { address: [ {
//! body_count, paid_amount, datetime, start? } ] } } } }` with `datetime`
//! in the `YYYY.MM.DD HH:MM:SS` pattern.

use std::sync::{Arc, RwLock};

use anyhow::Result;
use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::storage::LedgerStore;

/// Fixed timestamp pattern used in the persisted ledger.
pub const DATETIME_FMT: &str = "%Y.%m.%d %H:%M:%S";

/// One stored advertisement instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub body_count: u32,
    pub paid_amount: u32,
    /// Ingestion timestamp (not the advertised shift time).
    #[serde(with = "datetime_codec")]
    pub datetime: NaiveDateTime,
    /// Lower-cased shift-start phrase; absent in the simplified parser mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
}

/// city → address → postings in arrival order.
pub type Streets = IndexMap<String, IndexMap<String, Vec<Posting>>>;

/// Everything recorded for one monitored source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRecord {
    #[serde(rename = "chat_name")]
    pub display_name: String,
    pub streets: Streets,
}

/// Full persisted ledger document: source_id → record.
pub type LedgerData = IndexMap<String, SourceRecord>;

/// Durable, append-only posting store. Writers serialize through the inner
/// lock; readers clone a snapshot and tolerate concurrent appends.
pub struct Ledger {
    inner: RwLock<LedgerData>,
    store: Arc<dyn LedgerStore>,
}

impl Ledger {
    /// Load existing data from the store (missing backing file reads as an
    /// empty ledger, see [`crate::storage::JsonFileStore`]).
    pub fn open(store: Arc<dyn LedgerStore>) -> Result<Self> {
        let data = store.load()?;
        Ok(Self {
            inner: RwLock::new(data),
            store,
        })
    }

    /// Append one posting under `city`/`address`, creating the
    /// source/city/address levels on demand, and flush the full ledger
    /// before returning.
    pub fn record(
        &self,
        source_id: &str,
        display_name: &str,
        city: &str,
        address: &str,
        posting: Posting,
    ) -> Result<()> {
        let mut data = self.inner.write().expect("ledger lock poisoned");
        let record = data
            .entry(source_id.to_string())
            .or_insert_with(|| SourceRecord {
                display_name: display_name.to_string(),
                streets: Streets::new(),
            });
        record
            .streets
            .entry(city.to_string())
            .or_default()
            .entry(address.to_string())
            .or_default()
            .push(posting);
        self.store.save(&data)
    }

    /// Read-only snapshot of one source's streets tree.
    pub fn snapshot(&self, source_id: &str) -> Option<SourceRecord> {
        let data = self.inner.read().expect("ledger lock poisoned");
        data.get(source_id).cloned()
    }

    /// `(source_id, display_name)` pairs in first-seen order.
    pub fn list_sources(&self) -> Vec<(String, String)> {
        let data = self.inner.read().expect("ledger lock poisoned");
        data.iter()
            .map(|(id, rec)| (id.clone(), rec.display_name.clone()))
            .collect()
    }

    pub fn source_count(&self) -> usize {
        self.inner.read().expect("ledger lock poisoned").len()
    }
}

mod datetime_codec {
    //! Serde codec for the fixed `YYYY.MM.DD HH:MM:SS` pattern.
    use super::DATETIME_FMT;
    use chrono::NaiveDateTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&dt.format(DATETIME_FMT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveDateTime::parse_from_str(&raw, DATETIME_FMT).map_err(serde::de::Error::custom)
    }
}
