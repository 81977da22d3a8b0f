//! Offline transaction dataset served when the remote API is unavailable

use std::collections::HashSet;
use std::path::Path;

use chrono::DateTime;
use rust_decimal::Decimal;

use crate::envelope::ResultEnvelope;
use crate::error::{CoreError, CoreResult};
use crate::models::TransactionRecord;

const BUNDLED_DATASET: &str = include_str!("../fixtures/transactions.json");

/// Immutable, ordered in-memory dataset
///
/// Loaded once at startup and shared read-only; request-time operations
/// cannot fail.
#[derive(Debug, Clone)]
pub struct FallbackStore {
    records: Vec<TransactionRecord>,
}

impl FallbackStore {
    /// Build a store, rejecting duplicate ids, negative amounts and bad timestamps
    pub fn new(records: Vec<TransactionRecord>) -> CoreResult<Self> {
        let mut seen = HashSet::new();
        for tx in &records {
            if !seen.insert(tx.id.as_str()) {
                return Err(invalid(format!("duplicate id '{}'", tx.id)));
            }
            if tx.amount < Decimal::ZERO {
                return Err(invalid(format!("negative amount {} in '{}'", tx.amount, tx.id)));
            }
            if DateTime::parse_from_rfc3339(&tx.created_at).is_err() {
                return Err(invalid(format!(
                    "created_at '{}' in '{}' is not an ISO-8601 timestamp",
                    tx.created_at, tx.id
                )));
            }
        }
        Ok(Self { records })
    }

    /// Parse a JSON array of records
    pub fn from_json(json: &str) -> CoreResult<Self> {
        let records: Vec<TransactionRecord> =
            serde_json::from_str(json).map_err(|e| invalid(e.to_string()))?;
        Self::new(records)
    }

    /// Load a JSON dataset from disk
    pub fn from_path(path: &Path) -> CoreResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| CoreError::IoError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json(&json)
    }

    /// The dataset compiled into the binary
    pub fn bundled() -> CoreResult<Self> {
        Self::from_json(BUNDLED_DATASET)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[TransactionRecord] {
        &self.records
    }

    /// One page of the unfiltered dataset
    pub fn list_page(&self, page: u64, per_page: u64) -> ResultEnvelope {
        ResultEnvelope::paginate(&self.records, page, per_page)
    }

    /// One page of the records matching `query` (case-insensitive substring
    /// over id, sender, receiver and cause), in dataset order.
    pub fn search_page(&self, query: &str, page: u64, per_page: u64) -> ResultEnvelope {
        let needle = query.to_lowercase();
        let filtered: Vec<TransactionRecord> = self
            .records
            .iter()
            .filter(|tx| tx.matches(&needle))
            .cloned()
            .collect();
        ResultEnvelope::paginate(&filtered, page, per_page).with_query(query)
    }
}

fn invalid(message: String) -> CoreError {
    CoreError::InvalidFixture { message }
}
