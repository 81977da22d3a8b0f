//! Paginated result envelope shared by the live and fallback paths
//!
//! Both paths produce a [`ResultEnvelope`]; the only way to tell a degraded
//! response apart from a live one is the presence of `fallback`/`message`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::{discard, TransactionRecord};

/// Pagination window arithmetic (1-based pages, inclusive bounds)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    page: u64,
    per_page: u64,
    total: u64,
}

impl PageWindow {
    /// Build a window; `page` and `per_page` below 1 are raised to 1
    pub fn new(page: u64, per_page: u64, total: u64) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
            total,
        }
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn per_page(&self) -> u64 {
        self.per_page
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Zero-based index of the first item on the page
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.per_page)
    }

    /// 1-based index of the first item; may exceed `total` past the last page
    pub fn from(&self) -> u64 {
        self.offset().saturating_add(1)
    }

    /// 1-based index of the last item, clamped to `total`
    pub fn to(&self) -> u64 {
        self.page.saturating_mul(self.per_page).min(self.total)
    }

    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(self.per_page)
    }

    /// The part of `items` that falls inside this window
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let len = items.len() as u64;
        let start = self.offset().min(len) as usize;
        let end = self.offset().saturating_add(self.per_page).min(len) as usize;
        &items[start..end]
    }
}

/// Paginated transaction list response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEnvelope {
    /// Records on this page, in dataset order
    pub data: Vec<TransactionRecord>,
    /// Number of records before pagination (after any filter)
    pub total: u64,
    /// Requested page (1-based)
    pub page: u64,
    pub per_page: u64,
    pub total_pages: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_page: Option<u64>,
    /// 1-based index of the first returned record
    pub from: u64,
    /// 1-based index of the last returned record
    pub to: u64,
    /// Search term, echoed on search results
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    /// Set when the response was served from the fallback dataset after an upstream failure
    #[serde(default, deserialize_with = "discard", skip_serializing_if = "Option::is_none")]
    pub fallback: Option<bool>,
    #[serde(default, deserialize_with = "discard", skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Top-level fields the remote API sends beyond the ones above, passed through as-is
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ResultEnvelope {
    /// Slice `items` to the requested page and fill in the pagination metadata
    pub fn paginate(items: &[TransactionRecord], page: u64, per_page: u64) -> Self {
        let window = PageWindow::new(page, per_page, items.len() as u64);
        Self {
            data: window.slice(items).to_vec(),
            total: window.total(),
            page: window.page(),
            per_page: window.per_page(),
            total_pages: window.total_pages(),
            current_page: Some(window.page()),
            from: window.from(),
            to: window.to(),
            query: None,
            fallback: None,
            message: None,
            extra: Map::new(),
        }
    }

    /// Echo the search term
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Mark as served in degraded mode
    pub fn into_fallback(mut self, message: impl Into<String>) -> Self {
        self.fallback = Some(true);
        self.message = Some(message.into());
        self
    }

    pub fn is_fallback(&self) -> bool {
        self.fallback.unwrap_or(false)
    }

    /// Fill in the derived `type` field of every record
    pub fn annotate_directions(mut self, current_user: &str) -> Self {
        self.data = self
            .data
            .into_iter()
            .map(|tx| tx.annotated(current_user))
            .collect();
        self
    }
}
