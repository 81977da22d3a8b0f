//! Live transaction source abstraction

use async_trait::async_trait;
use std::sync::Arc;

use crate::envelope::ResultEnvelope;
use crate::error::UpstreamError;

/// Source reference type
pub type SourceRef = Arc<dyn LedgerSource>;

/// A remote ledger that can list and search transactions
#[async_trait]
pub trait LedgerSource: Send + Sync {
    /// Fetch one page of the account holder's transactions
    async fn fetch_list(&self, page: u64) -> Result<ResultEnvelope, UpstreamError>;

    /// Search the account holder's transactions
    async fn search(&self, query: &str, page: u64) -> Result<ResultEnvelope, UpstreamError>;
}
