//! Core transaction gateway logic
//!
//! - models: transaction record and direction classification
//! - envelope: paginated result envelope and window arithmetic
//! - fallback: offline dataset with list/search
//! - source: the live ledger trait implemented by the HTTP client
//! - gateway: live-vs-fallback orchestration

pub mod envelope;
pub mod error;
pub mod fallback;
pub mod gateway;
pub mod models;
pub mod source;

pub use envelope::{PageWindow, ResultEnvelope};
pub use error::{CoreError, CoreResult, ErrorCode, GatewayError, UpstreamError};
pub use fallback::FallbackStore;
pub use gateway::{Gateway, GatewayOptions, PageParams, SearchParams};
pub use models::{Direction, TransactionRecord};
pub use source::{LedgerSource, SourceRef};
