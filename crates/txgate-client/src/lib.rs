//! Signed HTTP client for the remote ledger API
//!
//! [`RemoteClient`] implements [`txgate_core::LedgerSource`]; every request
//! carries the API key, a Unix timestamp and an HMAC-SHA256 signature.

pub mod client;
pub mod error;
pub mod signer;

pub use client::RemoteClient;
pub use error::ClientError;
pub use signer::{SignedRequest, Signer};
