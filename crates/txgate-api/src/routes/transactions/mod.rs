//! Transaction routes - list and search
//!
//! Both endpoints always answer with a result envelope; upstream outages
//! show up only as `fallback: true` on the body.

pub mod api;

pub use api::{api_transactions, api_transactions_search};
