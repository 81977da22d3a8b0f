//! Route modules for the API server
//!
//! - transactions: transaction list and search (JSON)
//! - health: liveness probe

pub mod health;
pub mod transactions;
