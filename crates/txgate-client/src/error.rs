//! Error types for txgate-client

use thiserror::Error;

/// Errors building the remote client at startup
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("API secret must not be empty")]
    EmptySecret,

    #[error("Invalid header {name}: {message}")]
    InvalidHeader { name: String, message: String },

    #[error("Failed to build HTTP client: {message}")]
    Build { message: String },
}
