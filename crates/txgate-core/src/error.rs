//! Error types for txgate-core
//!
//! Three families:
//! - [`CoreError`]: startup-time failures (bad fixture), fatal
//! - [`GatewayError`]: caller input errors, the only errors a caller sees
//! - [`UpstreamError`]: remote API failures, absorbed by the fallback path

use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidFixture,
    IoError,
    MissingQuery,
    UpstreamTimeout,
    UpstreamTransport,
    UpstreamStatus,
    UpstreamDecode,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::InvalidFixture => write!(f, "INVALID_FIXTURE"),
            ErrorCode::IoError => write!(f, "IO_ERROR"),
            ErrorCode::MissingQuery => write!(f, "MISSING_QUERY"),
            ErrorCode::UpstreamTimeout => write!(f, "UPSTREAM_TIMEOUT"),
            ErrorCode::UpstreamTransport => write!(f, "UPSTREAM_TRANSPORT"),
            ErrorCode::UpstreamStatus => write!(f, "UPSTREAM_STATUS"),
            ErrorCode::UpstreamDecode => write!(f, "UPSTREAM_DECODE"),
        }
    }
}

/// Errors raised while building the core services
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid fallback dataset: {message}")]
    InvalidFixture { message: String },

    #[error("IO error reading {path}: {message}")]
    IoError { path: String, message: String },
}

impl CoreError {
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::InvalidFixture { .. } => ErrorCode::InvalidFixture,
            CoreError::IoError { .. } => ErrorCode::IoError,
        }
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

/// Caller-visible gateway errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Query parameter is required")]
    MissingQuery,
}

impl GatewayError {
    pub fn code(&self) -> ErrorCode {
        match self {
            GatewayError::MissingQuery => ErrorCode::MissingQuery,
        }
    }
}

/// Failure talking to the remote ledger API
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    #[error("upstream request timed out")]
    Timeout,

    #[error("upstream transport error: {message}")]
    Transport { message: String },

    #[error("upstream returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("upstream response could not be decoded: {message}")]
    Decode { message: String },
}

impl UpstreamError {
    pub fn code(&self) -> ErrorCode {
        match self {
            UpstreamError::Timeout => ErrorCode::UpstreamTimeout,
            UpstreamError::Transport { .. } => ErrorCode::UpstreamTransport,
            UpstreamError::HttpStatus { .. } => ErrorCode::UpstreamStatus,
            UpstreamError::Decode { .. } => ErrorCode::UpstreamDecode,
        }
    }

    /// HTTP status reported by the upstream, if it answered at all
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            UpstreamError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// A 4xx answer usually means our request is wrong (bad key, clock skew),
    /// not that the upstream is down.
    pub fn is_client_error(&self) -> bool {
        matches!(self.upstream_status(), Some(400..=499))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::InvalidFixture.to_string(), "INVALID_FIXTURE");
        assert_eq!(GatewayError::MissingQuery.code().to_string(), "MISSING_QUERY");
    }

    #[test]
    fn test_missing_query_message() {
        assert_eq!(GatewayError::MissingQuery.to_string(), "Query parameter is required");
    }

    #[test]
    fn test_upstream_classification() {
        let unauthorized = UpstreamError::HttpStatus { status: 401, body: "bad sign".to_string() };
        assert!(unauthorized.is_client_error());
        assert_eq!(unauthorized.upstream_status(), Some(401));

        let unavailable = UpstreamError::HttpStatus { status: 503, body: String::new() };
        assert!(!unavailable.is_client_error());

        assert!(!UpstreamError::Timeout.is_client_error());
        assert_eq!(UpstreamError::Timeout.upstream_status(), None);
        assert_eq!(UpstreamError::Timeout.code(), ErrorCode::UpstreamTimeout);
    }
}
