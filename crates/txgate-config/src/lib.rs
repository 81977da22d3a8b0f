//! Configuration management for txgate
//!
//! Configuration is read once at startup from a YAML file, overlaid with
//! environment variables, and validated. The resulting [`Config`] is
//! immutable for the rest of the process lifetime.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use error::{ConfigError, ConfigErrorCode, ConfigResult};

/// Remote API base URL
pub const ENV_BASE_URL: &str = "YAYA_BASE_URL";
/// Remote API key
pub const ENV_API_KEY: &str = "YAYA_API_KEY";
/// Remote API signing secret
pub const ENV_API_SECRET: &str = "YAYA_API_SECRET";
/// "true" forces every request onto the fallback dataset
pub const ENV_USE_MOCK: &str = "USE_MOCK_DATA";
/// Identity of the account holder
pub const ENV_CURRENT_USER: &str = "CURRENT_USER";
/// Listen port
pub const ENV_PORT: &str = "PORT";
/// Allowed CORS origin
pub const ENV_FRONTEND_URL: &str = "FRONTEND_URL";

// ==================== Configuration Types ====================

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Allowed browser origin; any origin when unset
    #[serde(default)]
    pub cors_origin: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: None,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3001
}

/// Remote ledger API settings
#[derive(Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL, e.g. `https://sandbox.yayawallet.com/api/en`
    #[serde(default)]
    pub base_url: String,
    /// API key sent with every request
    #[serde(default)]
    pub api_key: String,
    /// Shared secret used to sign requests (never serialized back out)
    #[serde(default, skip_serializing)]
    pub api_secret: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Header carrying the API key
    #[serde(default = "default_key_header")]
    pub key_header: String,
    /// Header carrying the signing timestamp
    #[serde(default = "default_timestamp_header")]
    pub timestamp_header: String,
    /// Header carrying the hex signature
    #[serde(default = "default_signature_header")]
    pub signature_header: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            api_secret: String::new(),
            timeout_secs: default_timeout_secs(),
            key_header: default_key_header(),
            timestamp_header: default_timestamp_header(),
            signature_header: default_signature_header(),
        }
    }
}

impl std::fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .field("key_header", &self.key_header)
            .field("timestamp_header", &self.timestamp_header)
            .field("signature_header", &self.signature_header)
            .finish()
    }
}

impl UpstreamConfig {
    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_key_header() -> String {
    "YAYA-API-KEY".to_string()
}

fn default_timestamp_header() -> String {
    "YAYA-API-TIMESTAMP".to_string()
}

fn default_signature_header() -> String {
    "YAYA-API-SIGN".to_string()
}

/// Fallback dataset settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackConfig {
    /// Serve every request from the local dataset without contacting the API
    #[serde(default)]
    pub use_mock: bool,
    /// Message attached to responses served after an upstream failure
    #[serde(default = "default_fallback_message")]
    pub message: String,
    /// JSON file replacing the bundled dataset
    #[serde(default)]
    pub dataset_path: Option<PathBuf>,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            use_mock: false,
            message: default_fallback_message(),
            dataset_path: None,
        }
    }
}

fn default_fallback_message() -> String {
    "Using mock data due to API error".to_string()
}

/// Account holder settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountConfig {
    /// Identity compared against sender/receiver to derive direction
    #[serde(default = "default_current_user")]
    pub current_user: String,
    /// Add a derived `type` field to every returned record
    #[serde(default)]
    pub annotate_direction: bool,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            current_user: default_current_user(),
            annotate_direction: false,
        }
    }
}

fn default_current_user() -> String {
    "current_user".to_string()
}

/// Pagination settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Records per page when the caller does not ask for a size
    #[serde(default = "default_per_page")]
    pub per_page: u64,
    /// Upper bound on a caller-supplied page size
    #[serde(default = "default_max_per_page")]
    pub max_per_page: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            per_page: default_per_page(),
            max_per_page: default_max_per_page(),
        }
    }
}

fn default_per_page() -> u64 {
    10
}

fn default_max_per_page() -> u64 {
    100
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Remote API settings
    #[serde(default)]
    pub upstream: UpstreamConfig,
    /// Fallback dataset settings
    #[serde(default)]
    pub fallback: FallbackConfig,
    /// Account holder settings
    #[serde(default)]
    pub account: AccountConfig,
    /// Pagination settings
    #[serde(default)]
    pub pagination: PaginationConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file, apply environment overrides and validate
    pub fn load(path: PathBuf) -> ConfigResult<Self> {
        let mut config = Self::read_file(&path)?;
        config.apply_env(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Like [`Config::load`], but a missing file falls back to defaults plus environment
    pub fn load_or_default(path: PathBuf) -> ConfigResult<Self> {
        let mut config = match Self::read_file(&path) {
            Ok(config) => config,
            Err(ConfigError::FileNotFound { path }) => {
                log::warn!("Config file {} not found, using defaults and environment", path);
                Config::default()
            }
            Err(e) => return Err(e),
        };
        config.apply_env(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a YAML document without validating it
    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        serde_yaml::from_str(content).map_err(|e| ConfigError::InvalidYaml {
            message: e.to_string(),
        })
    }

    fn read_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::FileNotFound {
                path: path.display().to_string(),
            },
            _ => ConfigError::IoError {
                message: e.to_string(),
            },
        })?;
        Self::from_yaml_str(&content)
    }

    /// Overlay values from the environment. `lookup` is `std::env::var` in production.
    pub fn apply_env<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(ENV_BASE_URL) {
            self.upstream.base_url = v;
        }
        if let Some(v) = lookup(ENV_API_KEY) {
            self.upstream.api_key = v;
        }
        if let Some(v) = lookup(ENV_API_SECRET) {
            self.upstream.api_secret = v;
        }
        if let Some(v) = lookup(ENV_USE_MOCK) {
            self.fallback.use_mock = v == "true";
        }
        if let Some(v) = lookup(ENV_CURRENT_USER) {
            self.account.current_user = v;
        }
        if let Some(v) = lookup(ENV_FRONTEND_URL) {
            self.server.cors_origin = Some(v);
        }
        if let Some(v) = lookup(ENV_PORT) {
            self.server.port = v.parse().map_err(|_| ConfigError::InvalidValue {
                field: "server.port".to_string(),
                reason: format!("{} must be a port number, got '{}'", ENV_PORT, v),
            })?;
        }
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        // Credentials are required even when use_mock is set
        if self.upstream.base_url.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "upstream.base_url".to_string(),
            });
        }
        if !self.upstream.base_url.starts_with("http://")
            && !self.upstream.base_url.starts_with("https://")
        {
            return Err(ConfigError::InvalidValue {
                field: "upstream.base_url".to_string(),
                reason: "Base URL must start with http:// or https://".to_string(),
            });
        }
        if self.upstream.api_key.is_empty() {
            return Err(ConfigError::MissingField {
                field: "upstream.api_key".to_string(),
            });
        }
        if self.upstream.api_secret.is_empty() {
            return Err(ConfigError::MissingField {
                field: "upstream.api_secret".to_string(),
            });
        }

        if self.upstream.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "upstream.timeout_secs".to_string(),
                reason: "Timeout must be at least 1 second".to_string(),
            });
        }

        for (field, value) in [
            ("upstream.key_header", &self.upstream.key_header),
            ("upstream.timestamp_header", &self.upstream.timestamp_header),
            ("upstream.signature_header", &self.upstream.signature_header),
        ] {
            if value.is_empty() || !value.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_') {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: format!("'{}' is not a valid HTTP header name", value),
                });
            }
        }

        if self.account.current_user.is_empty() {
            return Err(ConfigError::MissingField {
                field: "account.current_user".to_string(),
            });
        }

        if self.pagination.per_page == 0 {
            return Err(ConfigError::InvalidValue {
                field: "pagination.per_page".to_string(),
                reason: "Page size must be greater than 0".to_string(),
            });
        }
        if self.pagination.max_per_page < self.pagination.per_page {
            return Err(ConfigError::InvalidValue {
                field: "pagination.max_per_page".to_string(),
                reason: "Maximum page size must not be smaller than the default page size".to_string(),
            });
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }
}

// ==================== Tests ====================
