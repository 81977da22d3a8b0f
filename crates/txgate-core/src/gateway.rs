//! Live/fallback orchestration for the list and search operations
//!
//! Every call either returns the upstream envelope untouched or a page of
//! the fallback dataset computed from the same caller parameters. Upstream
//! failures never reach the caller; they are logged and turn into a
//! `fallback: true` response.

use std::sync::Arc;

use txgate_config::Config;

use crate::envelope::ResultEnvelope;
use crate::error::{GatewayError, UpstreamError};
use crate::fallback::FallbackStore;
use crate::source::SourceRef;

/// Gateway behaviour switches, usually derived from [`Config`]
#[derive(Debug, Clone)]
pub struct GatewayOptions {
    /// Skip the upstream entirely (no `fallback` flag on responses)
    pub use_mock: bool,
    /// Message attached to degraded responses
    pub fallback_message: String,
    /// Account holder identity used for direction classification
    pub current_user: String,
    /// Add the derived `type` field to returned records
    pub annotate_direction: bool,
    pub default_per_page: u64,
    pub max_per_page: u64,
}

impl Default for GatewayOptions {
    fn default() -> Self {
        Self {
            use_mock: false,
            fallback_message: "Using mock data due to API error".to_string(),
            current_user: "current_user".to_string(),
            annotate_direction: false,
            default_per_page: 10,
            max_per_page: 100,
        }
    }
}

impl GatewayOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            use_mock: config.fallback.use_mock,
            fallback_message: config.fallback.message.clone(),
            current_user: config.account.current_user.clone(),
            annotate_direction: config.account.annotate_direction,
            default_per_page: config.pagination.per_page,
            max_per_page: config.pagination.max_per_page,
        }
    }
}

/// Caller parameters for `list`; `None` means "not supplied or unparseable"
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageParams {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

/// Caller parameters for `search`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams {
    pub query: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

/// Transaction history gateway
pub struct Gateway {
    source: SourceRef,
    store: Arc<FallbackStore>,
    options: GatewayOptions,
}

impl Gateway {
    pub fn new(source: SourceRef, store: Arc<FallbackStore>, options: GatewayOptions) -> Self {
        Self {
            source,
            store,
            options,
        }
    }

    /// List one page of transactions
    pub async fn list(&self, params: PageParams) -> ResultEnvelope {
        let (page, per_page) = self.normalize(params.page, params.per_page);

        if self.options.use_mock {
            log::debug!("use_mock set, serving list page {} from fallback dataset", page);
            return self.finish(self.store.list_page(page, per_page));
        }

        let envelope = match self.source.fetch_list(page).await {
            Ok(envelope) => envelope,
            Err(e) => {
                self.log_upstream_failure("list", &e);
                self.store
                    .list_page(page, per_page)
                    .into_fallback(self.options.fallback_message.clone())
            }
        };
        self.finish(envelope)
    }

    /// Search transactions; an empty query is rejected before any upstream call
    pub async fn search(&self, params: SearchParams) -> Result<ResultEnvelope, GatewayError> {
        let query = match params.query {
            Some(q) if !q.is_empty() => q,
            _ => return Err(GatewayError::MissingQuery),
        };
        let (page, per_page) = self.normalize(params.page, params.per_page);

        if self.options.use_mock {
            log::debug!("use_mock set, serving search '{}' from fallback dataset", query);
            return Ok(self.finish(self.store.search_page(&query, page, per_page)));
        }

        let envelope = match self.source.search(&query, page).await {
            Ok(envelope) => envelope,
            Err(e) => {
                self.log_upstream_failure("search", &e);
                self.store
                    .search_page(&query, page, per_page)
                    .into_fallback(self.options.fallback_message.clone())
            }
        };
        Ok(self.finish(envelope))
    }

    fn normalize(&self, page: Option<u64>, per_page: Option<u64>) -> (u64, u64) {
        let page = page.filter(|p| *p >= 1).unwrap_or(1);
        let per_page = per_page
            .filter(|n| *n >= 1)
            .unwrap_or(self.options.default_per_page)
            .min(self.options.max_per_page);
        (page, per_page)
    }

    fn finish(&self, envelope: ResultEnvelope) -> ResultEnvelope {
        if self.options.annotate_direction {
            envelope.annotate_directions(&self.options.current_user)
        } else {
            envelope
        }
    }

    fn log_upstream_failure(&self, operation: &str, error: &UpstreamError) {
        if error.is_client_error() {
            log::error!(
                "[{}] upstream {} rejected our request, serving fallback data: {}",
                error.code(),
                operation,
                error
            );
        } else {
            log::warn!(
                "[{}] upstream {} failed, serving fallback data: {}",
                error.code(),
                operation,
                error
            );
        }
    }
}

// ==================== Tests ====================
