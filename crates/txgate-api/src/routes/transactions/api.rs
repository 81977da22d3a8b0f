//! Transactions API endpoints - JSON
//!
//! Endpoints:
//! - api_transactions: `GET /transactions?p=<page>&perPage=<n>`
//! - api_transactions_search: `POST /transactions/search` with `{query, p?, perPage?}`

use crate::{ApiError, AppState};
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use std::collections::HashMap;
use txgate_core::{PageParams, ResultEnvelope, SearchParams};

/// Search request body
#[derive(Debug, Default, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: Option<String>,
    /// Page number; the web client sends `page`, the API documents `p`
    #[serde(default, alias = "page")]
    pub p: Option<serde_json::Value>,
    #[serde(default, rename = "perPage")]
    pub per_page: Option<serde_json::Value>,
}

/// Get one page of transactions (JSON API)
pub async fn api_transactions(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<ResultEnvelope> {
    let params = PageParams {
        page: params.get("p").and_then(|s| parse_number(s)),
        per_page: params.get("perPage").and_then(|s| parse_number(s)),
    };
    Json(state.gateway.list(params).await)
}

/// Search transactions (JSON API)
///
/// A body that is missing or not JSON is treated as a request without a query.
pub async fn api_transactions_search(
    State(state): State<AppState>,
    body: Option<Json<SearchRequest>>,
) -> Result<Json<ResultEnvelope>, ApiError> {
    let request = body.map(|Json(request)| request).unwrap_or_default();
    let params = SearchParams {
        query: request.query,
        page: request.p.as_ref().and_then(json_number),
        per_page: request.per_page.as_ref().and_then(json_number),
    };
    let envelope = state.gateway.search(params).await.map_err(|e| {
        log::debug!("rejected search request: {}", e);
        ApiError::from(e)
    })?;
    Ok(Json(envelope))
}

/// Parse a page number; anything that is not a whole number is ignored
fn parse_number(s: &str) -> Option<u64> {
    s.trim().parse().ok()
}

fn json_number(value: &serde_json::Value) -> Option<u64> {
    match value {
        serde_json::Value::Number(n) => n.as_u64(),
        serde_json::Value::String(s) => parse_number(s),
        _ => None,
    }
}
