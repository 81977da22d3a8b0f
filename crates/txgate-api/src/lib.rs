//! HTTP API server for the transaction gateway
//!
//! Routes are organized into modules:
//! - routes::transactions: transaction list and search
//! - routes::health: liveness probe
//!
//! Every route is served both at the root and under `/api`.

pub mod error;
pub mod routes;

use axum::http::{header, HeaderValue, Method};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use txgate_config::Config;
use txgate_core::Gateway;

pub use error::ApiError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<Gateway>,
    pub config: Arc<Config>,
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::health::health_check;
    use routes::transactions::{api_transactions, api_transactions_search};

    let api = Router::new()
        .route("/health", get(health_check))
        .route("/transactions", get(api_transactions))
        .route("/transactions/search", post(api_transactions_search));

    Router::new()
        .merge(api.clone())
        .nest("/api", api)
        .layer(cors_layer(&state.config))
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    match config.server.cors_origin.as_deref() {
        Some(origin) => match HeaderValue::from_str(origin) {
            Ok(origin) => layer.allow_origin(origin).allow_credentials(true),
            Err(_) => {
                log::warn!("Ignoring invalid CORS origin '{}', cross-origin requests will be refused", origin);
                layer
            }
        },
        None => layer.allow_origin(Any),
    }
}

/// Bind and serve until Ctrl-C
pub async fn start_server(config: Arc<Config>, gateway: Arc<Gateway>) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState { gateway, config };

    let router = create_router(state);

    let listener = TcpListener::bind(&addr).await?;
    log::info!("Starting txgate on http://{}", addr);
    log::info!("Available routes:");
    log::info!("  - GET  /transactions?p=<page>");
    log::info!("  - POST /transactions/search");
    log::info!("  - GET  /health");
    log::info!("  (also under /api)");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    log::info!("Server stopped gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
    }
}

// ==================== Tests ====================
