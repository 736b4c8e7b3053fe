//! Route definitions.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use etfmon::EtfAnalyzer;

use crate::handlers::{self, AppState};

/// Prefix shared by every route.
pub const API_PREFIX: &str = "/api/py";

/// Create the API router.
pub fn create_router(analyzer: EtfAnalyzer) -> Router {
    let state = Arc::new(AppState { analyzer });

    let v1 = Router::new()
        .route("/etfs", post(handlers::upload_etf))
        .route("/health", get(handlers::health));

    Router::new()
        .route(API_PREFIX, get(handlers::api_root))
        .nest(&format!("{}/v1", API_PREFIX), v1)
        .with_state(state)
}
