//! Health check route.

use axum::routing::get;
use axum::Router;
use serde_json::json;

use crate::response::{ok, ApiResult};
use crate::AppState;

/// Creates the health route.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

/// GET `/health` - Liveness probe.
async fn health() -> ApiResult {
    Ok(ok("SUCCESS", json!({ "healthy": true })))
}
