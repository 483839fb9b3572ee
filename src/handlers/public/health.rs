// handlers/public/health.rs - GET /health handler

use axum::extract::State;
use serde_json::{json, Value};

use crate::middleware::ApiResponse;
use crate::state::AppState;

/// GET /health - liveness of the gateway process itself
///
/// Does not call the upstream; a down upstream shows up as 502s on proxied calls.
pub async fn health(State(state): State<AppState>) -> ApiResponse<Value> {
    ApiResponse::success(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now(),
        "version": env!("CARGO_PKG_VERSION"),
        "upstream": state.config.upstream.base_url,
    }))
}
