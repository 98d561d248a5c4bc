// handlers/health.rs - GET /health handler

use axum::extract::State;
use serde_json::{json, Value};

use crate::middleware::ApiResponse;
use crate::state::AppState;

/// GET /health - Liveness check for the gate itself
///
/// Does not call the backend; reports which backend the proxy points at.
pub async fn health_get(State(state): State<AppState>) -> ApiResponse<Value> {
    ApiResponse::success(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now(),
        "backend": state.backend_url.as_str(),
    }))
}
