// handlers/auth/status.rs - GET /api/auth/status handler

use axum::{extract::State, http::HeaderMap, response::Json};
use serde_json::Value;

use crate::error::ApiError;
use crate::handlers::utils::{self, AUTH_STATUS};
use crate::state::AppState;

/// GET /api/auth/status - Ask the backend whether the caller's session is valid
///
/// No body is forwarded. The caller's `Authorization` and `Cookie` headers
/// are, so the backend sees the same session the browser holds.
///
/// Expected Output:
/// ```json
/// { "authenticated": true }
/// ```
pub async fn status_get(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let response = utils::forward(&state, &AUTH_STATUS, &headers, None).await?;
    Ok(Json(response))
}
