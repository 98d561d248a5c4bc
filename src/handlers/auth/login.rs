// handlers/auth/login.rs - POST /api/auth handler

use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::Json,
};
use serde_json::Value;

use crate::error::ApiError;
use crate::handlers::utils::{self, AUTH};
use crate::state::AppState;

/// POST /api/auth - Exchange credentials for a session
///
/// The body is opaque to the gate and reaches the backend verbatim. The
/// backend's JSON answer (typically carrying the session token) is returned
/// as-is; failures keep the backend's status and message.
pub async fn auth_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let payload = utils::read_json_body(&body)?;
    let response = utils::forward(&state, &AUTH, &headers, payload).await?;
    Ok(Json(response))
}
