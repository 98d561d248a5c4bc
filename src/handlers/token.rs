// handlers/token.rs - POST /api/token handler

use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::Json,
};
use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::handlers::utils::{self, TOKEN};
use crate::state::AppState;

/// POST /api/token - Hand a token payload to the backend for storage
///
/// Expected Output:
/// ```json
/// { "success": true, "stored": true }
/// ```
pub async fn token_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let payload = utils::read_json_body(&body)?;
    let response = utils::forward(&state, &TOKEN, &headers, payload).await?;
    Ok(Json(success_envelope(response)))
}

/// Mark a backend answer as successful.
///
/// Object fields are merged at the top level after `success`, so a backend
/// field named `success` wins. Null adds nothing; any other value is kept
/// under `data`.
pub fn success_envelope(response: Value) -> Value {
    let mut envelope = Map::new();
    envelope.insert("success".to_string(), Value::Bool(true));

    match response {
        Value::Object(fields) => envelope.extend(fields),
        Value::Null => {}
        other => {
            envelope.insert("data".to_string(), other);
        }
    }

    Value::Object(envelope)
}
