use axum::body::Bytes;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE};
use axum::http::{HeaderMap, HeaderValue, Method};
use serde_json::Value;

use crate::config::join_url;
use crate::error::{backend_message, ApiError};
use crate::state::AppState;

/// One backend operation behind the proxy
#[derive(Debug, Clone)]
pub struct ForwardSpec {
    pub path: &'static str,
    pub method: Method,
    /// Message used when the backend gives none
    pub fallback_message: &'static str,
}

pub const AUTH: ForwardSpec = ForwardSpec {
    path: "/api/auth",
    method: Method::POST,
    fallback_message: "Ошибка авторизации",
};

pub const AUTH_STATUS: ForwardSpec = ForwardSpec {
    path: "/api/auth/status",
    method: Method::GET,
    fallback_message: "Ошибка при проверке статуса авторизации",
};

pub const TOKEN: ForwardSpec = ForwardSpec {
    path: "/api/token",
    method: Method::POST,
    fallback_message: "Ошибка при сохранении токена",
};

/// Headers copied from the incoming request to the backend call
const FORWARDED_HEADERS: [axum::http::HeaderName; 2] = [AUTHORIZATION, COOKIE];

/// Parse an incoming request body. Empty bodies forward nothing.
pub fn read_json_body(body: &Bytes) -> Result<Option<Value>, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    serde_json::from_slice(body)
        .map(Some)
        .map_err(|e| ApiError::invalid_json(format!("Request body is not valid JSON: {}", e)))
}

/// Forward one request to the backend and relay the answer.
///
/// Never retries. Backend failures come back as [`ApiError::Upstream`] with
/// the backend's status (500 when there was none) and the backend's message
/// or the operation's fallback text.
pub async fn forward(
    state: &AppState,
    spec: &ForwardSpec,
    incoming: &HeaderMap,
    body: Option<Value>,
) -> Result<Value, ApiError> {
    let url = join_url(&state.backend_url, spec.path).map_err(|e| {
        tracing::error!(path = spec.path, "cannot build backend URL: {}", e);
        ApiError::internal_server_error(spec.fallback_message)
    })?;

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    for name in FORWARDED_HEADERS {
        if let Some(value) = incoming.get(&name) {
            headers.insert(name, value.clone());
        }
    }

    let mut request = state.http.request(spec.method.clone(), url).headers(headers);
    if let Some(body) = &body {
        request = request.json(body);
    }

    let response = request.send().await.map_err(|e| {
        tracing::error!(path = spec.path, "backend request failed: {}", e);
        ApiError::upstream(e.status().map(|s| s.as_u16()).unwrap_or(500), spec.fallback_message)
    })?;

    let status = response.status();
    let bytes = response.bytes().await.map_err(|e| {
        tracing::error!(path = spec.path, "failed to read backend response: {}", e);
        ApiError::upstream(500, spec.fallback_message)
    })?;

    if !status.is_success() {
        let message = backend_message(&bytes).unwrap_or_else(|| spec.fallback_message.to_string());
        tracing::warn!(path = spec.path, status = status.as_u16(), "backend rejected request: {}", message);
        return Err(ApiError::upstream(status.as_u16(), message));
    }

    Ok(parse_backend_body(&bytes))
}

/// Backend success bodies are JSON; anything else is relayed as text.
fn parse_backend_body(bytes: &[u8]) -> Value {
    if bytes.is_empty() {
        return Value::Null;
    }

    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}
