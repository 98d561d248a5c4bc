use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE, COOKIE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use super::session::Session;
use crate::config::{self, AppConfig, ConfigError};
use crate::error::backend_message;

pub const AUTH_STATUS_PATH: &str = "/api/auth/status";

/// Failure of an authenticated call
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The backend rejected the session token. The caller should send the
    /// user to `login_path`.
    #[error("session expired, login required at {login_path}")]
    AuthExpired { login_path: String },

    #[error("backend responded {status}: {message}")]
    Status { status: u16, message: String },

    #[error("request to backend failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed backend response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid request path '{0}'")]
    InvalidPath(String),

    #[error("session token cannot be sent as a header")]
    InvalidToken(#[from] reqwest::header::InvalidHeaderValue),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl FetchError {
    /// Where to send the user, if this failure calls for a login redirect
    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            FetchError::AuthExpired { login_path } => Some(login_path),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::AuthExpired { .. } => Some(401),
            FetchError::Status { status, .. } => Some(*status),
            FetchError::Transport(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Method, body and extra headers for one call
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub method: Method,
    pub body: Option<Value>,
    pub headers: HeaderMap,
}

impl FetchOptions {
    pub fn get() -> Self {
        Self {
            method: Method::GET,
            body: None,
            headers: HeaderMap::new(),
        }
    }

    pub fn post<B: Serialize>(body: &B) -> Result<Self, FetchError> {
        Ok(Self {
            method: Method::POST,
            body: Some(serde_json::to_value(body)?),
            headers: HeaderMap::new(),
        })
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self::get()
    }
}

/// Body of `GET /api/auth/status`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AuthStatus {
    pub authenticated: bool,
}

impl AuthStatus {
    /// Accepts `{authenticated}` at the top level or wrapped in `{data: {...}}`.
    pub fn from_value(body: Value) -> Result<Self, FetchError> {
        let flag = body
            .get("authenticated")
            .or_else(|| body.get("data").and_then(|data| data.get("authenticated")))
            .cloned()
            .ok_or_else(|| {
                <serde_json::Error as serde::de::Error>::missing_field("authenticated")
            })?;
        let authenticated: bool = serde_json::from_value(flag)?;

        Ok(Self { authenticated })
    }
}

/// Backend client that carries the session token on every call
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    cookie_name: String,
    login_path: String,
}

impl ApiClient {
    pub fn new(
        http: reqwest::Client,
        base_url: Url,
        cookie_name: impl Into<String>,
        login_path: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url,
            cookie_name: cookie_name.into(),
            login_path: login_path.into(),
        }
    }

    /// Build a client with its own connection pool from application config
    pub fn from_config(config: &AppConfig) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.backend.timeout_secs))
            .build()?;
        Self::with_http(http, config)
    }

    /// Build a client sharing an existing connection pool
    pub fn with_http(http: reqwest::Client, config: &AppConfig) -> Result<Self, FetchError> {
        Ok(Self::new(
            http,
            config.backend_url()?,
            config.session.cookie_name.clone(),
            config.session.login_path.clone(),
        ))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    /// Issue a call against the backend with the session attached.
    ///
    /// A 401 clears the token from `session` and yields
    /// [`FetchError::AuthExpired`]; every other non-2xx status is returned as
    /// [`FetchError::Status`] untouched.
    pub async fn fetch_with_auth<T: DeserializeOwned>(
        &self,
        session: &mut Session,
        path: &str,
        options: FetchOptions,
    ) -> Result<T, FetchError> {
        let url = config::join_url(&self.base_url, path)
            .map_err(|_| FetchError::InvalidPath(path.to_string()))?;
        let headers = self.merged_headers(session, options.headers)?;

        let mut request = self.http.request(options.method.clone(), url).headers(headers);
        if let Some(body) = &options.body {
            request = request.json(body);
        }

        tracing::debug!(method = %options.method, path, "authenticated backend call");
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!(path, "backend rejected session token");
            session.clear();
            return Err(FetchError::AuthExpired {
                login_path: self.login_path.clone(),
            });
        }

        let bytes = response.bytes().await?;
        if !status.is_success() {
            let message = backend_message(&bytes)
                .or_else(|| status.canonical_reason().map(str::to_string))
                .unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                message,
            });
        }

        if bytes.is_empty() {
            return Ok(serde_json::from_value(Value::Null)?);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Ask the backend whether the session is still valid
    pub async fn auth_status(&self, session: &mut Session) -> Result<AuthStatus, FetchError> {
        let body: Value = self
            .fetch_with_auth(session, AUTH_STATUS_PATH, FetchOptions::get())
            .await?;
        AuthStatus::from_value(body)
    }

    fn merged_headers(&self, session: &Session, mut headers: HeaderMap) -> Result<HeaderMap, FetchError> {
        if let Some(bearer) = session.bearer() {
            headers.insert(AUTHORIZATION, HeaderValue::from_str(&bearer)?);
        }
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(pair) = session.cookie_pair(&self.cookie_name) {
            let cookie = match headers.get(COOKIE).and_then(|v| v.to_str().ok()) {
                Some(existing) if !existing.is_empty() => format!("{}; {}", existing, pair),
                _ => pair,
            };
            headers.insert(COOKIE, HeaderValue::from_str(&cookie)?);
        }

        Ok(headers)
    }
}
