#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use authgate::config::AppConfig;
use authgate::AppState;

/// Headers the mock backend saw on its most recent request
#[derive(Clone, Default)]
pub struct Seen {
    inner: Arc<Mutex<Vec<(String, Option<String>, Option<String>)>>>,
}

impl Seen {
    fn record(&self, path: &str, headers: &HeaderMap) {
        let read = |name: header::HeaderName| {
            headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string)
        };
        self.inner
            .lock()
            .unwrap()
            .push((path.to_string(), read(header::AUTHORIZATION), read(header::COOKIE)));
    }

    /// `Authorization` header of every request, in arrival order
    pub fn authorizations(&self) -> Vec<Option<String>> {
        self.inner.lock().unwrap().iter().map(|(_, auth, _)| auth.clone()).collect()
    }

    pub fn last_cookie(&self) -> Option<String> {
        self.inner.lock().unwrap().last().and_then(|(_, _, cookie)| cookie.clone())
    }

    pub fn count(&self) -> usize {
        self.inner.lock().unwrap().len()
    }
}

pub struct MockBackend {
    pub base_url: String,
    pub seen: Seen,
}

/// Start a fake token service answering the three backend endpoints.
///
/// `/api/auth`: a `stale` bearer gets a 401; password `secret` yields token
/// `abc123`; user `silent` gets a bare 422; everyone else a 403 "bad credentials".
/// `/api/auth/status`: keyed on the bearer token, see `status`.
/// `/api/token`: `{stored: true}`, or a bare 500 for token `boom`.
pub async fn spawn_backend() -> Result<MockBackend> {
    let seen = Seen::default();
    let app = Router::new()
        .route("/api/auth", post(auth))
        .route("/api/auth/status", get(status))
        .route("/api/token", post(token))
        .with_state(seen.clone());

    let addr = serve(app).await?;
    Ok(MockBackend {
        base_url: format!("http://{}", addr),
        seen,
    })
}

async fn auth(State(seen): State<Seen>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    seen.record("/api/auth", &headers);

    if headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) == Some("Bearer stale") {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "message": "expired" }))).into_response();
    }
    if body["username"] == "silent" {
        return StatusCode::UNPROCESSABLE_ENTITY.into_response();
    }
    if body["password"] == "secret" {
        return Json(json!({ "token": "abc123", "user": body["username"] })).into_response();
    }
    (StatusCode::FORBIDDEN, Json(json!({ "message": "bad credentials" }))).into_response()
}

async fn status(State(seen): State<Seen>, headers: HeaderMap) -> Response {
    seen.record("/api/auth/status", &headers);

    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    match bearer {
        "Bearer abc123" => Json(json!({ "authenticated": true, "user": "ivan" })).into_response(),
        "Bearer wrapped" => Json(json!({ "data": { "authenticated": true } })).into_response(),
        "Bearer stale" => (StatusCode::UNAUTHORIZED, Json(json!({ "message": "expired" }))).into_response(),
        "Bearer garbage" => "definitely not json".into_response(),
        "Bearer broken" => (StatusCode::BAD_GATEWAY, Json(json!({ "message": "db down" }))).into_response(),
        _ => Json(json!({ "authenticated": false })).into_response(),
    }
}

async fn token(State(seen): State<Seen>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    seen.record("/api/token", &headers);

    if body["token"] == "boom" {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    Json(json!({ "stored": true })).into_response()
}

pub struct TestGate {
    pub base_url: String,
    pub backend: Option<MockBackend>,
}

/// Gate configuration pointing at `backend_url` with a throwaway static dir
pub fn gate_config(backend_url: &str) -> Result<AppConfig> {
    let mut config = AppConfig::development();
    config.backend.base_url = backend_url.to_string();
    config.backend.timeout_secs = 5;
    config.server.static_dir = static_dir()?.to_string_lossy().into_owned();
    config.server.enable_request_logging = false;
    Ok(config)
}

/// Start the gate in front of a fresh mock backend
pub async fn spawn_gate() -> Result<TestGate> {
    spawn_gate_with(|_| {}).await
}

pub async fn spawn_gate_with(adjust: impl FnOnce(&mut AppConfig)) -> Result<TestGate> {
    let backend = spawn_backend().await?;
    let mut config = gate_config(&backend.base_url)?;
    adjust(&mut config);

    let base_url = start_gate(config).await?;
    Ok(TestGate {
        base_url,
        backend: Some(backend),
    })
}

/// Start the gate against a backend address nothing listens on
pub async fn spawn_gate_without_backend(adjust: impl FnOnce(&mut AppConfig)) -> Result<TestGate> {
    let mut config = gate_config(&dead_backend_url()?)?;
    adjust(&mut config);

    let base_url = start_gate(config).await?;
    Ok(TestGate { base_url, backend: None })
}

pub fn dead_backend_url() -> Result<String> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    Ok(format!("http://127.0.0.1:{}", port))
}

async fn start_gate(config: AppConfig) -> Result<String> {
    let state = AppState::new(config)?;
    let addr = serve(authgate::app(state)).await?;
    Ok(format!("http://{}", addr))
}

async fn serve(app: Router) -> Result<SocketAddr> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .context("failed to bind test listener")?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(addr)
}

fn static_dir() -> Result<PathBuf> {
    static NEXT: AtomicUsize = AtomicUsize::new(0);

    let dir = std::env::temp_dir().join(format!(
        "authgate-static-{}-{}",
        std::process::id(),
        NEXT.fetch_add(1, Ordering::SeqCst)
    ));
    std::fs::create_dir_all(dir.join("_nuxt"))?;
    std::fs::write(dir.join("index.html"), "<html><body>front-end</body></html>")?;
    std::fs::write(dir.join("_nuxt").join("entry.js"), "console.log('entry')")?;
    Ok(dir)
}

/// HTTP client that does not follow redirects, so guard decisions stay visible
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("test client")
}
