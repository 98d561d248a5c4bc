use std::path::PathBuf;

use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::handlers;
use crate::middleware::page_gate_middleware;
use crate::state::AppState;

/// Assemble the full router: proxy API, health check and gated pages
pub fn app(state: AppState) -> Router {
    let cors = state.config.security.enable_cors.then(|| cors_layer(&state.config.security.cors_origins));
    let request_logging = state.config.server.enable_request_logging;

    let mut router = Router::new()
        .route("/health", get(handlers::health_get))
        .merge(proxy_routes())
        .merge(page_routes(&state))
        .with_state(state);

    if let Some(cors) = cors {
        router = router.layer(cors);
    }
    if request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router
}

fn proxy_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth", post(handlers::auth_post))
        .route("/api/auth/status", get(handlers::status_get))
        .route("/api/token", post(handlers::token_post))
}

/// Built front-end assets behind the route guard, with single-page fallback
fn page_routes(state: &AppState) -> Router<AppState> {
    let dir = PathBuf::from(&state.config.server.static_dir);
    let index = dir.join("index.html");

    Router::new()
        .fallback_service(ServeDir::new(dir).fallback(ServeFile::new(index)))
        .layer(middleware::from_fn_with_state(state.clone(), page_gate_middleware))
}

/// `*` opens the API to any origin without credentials; otherwise only the
/// listed origins, with cookies allowed.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if origins.iter().any(|origin| origin == "*") {
        tracing::warn!("CORS wildcard origin configured, credentials will not be allowed");
        return layer.allow_origin(AllowOrigin::any());
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    layer.allow_origin(origins).allow_credentials(true)
}
