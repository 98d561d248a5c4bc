use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};

use crate::auth::{check_local, verify_status, Navigation, Session};
use crate::error::ApiError;
use crate::state::AppState;

/// Route guard in front of the front-end's pages.
///
/// Runs the cheap cookie check on every page request and, when
/// `session.verify_status` is enabled, the backend status check as well.
/// Public routes skip both. A token the backend answered 401 to is also
/// dropped from the browser. Unknown `/api/*` paths get a JSON 404 instead of
/// the single-page fallback.
pub async fn page_gate_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_owned();

    if path.starts_with("/api/") {
        return ApiError::not_found(format!("No API route for {}", path)).into_response();
    }

    let mut session = Session::from_cookies(&jar, &state.config.session.cookie_name);

    if let Navigation::Redirect(to) = check_local(&path, &session, &state.public_routes) {
        return Redirect::to(&to).into_response();
    }

    if state.config.session.verify_status && !state.public_routes.contains(&path) {
        if let Navigation::Redirect(to) = verify_status(&state.client, &mut session).await {
            tracing::info!(path = %path, "session rejected by backend, redirecting to {}", to);
            if !session.is_authenticated() {
                let jar = jar.remove(removal_cookie(&state.config.session.cookie_name));
                return (jar, Redirect::to(&to)).into_response();
            }
            return Redirect::to(&to).into_response();
        }
    }

    next.run(request).await
}

/// Expired copy of the session cookie, scoped to the whole site
fn removal_cookie(name: &str) -> Cookie<'static> {
    Cookie::build((name.to_owned(), "")).path("/").build()
}
