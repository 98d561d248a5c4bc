use serde::Serialize;

use super::client::ApiClient;
use super::session::Session;
use crate::config::SessionConfig;

/// Outcome of a route guard
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "to", rename_all = "lowercase")]
pub enum Navigation {
    Proceed,
    Redirect(String),
}

impl Navigation {
    pub fn redirect(path: impl Into<String>) -> Self {
        Navigation::Redirect(path.into())
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self, Navigation::Redirect(_))
    }
}

/// Paths reachable without a session token.
///
/// Exact paths come from the configured allow-list. Prefixes cover asset
/// trees the login page itself needs.
#[derive(Debug, Clone)]
pub struct PublicRoutes {
    login_path: String,
    paths: Vec<String>,
    prefixes: Vec<String>,
}

impl PublicRoutes {
    pub fn new(login_path: impl Into<String>, paths: Vec<String>) -> Self {
        Self {
            login_path: login_path.into(),
            paths,
            prefixes: Vec::new(),
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(config.login_path.clone(), config.public_routes.clone())
            .with_prefixes(config.public_prefixes.clone())
    }

    pub fn with_prefixes(mut self, prefixes: Vec<String>) -> Self {
        self.prefixes = prefixes;
        self
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.iter().any(|p| p == path)
            || self.prefixes.iter().any(|prefix| path.starts_with(prefix.as_str()))
    }
}

impl Default for PublicRoutes {
    fn default() -> Self {
        Self::from_config(&SessionConfig::default())
    }
}

/// Cheap guard: local token check only, never touches the network.
pub fn check_local(path: &str, session: &Session, public: &PublicRoutes) -> Navigation {
    if !session.is_authenticated() && !public.contains(path) {
        tracing::debug!(path, "no session token, redirecting to login");
        return Navigation::redirect(public.login_path());
    }

    Navigation::Proceed
}

/// Strict guard: asks the backend whether the session is still valid.
///
/// Fails closed. Any error from the status call is logged and turned into a
/// redirect to the login page.
pub async fn verify_status(client: &ApiClient, session: &mut Session) -> Navigation {
    match client.auth_status(session).await {
        Ok(status) if status.authenticated => Navigation::Proceed,
        Ok(_) => {
            tracing::debug!("backend reports session not authenticated");
            Navigation::redirect(client.login_path())
        }
        Err(err) => {
            tracing::error!(error = %err, "auth status check failed");
            Navigation::redirect(client.login_path())
        }
    }
}
