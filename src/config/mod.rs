use axum::http::HeaderValue;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use url::Url;

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:5001";
pub const DEFAULT_SESSION_COOKIE: &str = "ms_token";
pub const DEFAULT_LOGIN_PATH: &str = "/login";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub backend: BackendConfig,
    pub session: SessionConfig,
    pub server: ServerConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub login_path: String,
    pub public_routes: Vec<String>,
    /// Path prefixes served without a token (built assets the login page loads)
    pub public_prefixes: Vec<String>,
    /// Also ask the backend whether the session is valid before serving a page
    pub verify_status: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub static_dir: String,
    pub enable_request_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid backend base URL '{value}': {source}")]
    InvalidBaseUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("backend base URL '{0}' must use http or https")]
    UnsupportedScheme(String),
    #[error("login path {0:?} must start with '/' and be usable as a Location header")]
    InvalidLoginPath(String),
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Backend overrides
        if let Ok(v) = env::var("GATE_API_BASE_URL") {
            self.backend.base_url = v.trim().to_string();
        }
        if let Ok(v) = env::var("GATE_BACKEND_TIMEOUT_SECS") {
            self.backend.timeout_secs = v.parse().unwrap_or(self.backend.timeout_secs);
        }

        // Session overrides
        if let Ok(v) = env::var("GATE_SESSION_COOKIE") {
            if !v.trim().is_empty() {
                self.session.cookie_name = v.trim().to_string();
            }
        }
        if let Ok(v) = env::var("GATE_LOGIN_PATH") {
            if is_valid_login_path(&v) {
                self.session.login_path = v;
            } else {
                tracing::warn!("ignoring invalid GATE_LOGIN_PATH {:?}", v);
            }
        }
        if let Ok(v) = env::var("GATE_PUBLIC_ROUTES") {
            self.session.public_routes = split_list(&v);
        }
        if let Ok(v) = env::var("GATE_PUBLIC_PREFIXES") {
            self.session.public_prefixes = split_list(&v);
        }
        if let Ok(v) = env::var("GATE_VERIFY_STATUS") {
            self.session.verify_status = v.parse().unwrap_or(self.session.verify_status);
        }

        // Server overrides
        if let Some(port) = env::var("GATE_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.server.port = port;
        }
        if let Ok(v) = env::var("GATE_STATIC_DIR") {
            self.server.static_dir = v;
        }
        if let Ok(v) = env::var("GATE_ENABLE_REQUEST_LOGGING") {
            self.server.enable_request_logging = v.parse().unwrap_or(self.server.enable_request_logging);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = split_list(&v);
        }

        self
    }

    /// Parse and check the backend base URL.
    pub fn backend_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.backend.base_url).map_err(|source| ConfigError::InvalidBaseUrl {
            value: self.backend.base_url.clone(),
            source,
        })?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            _ => Err(ConfigError::UnsupportedScheme(self.backend.base_url.clone())),
        }
    }

    /// Check the login path before it is ever used as a redirect target
    pub fn validate_login_path(&self) -> Result<(), ConfigError> {
        if is_valid_login_path(&self.session.login_path) {
            Ok(())
        } else {
            Err(ConfigError::InvalidLoginPath(self.session.login_path.clone()))
        }
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            backend: BackendConfig {
                base_url: DEFAULT_API_BASE_URL.to_string(),
                timeout_secs: 30,
            },
            session: SessionConfig::default(),
            server: ServerConfig {
                port: 3000,
                static_dir: ".output/public".to_string(),
                enable_request_logging: true,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            backend: BackendConfig {
                base_url: DEFAULT_API_BASE_URL.to_string(),
                timeout_secs: 15,
            },
            session: SessionConfig::default(),
            server: ServerConfig {
                port: 3000,
                static_dir: ".output/public".to_string(),
                enable_request_logging: true,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            backend: BackendConfig {
                base_url: DEFAULT_API_BASE_URL.to_string(),
                timeout_secs: 10,
            },
            session: SessionConfig {
                verify_status: true,
                ..SessionConfig::default()
            },
            server: ServerConfig {
                port: 3000,
                static_dir: ".output/public".to_string(),
                enable_request_logging: false,
            },
            security: SecurityConfig {
                enable_cors: false,
                cors_origins: vec!["https://app.example.com".to_string()],
            },
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: DEFAULT_SESSION_COOKIE.to_string(),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            public_routes: vec![DEFAULT_LOGIN_PATH.to_string()],
            public_prefixes: vec!["/_nuxt/".to_string()],
            verify_status: false,
        }
    }
}

/// Append an API path to a base URL, keeping any path prefix the base carries
pub fn join_url(base: &Url, path: &str) -> Result<Url, url::ParseError> {
    let joined = format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    Url::parse(&joined)
}

fn is_valid_login_path(path: &str) -> bool {
    path.starts_with('/') && HeaderValue::from_str(path).is_ok()
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
