use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::auth::{ApiClient, FetchError, PublicRoutes};
use crate::config::AppConfig;

/// Shared, read-only state handed to every handler and middleware
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub backend_url: Url,
    pub http: reqwest::Client,
    pub client: ApiClient,
    pub public_routes: Arc<PublicRoutes>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self, FetchError> {
        config.validate_login_path()?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.backend.timeout_secs))
            .build()?;
        let backend_url = config.backend_url()?;
        let client = ApiClient::with_http(http.clone(), &config)?;
        let public_routes = PublicRoutes::from_config(&config.session);

        Ok(Self {
            config: Arc::new(config),
            backend_url,
            http,
            client,
            public_routes: Arc::new(public_routes),
        })
    }
}
