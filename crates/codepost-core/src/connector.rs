//! Building an upsert client from the credential loaded for an attempt.

use std::sync::Arc;

use repo_contents::{ContentsApi, ContentsConfig, ContentsError, GithubContentsApi, UpsertClient};

/// Creates the contents client once the token is known.
pub trait ContentsConnector: Send + Sync {
    fn connect(&self, token: &str) -> Result<UpsertClient, ContentsError>;

    /// Transport for read-only calls such as `verify_access`.
    fn api(&self, token: &str) -> Result<Arc<dyn ContentsApi>, ContentsError>;
}

/// Connects to GitHub over HTTPS.
#[derive(Debug, Clone, Default)]
pub struct GithubConnector {
    config: ContentsConfig,
}

impl GithubConnector {
    pub fn new(config: ContentsConfig) -> Self {
        GithubConnector { config }
    }
}

impl ContentsConnector for GithubConnector {
    fn connect(&self, token: &str) -> Result<UpsertClient, ContentsError> {
        Ok(UpsertClient::new(self.api(token)?, self.config.clone()))
    }

    fn api(&self, token: &str) -> Result<Arc<dyn ContentsApi>, ContentsError> {
        Ok(Arc::new(GithubContentsApi::new(self.config.clone(), token)?))
    }
}

/// Hands out an existing transport regardless of token.
#[derive(Clone)]
pub struct SharedApiConnector {
    api: Arc<dyn ContentsApi>,
    config: ContentsConfig,
}

impl SharedApiConnector {
    pub fn new(api: Arc<dyn ContentsApi>, config: ContentsConfig) -> Self {
        SharedApiConnector { api, config }
    }
}

impl ContentsConnector for SharedApiConnector {
    fn connect(&self, _token: &str) -> Result<UpsertClient, ContentsError> {
        Ok(UpsertClient::new(self.api.clone(), self.config.clone()))
    }

    fn api(&self, _token: &str) -> Result<Arc<dyn ContentsApi>, ContentsError> {
        Ok(self.api.clone())
    }
}
