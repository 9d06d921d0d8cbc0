//! Contents API transport
//!
//! The [`ContentsApi`] trait is the seam between the upsert algorithm and the
//! network. [`GithubContentsApi`] talks to a real GitHub (or GitHub
//! Enterprise) endpoint; [`crate::fakes::MemoryContentsApi`] stands in for it
//! in tests.

use crate::error::{ContentsError, TransportError};
use crate::request::FileLocation;
use crate::upsert::WritePayload;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Status and body of an HTTP response, before any interpretation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        RawResponse {
            status,
            body: body.into(),
        }
    }

    /// Assemble a response once the status line has arrived. An unreadable
    /// body on a 2xx stays a success with an empty body; on any other status
    /// it is a transport failure.
    pub fn from_parts(
        status: u16,
        body: Result<String, TransportError>,
    ) -> Result<RawResponse, TransportError> {
        match body {
            Ok(body) => Ok(RawResponse { status, body }),
            Err(err) if (200..300).contains(&status) => {
                debug!(status, error = %err, "Discarding unreadable success body");
                Ok(RawResponse::new(status, ""))
            }
            Err(err) => Err(err),
        }
    }

    /// 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Read/write access to one file path in a remote repository.
///
/// Implementations must not retry and must not interpret status codes:
/// any HTTP response is returned as `Ok(RawResponse)`, and only the absence
/// of a response is an `Err`.
#[async_trait]
pub trait ContentsApi: Send + Sync {
    /// `GET {base}/repos/{owner}/{repo}/contents/{path}`
    async fn lookup(&self, location: &FileLocation) -> Result<RawResponse, TransportError>;

    /// `PUT {base}/repos/{owner}/{repo}/contents/{path}` with a JSON payload.
    async fn write(
        &self,
        location: &FileLocation,
        payload: &WritePayload,
    ) -> Result<RawResponse, TransportError>;

    /// `GET {base}/repos/{owner}/{repo}/contents/`
    async fn repository_root(&self, owner: &str, repo: &str)
        -> Result<RawResponse, TransportError>;
}

/// Endpoints of the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentsConfig {
    /// REST API base URL
    pub api_base: String,
    /// Web UI base URL, used for browseable links
    pub web_base: String,
    /// Branch shown in success links
    pub branch: String,
    /// Provider status page, linked on transport errors
    pub status_page: String,
}

impl Default for ContentsConfig {
    fn default() -> Self {
        ContentsConfig {
            api_base: "https://api.github.com".to_string(),
            web_base: "https://github.com".to_string(),
            branch: "main".to_string(),
            status_page: "https://www.githubstatus.com/".to_string(),
        }
    }
}

impl ContentsConfig {
    /// Defaults overridden by `CODEPOST_API_BASE`, `CODEPOST_WEB_BASE` and
    /// `CODEPOST_BRANCH` when set.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        ContentsConfig {
            api_base: std::env::var("CODEPOST_API_BASE").unwrap_or(defaults.api_base),
            web_base: std::env::var("CODEPOST_WEB_BASE").unwrap_or(defaults.web_base),
            branch: std::env::var("CODEPOST_BRANCH").unwrap_or(defaults.branch),
            status_page: defaults.status_page,
        }
    }

    /// Create config for a specific API endpoint
    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }

    fn url_for(&self, api_path: &str) -> String {
        format!("{}/{}", self.api_base.trim_end_matches('/'), api_path)
    }
}

/// reqwest-backed contents API client authenticated with a bearer token
pub struct GithubContentsApi {
    config: ContentsConfig,
    http_client: reqwest::Client,
}

impl GithubContentsApi {
    /// Create a client that sends `Authorization: Bearer <token>` on every call.
    pub fn new(config: ContentsConfig, token: &str) -> Result<Self, ContentsError> {
        if token.trim().is_empty() {
            return Err(ContentsError::InvalidCredential(
                "token is empty".to_string(),
            ));
        }

        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token.trim()))
            .map_err(|e| ContentsError::InvalidCredential(e.to_string()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );

        let http_client = reqwest::Client::builder()
            .user_agent(concat!("codepost/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()?;

        Ok(GithubContentsApi {
            config,
            http_client,
        })
    }

    pub fn config(&self) -> &ContentsConfig {
        &self.config
    }

    async fn into_raw(response: reqwest::Response) -> Result<RawResponse, TransportError> {
        let status = response.status().as_u16();
        let body = response.text().await.map_err(TransportError::from);
        RawResponse::from_parts(status, body)
    }
}

#[async_trait]
impl ContentsApi for GithubContentsApi {
    async fn lookup(&self, location: &FileLocation) -> Result<RawResponse, TransportError> {
        let url = self.config.url_for(&location.contents_path());
        debug!(%url, "GET contents");
        let response = self.http_client.get(&url).send().await?;
        Self::into_raw(response).await
    }

    async fn write(
        &self,
        location: &FileLocation,
        payload: &WritePayload,
    ) -> Result<RawResponse, TransportError> {
        let url = self.config.url_for(&location.contents_path());
        debug!(%url, has_sha = payload.sha.is_some(), "PUT contents");
        let response = self.http_client.put(&url).json(payload).send().await?;
        Self::into_raw(response).await
    }

    async fn repository_root(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<RawResponse, TransportError> {
        let url = self
            .config
            .url_for(&format!("repos/{}/{}/contents/", owner, repo));
        debug!(%url, "GET repository root");
        let response = self.http_client.get(&url).send().await?;
        Self::into_raw(response).await
    }
}
