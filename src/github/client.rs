use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::http::execute;
use super::types::{ApiError, CommitResponse, Repository, User};
use crate::config::DojoConfig;
use crate::constants::VERSION;

/// Operations the startup path needs from a source-hosting API.
///
/// [`GitHubApi`] is the real implementation; tests substitute scripted doubles.
#[async_trait]
pub trait RepoHost: Send + Sync {
    /// Whether requests carry credentials
    fn is_authenticated(&self) -> bool;

    /// Resolve the identity behind the configured token
    async fn authenticated_user(&self) -> Result<User, ApiError>;

    /// Look up a repository by `owner/name`
    async fn get_repo(&self, full_name: &str) -> Result<Repository, ApiError>;

    /// SHA of the commit `git_ref` points at
    async fn latest_commit(&self, full_name: &str, git_ref: &str) -> Result<String, ApiError>;
}

/// GitHub rejects requests without a User-Agent
fn build_user_agent() -> String {
    format!("lean-dojo/{}", VERSION)
}

/// GitHub REST client, authenticated or anonymous
pub struct GitHubApi {
    client: Client,
    base_url: Url,
    token: Option<String>,
    user_agent: String,
}

impl GitHubApi {
    pub fn new(base_url: &str, token: Option<String>, timeout_secs: u64) -> Result<Self, ApiError> {
        // Url::join drops the last segment unless the base ends with '/'
        let normalized = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalized)
            .map_err(|e| ApiError::transport(format!("Invalid GitHub API URL {}: {}", base_url, e)))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ApiError::transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            token: token.filter(|t| !t.is_empty()),
            user_agent: build_user_agent(),
        })
    }

    pub fn from_config(config: &DojoConfig) -> Result<Self, ApiError> {
        Self::new(
            &config.github_api_url,
            config.github_token.clone(),
            config.github_timeout_secs,
        )
    }

    fn build_url(&self, endpoint: &str) -> Result<Url, ApiError> {
        self.base_url.join(endpoint).map_err(|e| {
            ApiError::transport(format!("Failed to build URL for endpoint {}: {}", endpoint, e))
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        let url = self.build_url(endpoint)?;
        debug!("GitHub API GET {}", url);

        let mut request = self
            .client
            .get(url.clone())
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .header("User-Agent", &self.user_agent);

        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = execute(request).await?;
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::transport(format!("Failed to read response body: {}", e)))?;
        serde_json::from_str(&text)
            .map_err(|e| ApiError::transport(format!("Failed to parse response from {}: {}", url, e)))
    }
}

#[async_trait]
impl RepoHost for GitHubApi {
    fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    async fn authenticated_user(&self) -> Result<User, ApiError> {
        self.get_json("user").await
    }

    async fn get_repo(&self, full_name: &str) -> Result<Repository, ApiError> {
        self.get_json(&format!("repos/{}", full_name)).await
    }

    async fn latest_commit(&self, full_name: &str, git_ref: &str) -> Result<String, ApiError> {
        let commit: CommitResponse = self
            .get_json(&format!("repos/{}/commits/{}", full_name, git_ref))
            .await?;
        Ok(commit.sha)
    }
}

impl std::fmt::Debug for GitHubApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubApi")
            .field("base_url", &self.base_url.as_str())
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}
