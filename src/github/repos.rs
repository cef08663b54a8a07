//! Process-lifetime handle to GitHub with the Lean 4 repositories resolved.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::time::sleep;
use tracing::{debug, info, warn};

use super::client::{GitHubApi, RepoHost};
use super::http::{add_jitter, retry_base_delay};
use super::types::{ApiError, Repository};
use crate::config::DojoConfig;
use crate::constants::{LEAN4_NIGHTLY_REPO, LEAN4_REPO};
use crate::error::StartupError;

/// Strip trailing slashes from a repository URL.
pub fn normalize_url(url: &str) -> &str {
    url.trim_end_matches('/')
}

/// `owner/name` from a URL such as `https://github.com/owner/name(.git)`.
pub fn repo_full_name(url: &str) -> Option<String> {
    let mut segments = normalize_url(url).rsplit('/');
    let name = segments.next()?;
    let owner = segments.next()?;
    let name = name.strip_suffix(".git").unwrap_or(name);

    if owner.is_empty() || name.is_empty() || owner.contains(':') {
        return None;
    }
    Some(format!("{}/{}", owner, name))
}

/// GitHub client plus the repositories every run depends on.
///
/// Built once by [`RepoClient::build`]; never mutated afterwards except for
/// the lookup cache behind [`RepoClient::repo_for_url`].
pub struct RepoClient {
    host: Arc<dyn RepoHost>,
    login: Option<String>,
    lean4: Repository,
    lean4_nightly: Repository,
    cache: Mutex<HashMap<String, Repository>>,
}

impl RepoClient {
    /// Build against the GitHub API described by `config`.
    pub async fn build(config: &DojoConfig) -> Result<Self, StartupError> {
        let api = GitHubApi::from_config(config).map_err(StartupError::HttpClient)?;
        Self::build_with(Arc::new(api)).await
    }

    /// Build against any [`RepoHost`].
    ///
    /// With credentials, the token is validated before anything else is
    /// requested. Repository resolution is not retried: a failure here means
    /// the process should be restarted once connectivity is fixed.
    pub async fn build_with(host: Arc<dyn RepoHost>) -> Result<Self, StartupError> {
        let login = if host.is_authenticated() {
            debug!("Using GitHub personal access token for authentication");
            let user = host
                .authenticated_user()
                .await
                .map_err(StartupError::Authentication)?;
            debug!("Authenticated to GitHub as {}", user.login);
            Some(user.login)
        } else {
            debug!("Using GitHub without authentication");
            info!("No GITHUB_ACCESS_TOKEN set. Don't be surprised if you hit the API rate limit.");
            None
        };

        let lean4 = resolve_required(host.as_ref(), LEAN4_REPO).await?;
        let lean4_nightly = resolve_required(host.as_ref(), LEAN4_NIGHTLY_REPO).await?;

        let mut cache = HashMap::new();
        cache.insert(normalize_url(&lean4.html_url).to_string(), lean4.clone());
        cache.insert(
            normalize_url(&lean4_nightly.html_url).to_string(),
            lean4_nightly.clone(),
        );

        Ok(Self {
            host,
            login,
            lean4,
            lean4_nightly,
            cache: Mutex::new(cache),
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.login.is_some()
    }

    /// Login of the token owner, if authenticated
    pub fn login(&self) -> Option<&str> {
        self.login.as_deref()
    }

    /// The Lean 4 repository
    pub fn lean4(&self) -> &Repository {
        &self.lean4
    }

    /// The Lean 4 nightly release repository
    pub fn lean4_nightly(&self) -> &Repository {
        &self.lean4_nightly
    }

    /// Resolve a repository from its URL, retrying transient failures up to
    /// `num_retries` times.
    pub async fn repo_for_url(&self, url: &str, num_retries: usize) -> Result<Repository, ApiError> {
        let url = normalize_url(url);
        if let Some(repo) = self.cached(url) {
            return Ok(repo);
        }

        let full_name = repo_full_name(url)
            .ok_or_else(|| ApiError::transport(format!("Not a repository URL: {}", url)))?;

        let mut attempt = 0;
        let repo = loop {
            match self.host.get_repo(&full_name).await {
                Ok(repo) => break repo,
                Err(err) if err.is_retriable() && attempt < num_retries => {
                    let delay = add_jitter(retry_base_delay(attempt));
                    debug!(
                        "Looking up {} failed: {}; retrying in {:?} (attempt {}/{})",
                        url,
                        err,
                        delay,
                        attempt + 1,
                        num_retries + 1
                    );
                    attempt += 1;
                    sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        };

        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(url.to_string(), repo.clone());
        }
        Ok(repo)
    }

    /// SHA of the latest commit on the default branch of the repository at `url`.
    pub async fn latest_commit(&self, url: &str) -> Result<String, ApiError> {
        let repo = self.repo_for_url(url, 1).await?;
        self.host
            .latest_commit(&repo.full_name, &repo.default_branch)
            .await
    }

    fn cached(&self, url: &str) -> Option<Repository> {
        match self.cache.lock() {
            Ok(cache) => cache.get(url).cloned(),
            Err(_) => {
                warn!("Repository cache lock poisoned; bypassing cache");
                None
            }
        }
    }
}

async fn resolve_required(host: &dyn RepoHost, full_name: &str) -> Result<Repository, StartupError> {
    let repo = host
        .get_repo(full_name)
        .await
        .map_err(|source| StartupError::RepoResolution {
            repo: full_name.to_string(),
            source,
        })?;
    debug!("Resolved {} ({})", repo.full_name, repo.html_url);
    Ok(repo)
}

impl std::fmt::Debug for RepoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepoClient")
            .field("login", &self.login)
            .field("lean4", &self.lean4.full_name)
            .field("lean4_nightly", &self.lean4_nightly.full_name)
            .finish()
    }
}
