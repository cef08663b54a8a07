//! Fatal startup failures.
//!
//! Every variant's message says what to change (an environment variable or an
//! external action) so the CLI can print it as-is.

use thiserror::Error;

use crate::config::ConfigError;
use crate::github::ApiError;

#[derive(Debug, Error)]
pub enum StartupError {
    /// An environment variable is present but malformed
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Cache or temp directory cannot be used
    #[error("{0:#}")]
    Directories(anyhow::Error),

    /// The HTTP client could not be constructed
    #[error("Failed to set up GitHub client: {0}. Check GITHUB_API_URL.")]
    HttpClient(ApiError),

    /// GITHUB_ACCESS_TOKEN was rejected by the API
    #[error("GitHub access token was rejected ({0}). {}", .0.remediation())]
    Authentication(ApiError),

    /// A required repository could not be resolved; restart once fixed
    #[error("Failed to resolve GitHub repository {repo} ({source}). {}", .source.remediation())]
    RepoResolution { repo: String, source: ApiError },

    /// git missing, noisy, or too old
    #[error("{0}")]
    ToolVersion(String),

    /// Docker selected but not reachable
    #[error(
        "Failed to access Docker ({0}). Please make sure Docker is running and you have access. \
         Alternatively, run without Docker by setting the CONTAINER environment variable to `native`."
    )]
    ContainerUnavailable(String),
}
