//! GitHub REST request and response types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Authenticated user from `GET /user`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub login: String,
}

/// Repository from `GET /repos/{owner}/{repo}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub full_name: String,
    pub html_url: String,
    pub clone_url: String,
    pub default_branch: String,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub pushed_at: Option<DateTime<Utc>>,
}

/// Commit from `GET /repos/{owner}/{repo}/commits/{ref}` (only the fields we read)
#[derive(Debug, Deserialize)]
pub(super) struct CommitResponse {
    pub sha: String,
}

/// Error body GitHub returns alongside non-2xx statuses
#[derive(Debug, Deserialize)]
pub(super) struct ErrorBody {
    pub message: String,
}

/// A failed GitHub API call.
///
/// `status` is `None` when the request never produced a response (DNS,
/// connection refused, timeout).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: Option<u16>,
    pub message: String,
    pub rate_limited: bool,
}

impl ApiError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
            rate_limited: false,
        }
    }

    pub fn from_status(status: u16, message: impl Into<String>, rate_limited: bool) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
            rate_limited: rate_limited || status == 429,
        }
    }

    /// Whether the status indicates rejected credentials
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status, Some(401))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.status, Some(404))
    }

    /// Transport failures and server-side errors may succeed on a later attempt.
    pub fn is_retriable(&self) -> bool {
        match self.status {
            None => true,
            Some(status) => status == 408 || status >= 500,
        }
    }

    /// What the user can do about it
    pub fn remediation(&self) -> &'static str {
        if self.rate_limited {
            "GitHub API rate limit exceeded. Set GITHUB_ACCESS_TOKEN to raise the limit, or wait for it to reset."
        } else if self.is_unauthorized() {
            "Check that GITHUB_ACCESS_TOKEN is valid and not expired, or unset it to use anonymous access."
        } else if self.is_not_found() {
            "The repository does not exist or is not visible with the current credentials."
        } else if self.status.is_none() {
            "Check your network connection and GITHUB_API_URL."
        } else {
            "GitHub may be temporarily unavailable. Try again later."
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "HTTP {}: {}", status, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_deserialize() {
        let json = r#"{
            "id": 341160442,
            "full_name": "leanprover/lean4",
            "html_url": "https://github.com/leanprover/lean4",
            "clone_url": "https://github.com/leanprover/lean4.git",
            "default_branch": "master",
            "private": false,
            "pushed_at": "2024-05-01T12:00:00Z"
        }"#;
        let repo: Repository = serde_json::from_str(json).unwrap();
        assert_eq!(repo.full_name, "leanprover/lean4");
        assert_eq!(repo.default_branch, "master");
        assert!(repo.pushed_at.is_some());
    }

    #[test]
    fn test_api_error_display_and_hints() {
        let err = ApiError::from_status(404, "Not Found", false);
        assert_eq!(err.to_string(), "HTTP 404: Not Found");
        assert!(err.is_not_found());
        assert!(!err.is_retriable());

        let err = ApiError::from_status(429, "slow down", false);
        assert!(err.rate_limited);
        assert!(err.remediation().contains("GITHUB_ACCESS_TOKEN"));

        let err = ApiError::transport("connection refused");
        assert_eq!(err.to_string(), "connection refused");
        assert!(err.is_retriable());

        assert!(ApiError::from_status(502, "Bad Gateway", false).is_retriable());
        assert!(ApiError::from_status(401, "Bad credentials", false).is_unauthorized());
    }
}
