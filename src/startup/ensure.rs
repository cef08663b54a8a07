//! Startup ensure mechanism: directories, GitHub, git, Docker.
//!
//! Steps run strictly in order and the first fatal failure stops the sequence:
//! ```text
//! dirs.ensure()       // cache dir exists, TMP_DIR writable
//! github.ensure()     // token valid, lean4 + lean4-nightly resolved
//! git.ensure()        // git >= 2.25.0
//! container.ensure()  // docker reachable (docker mode only), image pulled
//! ```
//!
//! Steps can be switched off individually for callers that do not need the
//! corresponding capability.

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info};

use crate::config::DojoConfig;
use crate::error::StartupError;
use crate::github::{RepoClient, RepoHost};
use crate::preflight::{ContainerStatus, Preflight, PullOutcome};
use crate::version::Version;

/// State of each ensure component
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum EnsureStatus {
    #[default]
    NotStarted,
    InProgress,
    Success,
    Skipped,
    Failed(String),
}

impl EnsureStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, EnsureStatus::Success)
    }
}

/// Everything validated during startup
#[derive(Debug)]
pub struct StartupState {
    pub config: DojoConfig,
    /// `None` when the GitHub step was disabled
    pub repos: Option<RepoClient>,
    /// `None` when the git step was disabled
    pub git_version: Option<Version>,
    pub container: ContainerStatus,
}

/// Orchestrates the ensure steps over a resolved configuration.
///
/// # Example
/// ```ignore
/// let config = DojoConfig::from_env()?;
/// let mut ctx = StartupContext::new(config, Preflight::system());
/// let state = ctx.ensure_all().await?;
/// ```
pub struct StartupContext {
    config: DojoConfig,
    preflight: Preflight,
    repo_host: Option<Arc<dyn RepoHost>>,
    run_github: bool,
    run_git: bool,
    run_container: bool,
    dirs_status: EnsureStatus,
    github_status: EnsureStatus,
    git_status: EnsureStatus,
    container_status: EnsureStatus,
}

impl StartupContext {
    pub fn new(config: DojoConfig, preflight: Preflight) -> Self {
        Self {
            config,
            preflight,
            repo_host: None,
            run_github: true,
            run_git: true,
            run_container: true,
            dirs_status: EnsureStatus::NotStarted,
            github_status: EnsureStatus::NotStarted,
            git_status: EnsureStatus::NotStarted,
            container_status: EnsureStatus::NotStarted,
        }
    }

    /// Use `host` instead of the GitHub API described by the config
    pub fn with_repo_host(mut self, host: Arc<dyn RepoHost>) -> Self {
        self.repo_host = Some(host);
        self
    }

    pub fn with_github(mut self, enabled: bool) -> Self {
        self.run_github = enabled;
        self
    }

    pub fn with_git(mut self, enabled: bool) -> Self {
        self.run_git = enabled;
        self
    }

    pub fn with_container(mut self, enabled: bool) -> Self {
        self.run_container = enabled;
        self
    }

    fn ensure_dirs(&mut self) -> Result<(), StartupError> {
        self.dirs_status = EnsureStatus::InProgress;
        match self.config.prepare_dirs() {
            Ok(()) => {
                self.dirs_status = EnsureStatus::Success;
                Ok(())
            }
            Err(e) => {
                error!("❌ {:#}", e);
                self.dirs_status = EnsureStatus::Failed(format!("{:#}", e));
                Err(StartupError::Directories(e))
            }
        }
    }

    async fn ensure_github(&mut self) -> Result<Option<RepoClient>, StartupError> {
        if !self.run_github {
            self.github_status = EnsureStatus::Skipped;
            return Ok(None);
        }

        info!("🔗 Resolving GitHub repositories...");
        self.github_status = EnsureStatus::InProgress;

        let result = match &self.repo_host {
            Some(host) => RepoClient::build_with(host.clone()).await,
            None => RepoClient::build(&self.config).await,
        };

        match result {
            Ok(client) => {
                info!(
                    "✅ GitHub ready ({})",
                    client
                        .login()
                        .map(|l| format!("authenticated as {}", l))
                        .unwrap_or_else(|| "anonymous".to_string())
                );
                self.github_status = EnsureStatus::Success;
                Ok(Some(client))
            }
            Err(e) => {
                error!("❌ {}", e);
                self.github_status = EnsureStatus::Failed(e.to_string());
                Err(e)
            }
        }
    }

    async fn ensure_git(&mut self) -> Result<Option<Version>, StartupError> {
        if !self.run_git {
            self.git_status = EnsureStatus::Skipped;
            return Ok(None);
        }

        info!("🔧 Checking git version...");
        self.git_status = EnsureStatus::InProgress;

        match self.preflight.check_version_control().await {
            Ok(version) => {
                info!("✅ git {}", version);
                self.git_status = EnsureStatus::Success;
                Ok(Some(version))
            }
            Err(e) => {
                error!("❌ {}", e);
                self.git_status = EnsureStatus::Failed(e.to_string());
                Err(e)
            }
        }
    }

    async fn ensure_container(&mut self) -> Result<ContainerStatus, StartupError> {
        if !self.run_container {
            self.container_status = EnsureStatus::Skipped;
            return Ok(ContainerStatus::Skipped);
        }

        info!(
            "🐳 Checking container runtime (CONTAINER={})...",
            self.config.container_mode
        );
        self.container_status = EnsureStatus::InProgress;

        match self
            .preflight
            .check_container_runtime(self.config.container_mode)
            .await
        {
            Ok(status) => {
                match &status {
                    ContainerStatus::Skipped => info!("✅ Running natively"),
                    ContainerStatus::Ready(PullOutcome::Pulled) => info!("✅ Docker ready"),
                    ContainerStatus::Ready(PullOutcome::Failed(_)) => {
                        info!("✅ Docker ready (image pull failed, see warning above)")
                    }
                }
                self.container_status = if status == ContainerStatus::Skipped {
                    EnsureStatus::Skipped
                } else {
                    EnsureStatus::Success
                };
                Ok(status)
            }
            Err(e) => {
                error!("❌ {}", e);
                self.container_status = EnsureStatus::Failed(e.to_string());
                Err(e)
            }
        }
    }

    /// Run all enabled ensure steps and return the validated state.
    pub async fn ensure_all(&mut self) -> Result<StartupState, StartupError> {
        self.ensure_dirs()?;
        let repos = self.ensure_github().await?;
        let git_version = self.ensure_git().await?;
        let container = self.ensure_container().await?;

        Ok(StartupState {
            config: self.config.clone(),
            repos,
            git_version,
            container,
        })
    }

    pub fn dirs_status(&self) -> &EnsureStatus {
        &self.dirs_status
    }

    pub fn github_status(&self) -> &EnsureStatus {
        &self.github_status
    }

    pub fn git_status(&self) -> &EnsureStatus {
        &self.git_status
    }

    pub fn container_status(&self) -> &EnsureStatus {
        &self.container_status
    }
}
