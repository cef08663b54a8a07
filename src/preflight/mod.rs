//! Checks on external tools that must pass before any work starts.
//!
//! Each check is independently invocable so callers only pay for the
//! capabilities they need.

mod container;
mod git;
mod runner;

use std::sync::Arc;

pub use container::{
    check_container_runtime, ContainerStatus, PullOutcome, DOCKER_PROBE_TIMEOUT,
    DOCKER_PULL_TIMEOUT,
};
pub use git::{check_git_version, GIT_PROBE_TIMEOUT};
pub use runner::{CommandOutput, CommandRunner, SystemRunner};

use crate::config::ContainerMode;
use crate::constants::MIN_GIT_VERSION;
use crate::error::StartupError;
use crate::version::Version;

#[cfg(test)]
pub(crate) use runner::testing;

/// Tool checks bound to a command runner.
#[derive(Clone)]
pub struct Preflight {
    runner: Arc<dyn CommandRunner>,
}

impl Preflight {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    /// Preflight against the real system
    pub fn system() -> Self {
        Self::new(Arc::new(SystemRunner))
    }

    /// Require git >= 2.25.0
    pub async fn check_version_control(&self) -> Result<Version, StartupError> {
        check_git_version(self.runner.as_ref(), MIN_GIT_VERSION).await
    }

    /// Require a reachable Docker daemon in docker mode and pull the image
    pub async fn check_container_runtime(
        &self,
        mode: ContainerMode,
    ) -> Result<ContainerStatus, StartupError> {
        check_container_runtime(self.runner.as_ref(), mode).await
    }
}

impl Default for Preflight {
    fn default() -> Self {
        Self::system()
    }
}
