use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::runner::CommandRunner;
use crate::config::ContainerMode;
use crate::constants::DOCKER_TAG;
use crate::error::StartupError;

/// Bound on `docker version`
pub const DOCKER_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Bound on `docker pull`; the pull is best effort so a slow registry only costs
/// a warning.
pub const DOCKER_PULL_TIMEOUT: Duration = Duration::from_secs(600);

/// Result of the best-effort image pull.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum PullOutcome {
    Pulled,
    Failed(String),
}

/// Result of the container runtime check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "pull", rename_all = "snake_case")]
pub enum ContainerStatus {
    /// Native mode: nothing was probed
    Skipped,
    /// Docker reachable; image pull attempted
    Ready(PullOutcome),
}

/// Check the container runtime required by `mode`.
///
/// In native mode no process is started. In docker mode an unreachable daemon
/// is fatal, while a failed pull of the image is only logged.
pub async fn check_container_runtime(
    runner: &dyn CommandRunner,
    mode: ContainerMode,
) -> Result<ContainerStatus, StartupError> {
    if mode == ContainerMode::Native {
        debug!("CONTAINER=native; skipping Docker checks");
        return Ok(ContainerStatus::Skipped);
    }

    match runner
        .status("docker", &["version"], DOCKER_PROBE_TIMEOUT)
        .await
    {
        Ok(true) => debug!("Docker is available"),
        Ok(false) => {
            return Err(StartupError::ContainerUnavailable(
                "`docker version` failed".to_string(),
            ))
        }
        Err(e) => return Err(StartupError::ContainerUnavailable(e.to_string())),
    }

    info!("Pulling Docker image {}...", DOCKER_TAG);
    let outcome = match runner
        .status("docker", &["pull", DOCKER_TAG], DOCKER_PULL_TIMEOUT)
        .await
    {
        Ok(true) => PullOutcome::Pulled,
        Ok(false) => PullOutcome::Failed("`docker pull` exited with a failure status".to_string()),
        Err(e) => PullOutcome::Failed(e.to_string()),
    };

    if let PullOutcome::Failed(reason) = &outcome {
        warn!(
            "Failed to pull {} ({}); continuing with any locally cached image",
            DOCKER_TAG, reason
        );
    }

    Ok(ContainerStatus::Ready(outcome))
}
