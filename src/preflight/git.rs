use std::time::Duration;
use tracing::debug;

use super::runner::CommandRunner;
use crate::error::StartupError;
use crate::version::Version;

/// Bound on `git --version`
pub const GIT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Check that `git` is installed and at least `min_version`.
///
/// Anything on stderr is treated as a failure even when stdout looks fine.
pub async fn check_git_version(
    runner: &dyn CommandRunner,
    min_version: Version,
) -> Result<Version, StartupError> {
    let output = runner
        .output("git", &["--version"], GIT_PROBE_TIMEOUT)
        .await
        .map_err(|e| {
            StartupError::ToolVersion(format!(
                "Failed to run `git --version`: {}. Please install Git {} or newer.",
                e, min_version
            ))
        })?;

    if !output.stderr.is_empty() {
        return Err(StartupError::ToolVersion(format!(
            "`git --version` reported an error: {}",
            output.stderr.trim()
        )));
    }

    if !output.success {
        return Err(StartupError::ToolVersion(format!(
            "`git --version` exited with a failure status. Please check your Git installation (need {} or newer).",
            min_version
        )));
    }

    let version = Version::parse_git_output(&output.stdout).ok_or_else(|| {
        StartupError::ToolVersion(format!(
            "Unexpected output from `git --version`: {:?}",
            output.stdout.trim()
        ))
    })?;

    if version < min_version {
        return Err(StartupError::ToolVersion(format!(
            "Git version {} is too old. Please upgrade to at least {}.",
            version, min_version
        )));
    }

    debug!("Git version {} (minimum {})", version, min_version);
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preflight::runner::testing::{stdout, FakeRunner};
    use crate::preflight::runner::CommandOutput;
    use std::io;

    const MIN: Version = Version::new(2, 25, 0);

    #[tokio::test]
    async fn test_recent_git_passes() {
        let runner = FakeRunner::new().with_output("git --version", stdout("git version 2.39.2\n"));
        let version = check_git_version(&runner, MIN).await.unwrap();
        assert_eq!(version, Version::new(2, 39, 2));
    }

    #[tokio::test]
    async fn test_exact_minimum_passes() {
        let runner = FakeRunner::new().with_output("git --version", stdout("git version 2.25.0"));
        assert!(check_git_version(&runner, MIN).await.is_ok());
    }

    #[tokio::test]
    async fn test_old_git_fails() {
        let runner = FakeRunner::new().with_output("git --version", stdout("git version 2.20.0\n"));
        let err = check_git_version(&runner, MIN).await.unwrap_err();
        assert!(matches!(err, StartupError::ToolVersion(_)));
        assert_eq!(
            err.to_string(),
            "Git version 2.20.0 is too old. Please upgrade to at least 2.25.0."
        );
    }

    #[tokio::test]
    async fn test_stderr_fails_regardless_of_stdout() {
        let runner = FakeRunner::new().with_output(
            "git --version",
            Ok(CommandOutput {
                success: true,
                stdout: "git version 2.39.2\n".to_string(),
                stderr: "warning: unable to access config\n".to_string(),
            }),
        );
        let err = check_git_version(&runner, MIN).await.unwrap_err();
        assert!(err.to_string().contains("unable to access config"));
    }

    #[tokio::test]
    async fn test_blank_stderr_still_fails() {
        let runner = FakeRunner::new().with_output(
            "git --version",
            Ok(CommandOutput {
                success: true,
                stdout: "git version 2.39.2\n".to_string(),
                stderr: "\n".to_string(),
            }),
        );
        let err = check_git_version(&runner, MIN).await.unwrap_err();
        assert!(matches!(err, StartupError::ToolVersion(_)));
    }

    #[tokio::test]
    async fn test_malformed_output_fails() {
        let runner = FakeRunner::new().with_output("git --version", stdout("version 2.39.2"));
        let err = check_git_version(&runner, MIN).await.unwrap_err();
        assert!(err.to_string().contains("Unexpected output"));
    }

    #[tokio::test]
    async fn test_missing_git_fails() {
        let runner = FakeRunner::new().with_output(
            "git --version",
            Err(io::Error::new(io::ErrorKind::NotFound, "No such file or directory")),
        );
        let err = check_git_version(&runner, MIN).await.unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("install Git 2.25.0"));
    }

    #[tokio::test]
    async fn test_timeout_fails() {
        let runner = FakeRunner::new().with_output(
            "git --version",
            Err(io::Error::new(io::ErrorKind::TimedOut, "timed out")),
        );
        assert!(matches!(
            check_git_version(&runner, MIN).await,
            Err(StartupError::ToolVersion(_))
        ));
    }
}
