use async_trait::async_trait;
use std::io;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Captured result of a finished subprocess.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Seam for invoking external tools.
///
/// A run that exceeds `timeout` fails with [`io::ErrorKind::TimedOut`] and the
/// child is killed.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run and capture stdout/stderr.
    async fn output(&self, program: &str, args: &[&str], timeout: Duration)
        -> io::Result<CommandOutput>;

    /// Run with stdout/stderr discarded; returns whether it exited successfully.
    async fn status(&self, program: &str, args: &[&str], timeout: Duration) -> io::Result<bool>;
}

/// Runs real processes through tokio.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

fn timed_out(program: &str, args: &[&str], timeout: Duration) -> io::Error {
    io::Error::new(
        io::ErrorKind::TimedOut,
        format!("`{} {}` timed out after {:?}", program, args.join(" "), timeout),
    )
}

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn output(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> io::Result<CommandOutput> {
        debug!("Running `{} {}`", program, args.join(" "));
        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let output = tokio::time::timeout(timeout, child.wait_with_output())
            .await
            .map_err(|_| timed_out(program, args, timeout))??;

        Ok(CommandOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    async fn status(&self, program: &str, args: &[&str], timeout: Duration) -> io::Result<bool> {
        debug!("Running `{} {}` (output discarded)", program, args.join(" "));
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;

        let status = tokio::time::timeout(timeout, child.wait())
            .await
            .map_err(|_| timed_out(program, args, timeout))??;
        Ok(status.success())
    }
}
