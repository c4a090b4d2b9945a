//! Supervisor adapter that shells out to a control script.

use crate::lifecycle::ports::{ServerSupervisor, SupervisorError, SupervisorResult};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tracing::{debug, warn};

/// Runs `<program> start` and `<program> stop`.
///
/// A non-zero exit is reported as [`SupervisorError::Failed`] carrying the
/// script's stderr, or its exit status when stderr is empty.
#[derive(Debug, Clone)]
pub struct ShellSupervisor {
    program: PathBuf,
}

impl ShellSupervisor {
    /// Creates a supervisor driving `program`.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    async fn run(&self, action: &'static str) -> SupervisorResult<()> {
        debug!(program = %self.program.display(), action, "running supervisor command");
        let output = tokio::process::Command::new(&self.program)
            .arg(action)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await?;

        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_owned();
        warn!(
            program = %self.program.display(),
            action,
            status = %output.status,
            stderr = %stderr,
            "supervisor command failed"
        );
        let message = if stderr.is_empty() {
            output.status.to_string()
        } else {
            stderr
        };
        Err(SupervisorError::failed(action, message))
    }
}

#[async_trait]
impl ServerSupervisor for ShellSupervisor {
    async fn start(&self) -> SupervisorResult<()> {
        self.run("start").await
    }

    async fn stop(&self) -> SupervisorResult<()> {
        self.run("stop").await
    }
}
