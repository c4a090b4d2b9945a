//! Process supervisor port used to start and stop the game server.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for supervisor operations.
pub type SupervisorResult<T> = Result<T, SupervisorError>;

/// Start/stop contract of the external server supervisor.
///
/// Both calls block until the supervisor command has finished. Neither call
/// confirms that the server is reachable; that is left to status probes.
#[async_trait]
pub trait ServerSupervisor: Send + Sync {
    /// Starts the game server.
    async fn start(&self) -> SupervisorResult<()>;

    /// Stops the game server.
    async fn stop(&self) -> SupervisorResult<()>;
}

/// Errors returned by supervisor adapters.
#[derive(Debug, Clone, Error)]
pub enum SupervisorError {
    /// The supervisor ran but reported failure.
    #[error("supervisor {action} failed: {message}")]
    Failed {
        /// Action that failed (`start` or `stop`).
        action: &'static str,
        /// Diagnostic output from the supervisor.
        message: String,
    },

    /// The supervisor could not be launched at all.
    #[error("supervisor unavailable: {0}")]
    Unavailable(Arc<std::io::Error>),
}

impl SupervisorError {
    /// Builds a failure for `action` with the supervisor's diagnostic text.
    pub fn failed(action: &'static str, message: impl Into<String>) -> Self {
        Self::Failed {
            action,
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for SupervisorError {
    fn from(err: std::io::Error) -> Self {
        Self::Unavailable(Arc::new(err))
    }
}
