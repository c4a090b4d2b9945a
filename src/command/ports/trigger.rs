//! Start requests handed to the lifecycle monitor.

use thiserror::Error;

/// Queues a server start without waiting for it.
pub trait StartTrigger: Send + Sync {
    /// Queues one start request.
    ///
    /// # Errors
    ///
    /// Returns [`StartTriggerError::Closed`] once nothing consumes requests.
    fn request_start(&self) -> Result<(), StartTriggerError>;
}

/// Errors returned by start triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StartTriggerError {
    /// The monitor has shut down.
    #[error("the lifecycle monitor is not running")]
    Closed,
}
