//! Message store port backing notification slots and announcements.

use crate::notification::domain::MessageId;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for notification channel operations.
pub type NotificationChannelResult<T> = Result<T, NotificationChannelError>;

/// Create/edit contract of an external message store.
///
/// Announcements are plain [`create`](Self::create) calls whose identifier
/// the caller is free to ignore.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Posts a new message and returns its identifier.
    async fn create(&self, content: &str) -> NotificationChannelResult<MessageId>;

    /// Replaces the content of an existing message.
    async fn edit(&self, id: &MessageId, content: &str) -> NotificationChannelResult<()>;
}

/// Errors returned by notification channel adapters.
#[derive(Debug, Clone, Error)]
pub enum NotificationChannelError {
    /// The message no longer exists on the remote side.
    #[error("message {0} not found")]
    NotFound(MessageId),

    /// The remote side rejected the request.
    #[error("notification channel rejected request with status {status}: {body}")]
    Rejected {
        /// Status code reported by the remote side.
        status: u16,
        /// Response body, possibly truncated.
        body: String,
    },

    /// The response could not be interpreted.
    #[error("invalid notification channel response: {0}")]
    InvalidResponse(String),

    /// Transport or adapter failure.
    #[error("notification channel error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl NotificationChannelError {
    /// Wraps a transport error from the channel adapter.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }

    /// Returns whether the error means the remote message was deleted.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
