//! Reply side of the chat service's command interface.

use crate::command::domain::{CommandInvocation, CommandReply, SlashCommand};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for interaction operations.
pub type InteractionResult<T> = Result<T, InteractionError>;

/// Registers commands and answers their invocations.
#[async_trait]
pub trait InteractionResponder: Send + Sync {
    /// Makes `commands` available to channel users, replacing earlier ones.
    async fn register(&self, commands: &[SlashCommand]) -> InteractionResult<()>;

    /// Sends the immediate reply to `invocation`.
    async fn respond(
        &self,
        invocation: &CommandInvocation,
        reply: &CommandReply,
    ) -> InteractionResult<()>;
}

/// Errors returned by interaction adapters.
#[derive(Debug, Clone, Error)]
pub enum InteractionError {
    /// The remote side rejected the request.
    #[error("interaction request rejected with status {status}: {body}")]
    Rejected {
        /// Status code reported by the remote side.
        status: u16,
        /// Response body, possibly truncated.
        body: String,
    },

    /// The response could not be interpreted.
    #[error("invalid interaction response: {0}")]
    InvalidResponse(String),

    /// Transport or adapter failure.
    #[error("interaction transport error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl InteractionError {
    /// Wraps a transport error from the adapter.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}
