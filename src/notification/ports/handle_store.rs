//! Persistence port for slot identifiers.

use crate::notification::domain::MessageHandles;
use std::sync::Arc;
use thiserror::Error;

/// Result type for handle store operations.
pub type HandleStoreResult<T> = Result<T, HandleStoreError>;

/// Durable storage for [`MessageHandles`].
///
/// A store that has never been written must load as an empty mapping.
pub trait HandleStore: Send + Sync {
    /// Reads the persisted mapping.
    ///
    /// # Errors
    ///
    /// Returns [`HandleStoreError`] when the record exists but cannot be read
    /// or decoded.
    fn load(&self) -> HandleStoreResult<MessageHandles>;

    /// Replaces the persisted mapping.
    ///
    /// # Errors
    ///
    /// Returns [`HandleStoreError`] when the record cannot be written.
    fn save(&self, handles: &MessageHandles) -> HandleStoreResult<()>;
}

/// Errors returned by handle store adapters.
#[derive(Debug, Clone, Error)]
pub enum HandleStoreError {
    /// The stored record is not valid.
    #[error("corrupt handle record: {0}")]
    Corrupt(String),

    /// Underlying storage failure.
    #[error("handle store I/O error: {0}")]
    Io(Arc<std::io::Error>),
}

impl From<std::io::Error> for HandleStoreError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(Arc::new(err))
    }
}
