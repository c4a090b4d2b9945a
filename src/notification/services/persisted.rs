//! Fail-soft wrapper around the handle store.

use crate::notification::{domain::MessageHandles, ports::HandleStore};
use std::sync::Arc;
use tracing::{debug, warn};

/// Loads and saves slot identifiers without ever failing the caller.
///
/// The in-memory mapping held by the caller stays authoritative; storage
/// problems are logged and otherwise ignored.
#[derive(Debug)]
pub struct PersistedHandles<H>
where
    H: HandleStore,
{
    store: Arc<H>,
}

impl<H> Clone for PersistedHandles<H>
where
    H: HandleStore,
{
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<H> PersistedHandles<H>
where
    H: HandleStore,
{
    /// Wraps a handle store.
    #[must_use]
    pub const fn new(store: Arc<H>) -> Self {
        Self { store }
    }

    /// Reads the persisted mapping, falling back to an empty one.
    #[must_use]
    pub fn load(&self) -> MessageHandles {
        match self.store.load() {
            Ok(handles) => {
                debug!(?handles, "loaded message handles");
                handles
            }
            Err(err) => {
                warn!(error = %err, "could not load message handles, starting empty");
                MessageHandles::new()
            }
        }
    }

    /// Writes the mapping, logging any failure.
    pub fn save(&self, handles: &MessageHandles) {
        if let Err(err) = self.store.save(handles) {
            warn!(error = %err, "could not save message handles");
        }
    }
}
