//! In-memory handle store.

use crate::notification::{
    domain::MessageHandles,
    ports::{HandleStore, HandleStoreError, HandleStoreResult},
};
use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};

/// Handle store that keeps the record in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryHandleStore {
    state: Arc<RwLock<StoreState>>,
}

#[derive(Debug, Default)]
struct StoreState {
    handles: MessageHandles,
    saves: usize,
    corrupt: bool,
}

impl InMemoryHandleStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `handles`.
    #[must_use]
    pub fn with_handles(handles: MessageHandles) -> Self {
        let store = Self::new();
        store.write_state().handles = handles;
        store
    }

    /// Makes subsequent loads fail as if the record were unreadable.
    pub fn set_corrupt(&self, corrupt: bool) {
        self.write_state().corrupt = corrupt;
    }

    /// Returns the last saved record.
    #[must_use]
    pub fn snapshot(&self) -> MessageHandles {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .handles
            .clone()
    }

    /// Returns how many times the record was saved.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.state.read().unwrap_or_else(PoisonError::into_inner).saves
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl HandleStore for InMemoryHandleStore {
    fn load(&self) -> HandleStoreResult<MessageHandles> {
        let state = self
            .state
            .read()
            .map_err(|err| HandleStoreError::Corrupt(err.to_string()))?;
        if state.corrupt {
            return Err(HandleStoreError::Corrupt("simulated corruption".to_owned()));
        }
        Ok(state.handles.clone())
    }

    fn save(&self, handles: &MessageHandles) -> HandleStoreResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|err| HandleStoreError::Corrupt(err.to_string()))?;
        state.handles = handles.clone();
        state.saves += 1;
        Ok(())
    }
}
