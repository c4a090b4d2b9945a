//! Create-or-update delivery for named notification slots.

use super::PersistedHandles;
use crate::notification::{
    domain::{MessageHandles, MessageId, NotificationSlot},
    ports::{HandleStore, NotificationChannel},
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Best-effort writer for notification slots and announcements.
///
/// Every operation swallows channel errors after logging them: callers get
/// `None` back instead of an error. A slot whose message was deleted
/// remotely is recreated on the next write and the new identifier is
/// persisted immediately.
pub struct NotificationSink<N, H>
where
    N: NotificationChannel,
    H: HandleStore,
{
    channel: Arc<N>,
    persisted: PersistedHandles<H>,
    handles: MessageHandles,
    rendered: HashMap<NotificationSlot, String>,
}

impl<N, H> NotificationSink<N, H>
where
    N: NotificationChannel,
    H: HandleStore,
{
    /// Creates a sink, restoring slot identifiers from `persisted`.
    #[must_use]
    pub fn new(channel: Arc<N>, persisted: PersistedHandles<H>) -> Self {
        let handles = persisted.load();
        Self {
            channel,
            persisted,
            handles,
            rendered: HashMap::new(),
        }
    }

    /// Returns the identifier currently bound to `slot`.
    #[must_use]
    pub const fn handle(&self, slot: NotificationSlot) -> Option<&MessageId> {
        self.handles.get(slot)
    }

    /// Writes `content` to `slot`, creating the message when needed.
    ///
    /// Content identical to the last successful write is not re-sent.
    pub async fn upsert(&mut self, slot: NotificationSlot, content: &str) -> Option<MessageId> {
        if let Some(id) = self.handles.get(slot).cloned() {
            if self.rendered.get(&slot).is_some_and(|last| last == content) {
                return Some(id);
            }
            match self.channel.edit(&id, content).await {
                Ok(()) => {
                    self.rendered.insert(slot, content.to_owned());
                    return Some(id);
                }
                Err(err) if err.is_not_found() => {
                    info!(%slot, message_id = %id, "slot message disappeared, recreating");
                    self.clear(slot);
                }
                Err(err) => {
                    warn!(%slot, message_id = %id, error = %err, "could not update slot");
                    return None;
                }
            }
        }
        self.create(slot, content).await
    }

    /// Rewrites `slot` only if it is already bound to a message.
    pub async fn refresh(&mut self, slot: NotificationSlot, content: &str) -> Option<MessageId> {
        if self.handles.get(slot).is_none() {
            debug!(%slot, "slot has no message, skipping refresh");
            return None;
        }
        self.upsert(slot, content).await
    }

    /// Posts a one-off announcement that is not tied to any slot.
    pub async fn send(&self, content: &str) -> Option<MessageId> {
        match self.channel.create(content).await {
            Ok(id) => Some(id),
            Err(err) => {
                warn!(error = %err, "could not send announcement");
                None
            }
        }
    }

    /// Unbinds `slot` so the next write creates a fresh message.
    pub fn clear(&mut self, slot: NotificationSlot) {
        self.rendered.remove(&slot);
        if self.handles.clear(slot) {
            debug!(%slot, "cleared slot handle");
            self.persisted.save(&self.handles);
        }
    }

    async fn create(&mut self, slot: NotificationSlot, content: &str) -> Option<MessageId> {
        match self.channel.create(content).await {
            Ok(id) => {
                info!(%slot, message_id = %id, "created slot message");
                if self.handles.set(slot, id.clone()) {
                    self.persisted.save(&self.handles);
                }
                self.rendered.insert(slot, content.to_owned());
                Some(id)
            }
            Err(err) => {
                warn!(%slot, error = %err, "could not create slot message");
                None
            }
        }
    }
}
