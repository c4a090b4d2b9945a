//! In-memory message store.

use crate::notification::{
    domain::MessageId,
    ports::{NotificationChannel, NotificationChannelError, NotificationChannelResult},
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

/// In-memory notification channel.
///
/// Messages live in a map keyed by sequential identifiers. Tests can delete
/// messages behind the adapter's back to simulate external removal, make
/// every call fail to simulate an outage, or add latency to every call.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNotificationChannel {
    state: Arc<RwLock<ChannelState>>,
}

#[derive(Debug, Default)]
struct ChannelState {
    next_id: u64,
    messages: HashMap<MessageId, String>,
    posted: Vec<String>,
    edits: usize,
    unavailable: bool,
    latency: Duration,
}

impl InMemoryNotificationChannel {
    /// Creates an empty channel.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes a message as if it had been deleted by a channel user.
    pub fn delete(&self, id: &MessageId) -> bool {
        self.write_state().messages.remove(id).is_some()
    }

    /// Makes every subsequent call fail (or succeed again).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.write_state().unavailable = unavailable;
    }

    /// Delays every subsequent call by `latency` before it takes effect.
    pub fn set_latency(&self, latency: Duration) {
        self.write_state().latency = latency;
    }

    /// Returns the current content of a message.
    #[must_use]
    pub fn content(&self, id: &MessageId) -> Option<String> {
        self.read_state().messages.get(id).cloned()
    }

    /// Returns the content of every successfully created message, in order.
    #[must_use]
    pub fn posted(&self) -> Vec<String> {
        self.read_state().posted.clone()
    }

    /// Returns how many edits were applied.
    #[must_use]
    pub fn edit_count(&self) -> usize {
        self.read_state().edits
    }

    fn read_state(&self) -> RwLockReadGuard<'_, ChannelState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, ChannelState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    async fn delay(&self) {
        let latency = self.read_state().latency;
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
    }
}

fn unavailable() -> NotificationChannelError {
    NotificationChannelError::transport(std::io::Error::other("channel unavailable"))
}

#[async_trait]
impl NotificationChannel for InMemoryNotificationChannel {
    async fn create(&self, content: &str) -> NotificationChannelResult<MessageId> {
        self.delay().await;
        let mut state = self.write_state();
        if state.unavailable {
            return Err(unavailable());
        }
        state.next_id += 1;
        let id = MessageId::new(format!("msg-{}", state.next_id))
            .ok_or_else(|| NotificationChannelError::InvalidResponse("blank id".to_owned()))?;
        state.messages.insert(id.clone(), content.to_owned());
        state.posted.push(content.to_owned());
        Ok(id)
    }

    async fn edit(&self, id: &MessageId, content: &str) -> NotificationChannelResult<()> {
        self.delay().await;
        let mut state = self.write_state();
        if state.unavailable {
            return Err(unavailable());
        }
        let Some(existing) = state.messages.get_mut(id) else {
            return Err(NotificationChannelError::NotFound(id.clone()));
        };
        content.clone_into(existing);
        state.edits += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn edit_after_delete_reports_not_found() {
        let channel = InMemoryNotificationChannel::new();
        let id = channel.create("hello").await.expect("create should succeed");

        assert!(channel.delete(&id));
        let result = channel.edit(&id, "updated").await;

        assert!(matches!(result, Err(NotificationChannelError::NotFound(_))));
    }

    #[tokio::test]
    async fn unavailable_channel_rejects_calls() {
        let channel = InMemoryNotificationChannel::new();
        channel.set_unavailable(true);

        let result = channel.create("hello").await;

        assert!(matches!(result, Err(NotificationChannelError::Transport(_))));
        assert!(channel.posted().is_empty());
    }

    #[tokio::test]
    async fn poisoned_lock_does_not_break_writes() {
        let channel = InMemoryNotificationChannel::new();
        let poisoner = channel.clone();
        let outcome = std::thread::spawn(move || {
            let _guard = poisoner.write_state();
            panic!("poison the channel lock");
        })
        .join();
        assert!(outcome.is_err());

        let id = channel.create("hello").await.expect("create should recover");
        channel
            .edit(&id, "updated")
            .await
            .expect("edit should recover");

        assert_eq!(channel.content(&id).as_deref(), Some("updated"));
    }

    #[tokio::test(start_paused = true)]
    async fn latency_delays_each_call() {
        let channel = InMemoryNotificationChannel::new();
        channel.set_latency(Duration::from_secs(15));
        let started = tokio::time::Instant::now();

        channel.create("hello").await.expect("create should succeed");

        assert!(started.elapsed() >= Duration::from_secs(15));
    }
}
