//! Shared wiring for in-memory monitor runs.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use warden::lifecycle::{
    adapters::{MonotonicClock, memory::InMemoryGameServer},
    domain::{AutoStopPolicy, LifecyclePhase, ServerEndpoint},
    services::{LifecycleMonitor, MonitorHandle, MonitorSettings},
};
use warden::notification::{
    adapters::memory::{InMemoryHandleStore, InMemoryNotificationChannel},
    domain::NotificationSlot,
    services::{NotificationSink, PersistedHandles},
};

/// Monitor settings with the production timings and the given grace period.
pub fn settings(grace_period: Duration) -> MonitorSettings {
    let policy = AutoStopPolicy::new(
        7,
        5,
        Duration::from_secs(10),
        Duration::from_secs(300),
        grace_period,
    )
    .expect("policy should be valid");
    let endpoint = ServerEndpoint::new("127.0.0.1", "26900")
        .expect("endpoint should be valid")
        .with_password("hunter2");
    MonitorSettings::new(policy, endpoint)
}

/// A running monitor wired to in-memory adapters.
pub struct Rig {
    pub server: Arc<InMemoryGameServer>,
    pub channel: Arc<InMemoryNotificationChannel>,
    pub store: Arc<InMemoryHandleStore>,
    pub handle: MonitorHandle,
}

impl Rig {
    /// Spawns a monitor around `server` on the current runtime.
    pub fn spawn(server: InMemoryGameServer, settings: MonitorSettings) -> Self {
        let server = Arc::new(server);
        let channel = Arc::new(InMemoryNotificationChannel::new());
        let store = Arc::new(InMemoryHandleStore::new());
        let sink = NotificationSink::new(
            Arc::clone(&channel),
            PersistedHandles::new(Arc::clone(&store)),
        );
        let clock = MonotonicClock::anchored_at(DateTime::<Utc>::UNIX_EPOCH);
        let handle = LifecycleMonitor::spawn(
            settings,
            Arc::clone(&server),
            Arc::clone(&server),
            sink,
            Arc::new(clock),
        )
        .expect("monitor should start");
        Self {
            server,
            channel,
            store,
            handle,
        }
    }

    /// Returns the current phase.
    pub fn phase(&self) -> LifecyclePhase {
        self.handle.status().phase
    }

    /// Returns the current content of `slot`, if bound.
    pub fn slot_content(&self, slot: NotificationSlot) -> Option<String> {
        let handles = self.store.snapshot();
        handles.get(slot).and_then(|id| self.channel.content(id))
    }

    /// Counts posted messages containing `needle`.
    pub fn posted_containing(&self, needle: &str) -> usize {
        self.channel
            .posted()
            .iter()
            .filter(|message| message.contains(needle))
            .count()
    }

    /// Index of the first posted message containing `needle`.
    pub fn position_of(&self, needle: &str) -> Option<usize> {
        self.channel
            .posted()
            .iter()
            .position(|message| message.contains(needle))
    }
}

/// Polls `check` on paused time until it holds.
///
/// # Panics
///
/// Panics if the condition does not hold within twenty virtual minutes.
pub async fn eventually(what: &str, mut check: impl FnMut() -> bool) {
    for _ in 0..2_400 {
        if check() {
            settle().await;
            return;
        }
        tokio::time::sleep(Duration::from_millis(500)).await;
    }
    panic!("timed out waiting for {what}");
}

/// Advances paused time by a millisecond so queued notifier writes land.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}
