//! Delivery task that owns the notification sink.
//!
//! The monitor actor renders messages and hands them over without waiting.
//! Slot writes and announcements keep their order; status mirrors are
//! coalesced so only the latest rendering reaches the channel.

use crate::notification::{
    domain::NotificationSlot,
    ports::{HandleStore, NotificationChannel},
    services::NotificationSink,
};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::debug;

/// One ordered write performed by the notifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Delivery {
    Startup(String),
    RefreshStartup(String),
    ClearStartup,
    Announce(String),
}

/// Sending side of the notifier task.
#[derive(Debug)]
pub(super) struct Notifier {
    queue: mpsc::UnboundedSender<Delivery>,
    status: watch::Sender<Option<String>>,
}

impl Notifier {
    /// Moves `sink` onto its own task.
    pub(super) fn spawn<N, H>(sink: NotificationSink<N, H>) -> (Self, JoinHandle<()>)
    where
        N: NotificationChannel + 'static,
        H: HandleStore + 'static,
    {
        let (queue, queue_rx) = mpsc::unbounded_channel();
        let (status, status_rx) = watch::channel(None);
        let task = tokio::spawn(run(sink, queue_rx, status_rx));
        (Self { queue, status }, task)
    }

    /// Queues an ordered write.
    pub(super) fn deliver(&self, delivery: Delivery) {
        if self.queue.send(delivery).is_err() {
            debug!("notifier is gone, dropping delivery");
        }
    }

    /// Replaces any status rendering not yet written.
    pub(super) fn mirror(&self, content: String) {
        self.status.send_replace(Some(content));
    }
}

/// Runs until the [`Notifier`] is dropped and everything queued is written.
async fn run<N, H>(
    mut sink: NotificationSink<N, H>,
    mut queue: mpsc::UnboundedReceiver<Delivery>,
    mut status: watch::Receiver<Option<String>>,
) where
    N: NotificationChannel,
    H: HandleStore,
{
    loop {
        tokio::select! {
            biased;
            Some(first) = queue.recv() => {
                let mut batch = vec![first];
                while let Ok(next) = queue.try_recv() {
                    batch.push(next);
                }
                for delivery in coalesce(batch) {
                    write(&mut sink, delivery).await;
                }
            }
            Ok(()) = status.changed() => {
                let content = status.borrow_and_update().clone();
                if let Some(content) = content {
                    sink.upsert(NotificationSlot::Status, &content).await;
                }
            }
            else => break,
        }
    }
    debug!("notifier stopped");
}

async fn write<N, H>(sink: &mut NotificationSink<N, H>, delivery: Delivery)
where
    N: NotificationChannel,
    H: HandleStore,
{
    match delivery {
        Delivery::Startup(content) => {
            sink.upsert(NotificationSlot::Startup, &content).await;
        }
        Delivery::RefreshStartup(content) => {
            sink.refresh(NotificationSlot::Startup, &content).await;
        }
        Delivery::ClearStartup => sink.clear(NotificationSlot::Startup),
        Delivery::Announce(content) => {
            sink.send(&content).await;
        }
    }
}

/// Drops startup refreshes that a later write in the batch overwrites.
///
/// A clear ends the run: the refresh before it still lands on the old
/// message.
fn coalesce(batch: Vec<Delivery>) -> Vec<Delivery> {
    let mut kept = Vec::with_capacity(batch.len());
    let mut overwritten = false;
    for delivery in batch.into_iter().rev() {
        match &delivery {
            Delivery::RefreshStartup(_) if overwritten => continue,
            Delivery::RefreshStartup(_) | Delivery::Startup(_) => overwritten = true,
            Delivery::ClearStartup => overwritten = false,
            Delivery::Announce(_) => {}
        }
        kept.push(delivery);
    }
    kept.reverse();
    kept
}
