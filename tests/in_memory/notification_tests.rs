//! Slot persistence across sink restarts.

use std::sync::Arc;

use camino::Utf8PathBuf;
use tempfile::TempDir;
use warden::notification::{
    adapters::{JsonFileHandleStore, memory::InMemoryNotificationChannel},
    domain::NotificationSlot,
    services::{NotificationSink, PersistedHandles},
};

type FileSink = NotificationSink<InMemoryNotificationChannel, JsonFileHandleStore>;

fn file_store(temp: &TempDir) -> Arc<JsonFileHandleStore> {
    let directory =
        Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("temp dir should be UTF-8");
    Arc::new(JsonFileHandleStore::new(directory.join("message_ids.json")))
}

fn sink(channel: &Arc<InMemoryNotificationChannel>, store: &Arc<JsonFileHandleStore>) -> FileSink {
    NotificationSink::new(
        Arc::clone(channel),
        PersistedHandles::new(Arc::clone(store)),
    )
}

#[tokio::test]
async fn restarted_sink_keeps_editing_the_same_message() {
    let temp = TempDir::new().expect("temp dir should be created");
    let channel = Arc::new(InMemoryNotificationChannel::new());
    let store = file_store(&temp);

    let mut first = sink(&channel, &store);
    let id = first
        .upsert(NotificationSlot::Status, "Online: 1 players")
        .await
        .expect("status slot should be created");
    drop(first);

    let mut second = sink(&channel, &store);
    let reused = second
        .upsert(NotificationSlot::Status, "Online: 0 players")
        .await
        .expect("status slot should be updated");

    assert_eq!(reused, id);
    assert_eq!(channel.posted().len(), 1);
    assert_eq!(channel.content(&id).as_deref(), Some("Online: 0 players"));
}

#[tokio::test]
async fn externally_deleted_message_is_recreated_and_persisted() {
    let temp = TempDir::new().expect("temp dir should be created");
    let channel = Arc::new(InMemoryNotificationChannel::new());
    let store = file_store(&temp);

    let mut first = sink(&channel, &store);
    let original = first
        .upsert(NotificationSlot::Startup, "🟢 The server is up")
        .await
        .expect("startup slot should be created");
    channel.delete(&original);

    let recreated = first
        .upsert(NotificationSlot::Startup, "✅ A player has joined!")
        .await
        .expect("startup slot should be recreated");
    drop(first);

    let second = sink(&channel, &store);
    assert_ne!(recreated, original);
    assert_eq!(second.handle(NotificationSlot::Startup), Some(&recreated));
}

#[tokio::test]
async fn corrupt_handle_file_starts_with_fresh_slots() {
    let temp = TempDir::new().expect("temp dir should be created");
    std::fs::write(temp.path().join("message_ids.json"), "{\"status_message_id\":")
        .expect("handle file should be written");
    let channel = Arc::new(InMemoryNotificationChannel::new());
    let store = file_store(&temp);

    let mut fresh = sink(&channel, &store);
    assert_eq!(fresh.handle(NotificationSlot::Status), None);

    fresh
        .upsert(NotificationSlot::Status, "Server: offline\nStatus: stopped")
        .await
        .expect("status slot should be created");

    let reloaded = sink(&channel, &store);
    assert!(reloaded.handle(NotificationSlot::Status).is_some());
}
