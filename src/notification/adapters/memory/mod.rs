//! In-memory notification adapters for tests and dry runs.

mod channel;
mod handle_store;

pub use channel::InMemoryNotificationChannel;
pub use handle_store::InMemoryHandleStore;
