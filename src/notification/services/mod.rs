//! Application services for notification slots.

mod persisted;
mod sink;

pub use persisted::PersistedHandles;
pub use sink::NotificationSink;
