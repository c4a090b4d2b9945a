//! Domain model for notification slots and persisted message handles.

mod handles;
mod slot;

pub use handles::MessageHandles;
pub use slot::{MessageId, NotificationSlot};
