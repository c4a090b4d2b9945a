//! Port contracts for notification delivery and handle persistence.

mod channel;
mod handle_store;

pub use channel::{NotificationChannel, NotificationChannelError, NotificationChannelResult};
pub use handle_store::{HandleStore, HandleStoreError, HandleStoreResult};
