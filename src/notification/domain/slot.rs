//! Slot names and opaque message identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier assigned by the notification channel to a message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    /// Wraps a channel-assigned identifier.
    ///
    /// Returns `None` when the identifier is blank, which is how an absent
    /// handle is written on disk.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let normalized = value.into().trim().to_owned();
        if normalized.is_empty() {
            return None;
        }
        Some(Self(normalized))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

/// Logical notification target backed by a single editable message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationSlot {
    /// Mirror of the latest server snapshot, rewritten every tick.
    Status,
    /// Connection details and countdown shown while a start is in progress.
    Startup,
}

impl NotificationSlot {
    /// Returns the canonical slot name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::Startup => "startup",
        }
    }
}

impl fmt::Display for NotificationSlot {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}
