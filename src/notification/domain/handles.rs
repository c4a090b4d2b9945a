//! Durable slot-to-message mapping.

use super::{MessageId, NotificationSlot};
use serde::{Deserialize, Deserializer, Serialize};

/// Message identifiers for every notification slot.
///
/// The serialized form keeps one field per slot. Blank strings are read as
/// absent so files written with empty placeholders stay loadable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageHandles {
    #[serde(
        default,
        deserialize_with = "blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    status_message_id: Option<MessageId>,
    #[serde(
        default,
        deserialize_with = "blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    startup_message_id: Option<MessageId>,
}

impl MessageHandles {
    /// Creates an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the identifier recorded for `slot`.
    #[must_use]
    pub const fn get(&self, slot: NotificationSlot) -> Option<&MessageId> {
        match slot {
            NotificationSlot::Status => self.status_message_id.as_ref(),
            NotificationSlot::Startup => self.startup_message_id.as_ref(),
        }
    }

    /// Records `id` for `slot`, returning whether the mapping changed.
    pub fn set(&mut self, slot: NotificationSlot, id: MessageId) -> bool {
        let entry = self.entry_mut(slot);
        if entry.as_ref() == Some(&id) {
            return false;
        }
        *entry = Some(id);
        true
    }

    /// Forgets the identifier for `slot`, returning whether one was present.
    pub fn clear(&mut self, slot: NotificationSlot) -> bool {
        self.entry_mut(slot).take().is_some()
    }

    const fn entry_mut(&mut self, slot: NotificationSlot) -> &mut Option<MessageId> {
        match slot {
            NotificationSlot::Status => &mut self.status_message_id,
            NotificationSlot::Startup => &mut self.startup_message_id,
        }
    }
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<MessageId>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(MessageId::new))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn id(raw: &str) -> MessageId {
        MessageId::new(raw).expect("test identifier should be valid")
    }

    #[test]
    fn set_reports_changes_only() {
        let mut handles = MessageHandles::new();

        assert!(handles.set(NotificationSlot::Status, id("1")));
        assert!(!handles.set(NotificationSlot::Status, id("1")));
        assert!(handles.set(NotificationSlot::Status, id("2")));
        assert_eq!(handles.get(NotificationSlot::Status), Some(&id("2")));
        assert_eq!(handles.get(NotificationSlot::Startup), None);
    }

    #[test]
    fn clear_is_idempotent() {
        let mut handles = MessageHandles::new();
        handles.set(NotificationSlot::Startup, id("9"));

        assert!(handles.clear(NotificationSlot::Startup));
        assert!(!handles.clear(NotificationSlot::Startup));
        assert_eq!(handles.get(NotificationSlot::Startup), None);
    }

    #[test]
    fn blank_fields_deserialize_as_absent() {
        let handles: MessageHandles = serde_json::from_value(json!({
            "status_message_id": "42",
            "startup_message_id": ""
        }))
        .expect("handles should deserialize");

        assert_eq!(handles.get(NotificationSlot::Status), Some(&id("42")));
        assert_eq!(handles.get(NotificationSlot::Startup), None);
    }

    #[test]
    fn missing_fields_deserialize_as_absent() {
        let handles: MessageHandles =
            serde_json::from_value(json!({})).expect("handles should deserialize");

        assert_eq!(handles, MessageHandles::new());
    }

    #[test]
    fn absent_fields_are_not_serialized() {
        let mut handles = MessageHandles::new();
        handles.set(NotificationSlot::Startup, id("7"));

        let value = serde_json::to_value(&handles).expect("handles should serialize");

        assert_eq!(value, json!({ "startup_message_id": "7" }));
    }
}
