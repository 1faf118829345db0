//! Cluster event domain types
//!
//! `EventRecord` is a flattened, immutable view of one `core/v1 Event`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reason code used when an event carries no reason at all
pub const UNKNOWN_REASON: &str = "UNKNOWN";

/// Reference to the object an event is about
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRef {
    pub kind: Option<String>,
    pub name: Option<String>,
    pub namespace: Option<String>,
}

impl ObjectRef {
    /// Create a reference with all three fields set
    pub fn new(kind: &str, name: &str, namespace: &str) -> Self {
        Self {
            kind: non_empty(Some(kind.to_string())),
            name: non_empty(Some(name.to_string())),
            namespace: non_empty(Some(namespace.to_string())),
        }
    }
}

/// One event as read from the watch stream
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Unique identity used for deduplication
    pub uid: String,
    /// Name of the Event object itself
    pub name: Option<String>,
    /// Creation time of the Event object
    pub created_at: Option<String>,
    pub reason: Option<String>,
    /// Severity hint, usually "Normal" or "Warning"
    pub event_type: Option<String>,
    pub message: Option<String>,
    pub involved_object: ObjectRef,
    pub first_seen: Option<String>,
    pub last_seen: Option<String>,
    pub count: Option<i32>,
}

impl EventRecord {
    /// Create a record with only an identity set
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            ..Default::default()
        }
    }

    /// Builder: set reason
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = non_empty(Some(reason.into()));
        self
    }

    /// Builder: set event type
    pub fn with_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = non_empty(Some(event_type.into()));
        self
    }

    /// Builder: set message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = non_empty(Some(message.into()));
        self
    }

    /// Builder: set involved object
    pub fn with_involved_object(mut self, object: ObjectRef) -> Self {
        self.involved_object = object;
        self
    }

    /// Builder: set first/last seen timestamps and count
    pub fn with_occurrences(mut self, first_seen: &str, last_seen: &str, count: i32) -> Self {
        self.first_seen = non_empty(Some(first_seen.to_string()));
        self.last_seen = non_empty(Some(last_seen.to_string()));
        self.count = Some(count).filter(|c| *c != 0);
        self
    }

    /// Uppercased reason, or `UNKNOWN` when the event has none
    pub fn reason_code(&self) -> String {
        self.reason
            .as_deref()
            .map(str::to_uppercase)
            .unwrap_or_else(|| UNKNOWN_REASON.to_string())
    }
}

impl fmt::Display for EventRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}/{} ({})",
            self.reason_code(),
            self.involved_object.namespace.as_deref().unwrap_or("-"),
            self.involved_object.name.as_deref().unwrap_or("-"),
            self.uid
        )
    }
}

/// What the watch reported happening to the event object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WatchAction {
    Added,
    Modified,
    Deleted,
}

impl fmt::Display for WatchAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added => write!(f, "ADDED"),
            Self::Modified => write!(f, "MODIFIED"),
            Self::Deleted => write!(f, "DELETED"),
        }
    }
}

/// An event record together with the watch action that delivered it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchedEvent {
    pub action: WatchAction,
    pub record: EventRecord,
}

impl WatchedEvent {
    pub fn added(record: EventRecord) -> Self {
        Self {
            action: WatchAction::Added,
            record,
        }
    }
}

/// Treat empty strings the same as absent values
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_code_uppercases() {
        let record = EventRecord::new("uid-1").with_reason("BackOff");
        assert_eq!(record.reason_code(), "BACKOFF");
    }

    #[test]
    fn test_reason_code_missing() {
        let record = EventRecord::new("uid-1");
        assert_eq!(record.reason_code(), UNKNOWN_REASON);
    }

    #[test]
    fn test_empty_values_are_absent() {
        let record = EventRecord::new("uid-1")
            .with_message("")
            .with_occurrences("", "2024-01-01T00:00:00Z", 0);
        assert!(record.message.is_none());
        assert!(record.first_seen.is_none());
        assert!(record.last_seen.is_some());
        assert!(record.count.is_none());
    }

    #[test]
    fn test_display() {
        let record = EventRecord::new("abc")
            .with_reason("Killing")
            .with_involved_object(ObjectRef::new("Pod", "web-1", "prod"));
        assert_eq!(record.to_string(), "KILLING prod/web-1 (abc)");
    }
}
