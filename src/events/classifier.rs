//! Event classification
//!
//! Maps an event to a severity tier and renders the webhook message for it.

use crate::domain::{EventRecord, WatchedEvent};
use crate::notify::{Field, Notification, Tier};

/// Rendered in place of any value an event does not carry
pub const FALLBACK: &str = "N/A";

/// Reasons that always classify as critical
pub const CRITICAL_REASONS: [&str; 8] = [
    "KILLING",
    "FAILED",
    "BACKOFF",
    "UNHEALTHY",
    "CREATEFAILED",
    "DELETED",
    "TOPCONNECTIONFAILED",
    "NODEHASNODISKPRESSURE",
];

/// Event types that classify as warnings
pub const WARNING_TYPES: [&str; 5] = [
    "PULLING",
    "SCALINGREPLICASET",
    "SCHEDULED",
    "NOTRECONCILINGDRAIN",
    "EVICTIONTHRESHOLDMET",
];

/// Severity tier as a pure function of reason and type.
///
/// The reason is matched case-insensitively; a missing reason never matches.
pub fn tier_for(reason: Option<&str>, event_type: Option<&str>) -> Tier {
    let reason = reason.map(str::to_uppercase).unwrap_or_default();
    if CRITICAL_REASONS.contains(&reason.as_str()) {
        return Tier::Critical;
    }

    let event_type = event_type.map(str::to_uppercase).unwrap_or_default();
    if WARNING_TYPES.contains(&event_type.as_str()) || event_type == "WARNING" {
        Tier::Warning
    } else {
        Tier::Normal
    }
}

/// Builds notifications for events
#[derive(Debug, Clone, Default)]
pub struct EventClassifier {
    /// Who to mention on warnings (free text, e.g. "<@U123> <@U456>")
    notify_targets: Option<String>,
}

impl EventClassifier {
    pub fn new(notify_targets: Option<String>) -> Self {
        Self {
            notify_targets: notify_targets.filter(|t| !t.trim().is_empty()),
        }
    }

    pub fn tier(&self, record: &EventRecord) -> Tier {
        tier_for(record.reason.as_deref(), record.event_type.as_deref())
    }

    /// Render the webhook message for an event.
    ///
    /// The tier comes from the record's own type, while the body line names
    /// the watch action that delivered it.
    pub fn classify(&self, event: &WatchedEvent) -> Notification {
        let record = &event.record;
        let tier = self.tier(record);

        let text = match (&self.notify_targets, tier) {
            (Some(targets), Tier::Warning) => {
                format!("{}, there is a warning you should review", targets)
            }
            _ => format!(
                "Event type: {}, Reason: {}",
                event.action,
                or_fallback(&record.reason)
            ),
        };

        let footer = format!(
            "First seen: {}, Last seen: {}, Count: {}",
            or_fallback(&record.first_seen),
            or_fallback(&record.last_seen),
            record
                .count
                .map(|c| c.to_string())
                .unwrap_or_else(|| FALLBACK.to_string())
        );

        let object = &record.involved_object;
        let involved = format!(
            "Kind: {}, Name: {}, Namespace: {}",
            or_fallback(&object.kind),
            or_fallback(&object.name),
            or_fallback(&object.namespace)
        );
        let metadata = format!(
            "Name: {}, Created: {}",
            or_fallback(&record.name),
            or_fallback(&record.created_at)
        );

        Notification::tiered(tier, or_fallback(&record.message), text)
            .with_footer(footer)
            .with_field(Field::short("Involved object", involved))
            .with_field(Field::short("Metadata", metadata))
    }
}

fn or_fallback(value: &Option<String>) -> &str {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(FALLBACK)
}
