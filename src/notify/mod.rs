//! Notification payloads and delivery
//!
//! Builds webhook attachment messages and sends them through a [`Notifier`].

mod notifier;
mod payload;

pub use notifier::{
    deliver, redact_url, report_error, ConsoleNotifier, Notifier, WebhookNotifier,
};
pub use payload::{Attachment, Field, Notification, Tier, ERROR_COLOR};
