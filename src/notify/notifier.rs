//! Notification channels
//!
//! Provides the webhook notifier used in production and a console notifier
//! for dry runs. Neither retries: a failed delivery is reported to the caller
//! once and the message is dropped.

use super::payload::Notification;
use crate::error::NotifyError;
use std::io::{self, Write};

/// Notification channel trait
pub trait Notifier: Send + Sync {
    /// Send one notification
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError>;

    /// Channel name for identification
    fn name(&self) -> &str;
}

/// Incoming-webhook notifier
///
/// POSTs the notification as JSON; anything but HTTP 200 is a rejection.
pub struct WebhookNotifier {
    url: String,
    client: reqwest::blocking::Client,
}

impl WebhookNotifier {
    /// Create a notifier for the given webhook URL
    pub fn new(url: impl Into<String>) -> Result<Self, NotifyError> {
        let client = reqwest::blocking::Client::builder().build()?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }
}

impl Notifier for WebhookNotifier {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        log::info!("Sending notification:\n{}", notification.to_json()?);

        let response = self.client.post(&self.url).json(notification).send()?;
        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = response.text().unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        log::info!("Notification delivered");
        Ok(())
    }

    fn name(&self) -> &str {
        "webhook"
    }
}

/// Console notifier
///
/// Prints the JSON that would have been posted. Used for `--dry-run`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        let json = serde_json::to_string_pretty(notification)?;
        writeln!(io::stdout().lock(), "{}", json).map_err(|e| NotifyError::Transport(e.to_string()))
    }

    fn name(&self) -> &str {
        "console"
    }
}

/// Send a notification, treating a rejection by the endpoint as logged-only.
///
/// Transport failures are still returned so the enclosing unit of work can
/// report them.
pub fn deliver(notifier: &dyn Notifier, notification: &Notification) -> Result<(), NotifyError> {
    match notifier.notify(notification) {
        Err(NotifyError::Rejected { status, body }) => {
            log::error!(
                "Failed to send notification via {}: {}, {}",
                notifier.name(),
                status,
                body
            );
            Ok(())
        }
        other => other,
    }
}

/// Best-effort error report. Failures here are only logged.
pub fn report_error(notifier: &dyn Notifier, diagnostic: &str) {
    if let Err(e) = deliver(notifier, &Notification::error(diagnostic)) {
        log::error!(
            "Failed to send error notification via {}: {}",
            notifier.name(),
            e
        );
    }
}

/// Hide everything after the host so webhook secrets stay out of logs
pub fn redact_url(url: &str) -> String {
    let Some(scheme_end) = url.find("://") else {
        return "***".to_string();
    };
    let host_start = scheme_end + 3;
    match url[host_start..].find('/') {
        Some(path_start) => format!("{}/***", &url[..host_start + path_start]),
        None => url.to_string(),
    }
}
