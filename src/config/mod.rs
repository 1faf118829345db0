//! Configuration system
//!
//! Handles TOML config file parsing, CLI/environment overrides, and
//! validation into the settings the relay runs with.

pub mod builder;
pub mod file;

pub use builder::ConfigBuilder;
pub use file::ConfigFile;

use crate::domain::Scope;
use crate::error::ConfigError;
use crate::events::SkipReasons;
use crate::services::WatchLoopConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main configuration structure, as read from file and overrides
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Cluster scope settings
    pub cluster: ClusterConfig,
    /// Event filtering settings
    pub filter: FilterConfig,
    /// Notification endpoint settings
    pub notify: NotifyConfig,
    /// Loop timing settings
    pub timing: TimingConfig,
}

/// Cluster scope configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ClusterConfig {
    /// Namespace to watch; empty watches all namespaces
    pub namespace: String,
}

/// Event filter configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FilterConfig {
    /// Event reasons that are never notified (case-insensitive)
    pub skip_reasons: Vec<String>,
    /// Also skip SuccessfulDelete events
    pub skip_delete_events: bool,
}

/// Notification configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct NotifyConfig {
    /// Incoming webhook URL (required)
    pub webhook_url: Option<String>,
    /// Mention text inserted into warning notifications
    pub users_to_notify: Option<String>,
}

/// Timing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Interval between pod health audits in seconds
    pub health_check_interval_seconds: u64,
    /// Lifetime of one watch session in seconds
    pub session_timeout_seconds: u64,
    /// Pause after a failure in seconds
    pub error_backoff_seconds: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            health_check_interval_seconds: 10,
            session_timeout_seconds: 7200,
            error_backoff_seconds: 30,
        }
    }
}

/// Validated settings the relay runs with
#[derive(Debug, Clone)]
pub struct Settings {
    pub scope: Scope,
    pub skip_reasons: SkipReasons,
    pub notify_targets: Option<String>,
    /// Always set when built by [`Config::validate`]
    pub webhook_url: Option<String>,
    pub health_check_interval: Duration,
    pub session_timeout: Duration,
    pub error_backoff: Duration,
}

impl Settings {
    /// Watch loop configuration derived from these settings
    pub fn watch_loop_config(&self, max_sessions: Option<usize>) -> WatchLoopConfig {
        WatchLoopConfig {
            scope: self.scope.clone(),
            session_timeout: self.session_timeout,
            health_check_interval: self.health_check_interval,
            error_backoff: self.error_backoff,
            max_sessions,
        }
    }
}

impl Config {
    /// Validate and convert into runtime settings; the webhook is required
    pub fn validate(self) -> Result<Settings, ConfigError> {
        self.into_settings(true)
    }

    /// Validate for commands that never post, leaving the webhook optional
    pub fn validate_local(self) -> Result<Settings, ConfigError> {
        self.into_settings(false)
    }

    fn into_settings(self, require_webhook: bool) -> Result<Settings, ConfigError> {
        let webhook_url = self
            .notify
            .webhook_url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());
        if require_webhook && webhook_url.is_none() {
            return Err(ConfigError::MissingField("notify.webhook_url".to_string()));
        }

        let timing = &self.timing;
        let health_check_interval =
            positive_secs("timing.health_check_interval_seconds", timing.health_check_interval_seconds)?;
        let session_timeout =
            positive_secs("timing.session_timeout_seconds", timing.session_timeout_seconds)?;
        let error_backoff = Duration::from_secs(timing.error_backoff_seconds);

        Ok(Settings {
            scope: Scope::from_namespace(&self.cluster.namespace),
            skip_reasons: SkipReasons::new(&self.filter.skip_reasons, self.filter.skip_delete_events),
            notify_targets: self
                .notify
                .users_to_notify
                .filter(|targets| !targets.trim().is_empty()),
            webhook_url,
            health_check_interval,
            session_timeout,
            error_backoff,
        })
    }
}

fn positive_secs(key: &str, secs: u64) -> Result<Duration, ConfigError> {
    if secs == 0 {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: "must be greater than zero".to_string(),
        });
    }
    Ok(Duration::from_secs(secs))
}
