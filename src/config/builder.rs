//! Configuration builder
//!
//! Merges configuration from files and CLI arguments.

use crate::config::{Config, ConfigFile, Settings};
use crate::error::ConfigError;

/// Builder for merging configuration sources
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Load configuration from a file
    ///
    /// An explicit path must load; without one the default locations are
    /// tried and a missing file is not an error.
    pub fn with_file(mut self, path: Option<&str>) -> Result<Self, ConfigError> {
        let file_config = match path {
            Some(path) => Some(ConfigFile::load(path)?),
            None => ConfigFile::load_default(),
        };

        if let Some(cfg) = file_config {
            self.config = cfg;
        }

        Ok(self)
    }

    /// Override with CLI namespace
    pub fn with_namespace(mut self, namespace: Option<String>) -> Self {
        if let Some(ns) = namespace {
            self.config.cluster.namespace = ns;
        }
        self
    }

    /// Override with a whitespace-separated skip list
    pub fn with_skip_reasons(mut self, reasons: Option<String>) -> Self {
        if let Some(r) = reasons {
            self.config.filter.skip_reasons = r.split_whitespace().map(str::to_string).collect();
        }
        self
    }

    /// Override with CLI skip-delete flag
    pub fn with_skip_delete_events(mut self, skip: Option<bool>) -> Self {
        if let Some(s) = skip {
            self.config.filter.skip_delete_events = s;
        }
        self
    }

    /// Override with CLI notify targets
    pub fn with_users_to_notify(mut self, users: Option<String>) -> Self {
        if let Some(u) = users {
            self.config.notify.users_to_notify = Some(u);
        }
        self
    }

    /// Override with CLI webhook URL
    pub fn with_webhook_url(mut self, url: Option<String>) -> Self {
        if let Some(u) = url {
            self.config.notify.webhook_url = Some(u);
        }
        self
    }

    /// Merged configuration, before validation
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Validate and build the final settings
    pub fn build(self) -> Result<Settings, ConfigError> {
        self.config.validate()
    }

    /// Build settings for commands that do not post to the webhook
    pub fn build_local(self) -> Result<Settings, ConfigError> {
        self.config.validate_local()
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
