//! Unified error types for kube-event-relay
//!
//! This module defines all error types used throughout the application.
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from configuration parsing/validation
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error talking to the cluster API
    #[error("Cluster error: {0}")]
    Cluster(#[from] ClusterError),

    /// Error delivering a notification
    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),

    /// IO error (stdout, runtime setup)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from configuration parsing and validation
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Invalid config value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Missing required config field
    #[error("Missing required configuration field: {0}")]
    MissingField(String),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}

/// Errors from the cluster API (event watch and pod listing)
#[derive(Error, Debug)]
pub enum ClusterError {
    /// Could not build a client from in-cluster config or kubeconfig
    #[error("Failed to connect to the cluster: {0}")]
    Connect(String),

    /// A request against the API server failed
    #[error("API request failed: {0}")]
    Api(String),

    /// The watch stream reported an error or broke off
    #[error("Watch stream failed: {0}")]
    Watch(String),

    /// The local async runtime could not be created
    #[error("Runtime error: {0}")]
    Runtime(#[from] std::io::Error),
}

impl From<kube::Error> for ClusterError {
    fn from(err: kube::Error) -> Self {
        ClusterError::Api(err.to_string())
    }
}

/// Errors from notification delivery
#[derive(Error, Debug)]
pub enum NotifyError {
    /// The request never produced a response
    #[error("Failed to reach notification endpoint: {0}")]
    Transport(String),

    /// The endpoint answered with something other than 200
    #[error("Notification endpoint rejected the message: {status} {body}")]
    Rejected { status: u16, body: String },

    /// Payload could not be serialized
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for NotifyError {
    fn from(err: reqwest::Error) -> Self {
        NotifyError::Transport(err.to_string())
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Render an error and its whole `source()` chain, one cause per line.
pub fn diagnostic(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str("\n  caused by: ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}
