//! kube-event-relay - Kubernetes event relay library
//!
//! Watches cluster events, classifies them by severity and posts them to an
//! incoming chat webhook, while periodically auditing pod health.
//!
//! # Modules
//!
//! - [`cli`]: Command-line interface definitions
//! - [`cluster`]: Kubernetes abstraction layer
//! - [`commands`]: Command handlers
//! - [`config`]: Configuration system
//! - [`domain`]: Event and workload models
//! - [`error`]: Error types
//! - [`events`]: Classification, deduplication and dispatch
//! - [`health`]: Pod health auditing
//! - [`notify`]: Notification payloads and delivery
//! - [`services`]: Watch loop orchestration

pub mod cli;
pub mod cluster;
pub mod commands;
pub mod config;
pub mod domain;
pub mod error;
pub mod events;
pub mod health;
pub mod notify;
pub mod services;

#[cfg(test)]
pub mod mock;

pub use error::{AppError, Result};
