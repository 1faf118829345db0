//! Trait definitions for cluster access
//!
//! These traits abstract over the Kubernetes API to enable testing with mocks.

use crate::domain::{Scope, WatchedEvent, WorkloadInstance};
use crate::error::ClusterError;

use std::time::Duration;

/// One step of a watch session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionItem {
    /// An event arrived
    Event(WatchedEvent),
    /// Nothing arrived within the requested wait; the session is still open
    Idle,
    /// The session reached its lifetime. Not an error; open a new one.
    Expired,
}

/// A bounded-lifetime subscription to the event stream
pub trait EventSession {
    /// Wait up to `max_wait` for the next item.
    ///
    /// Returns `Expired` once the session lifetime has elapsed, and keeps
    /// returning it afterwards. Stream and API failures are `Err`.
    fn next_item(&mut self, max_wait: Duration) -> Result<SessionItem, ClusterError>;
}

/// Trait for opening event watch sessions
pub trait EventSource: Send + Sync {
    /// The session type returned by this source
    type Session: EventSession;

    /// Open a session that expires after `timeout`
    fn open_session(&self, scope: &Scope, timeout: Duration)
        -> Result<Self::Session, ClusterError>;
}

/// Trait for listing workload instances
pub trait InstanceLister: Send + Sync {
    /// Snapshot every pod in scope
    fn list_instances(&self, scope: &Scope) -> Result<Vec<WorkloadInstance>, ClusterError>;
}
