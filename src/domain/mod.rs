//! Domain models for kube-event-relay
//!
//! Plain data types for events, pods and watch scope, decoupled from the
//! Kubernetes API structs so the core logic can be tested without a cluster.

pub mod event;
pub mod scope;
pub mod workload;

pub use event::{EventRecord, ObjectRef, WatchAction, WatchedEvent};
pub use scope::Scope;
pub use workload::{ContainerWait, WorkloadInstance};
