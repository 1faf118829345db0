//! Cluster access layer
//!
//! Provides trait-based abstractions over the Kubernetes API for testability.

pub mod kubernetes;
pub mod traits;

pub use kubernetes::{KubeCluster, KubeEventSession};
pub use traits::{EventSession, EventSource, InstanceLister, SessionItem};
