//! Workload instance (pod) snapshot types

use serde::{Deserialize, Serialize};

/// Phase a healthy pod is expected to be in
pub const RUNNING_PHASE: &str = "Running";

/// Container wait reasons that make a pod unhealthy even while Running
pub const UNHEALTHY_WAIT_REASONS: [&str; 2] = ["CrashLoopBackOff", "OOMKilled"];

/// Wait state of one container inside a pod
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerWait {
    pub name: String,
    /// Reason reported while the container is in the waiting state
    pub waiting_reason: Option<String>,
}

impl ContainerWait {
    pub fn waiting(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            waiting_reason: Some(reason.into()),
        }
    }

    pub fn ready(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            waiting_reason: None,
        }
    }

    /// Whether the container is stuck in a crash or OOM wait
    pub fn is_failing(&self) -> bool {
        self.waiting_reason
            .as_deref()
            .is_some_and(|r| UNHEALTHY_WAIT_REASONS.contains(&r))
    }
}

/// Snapshot of one pod
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadInstance {
    pub name: String,
    pub namespace: String,
    pub phase: Option<String>,
    pub containers: Vec<ContainerWait>,
}

impl WorkloadInstance {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>, phase: &str) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            phase: Some(phase.to_string()),
            containers: Vec::new(),
        }
    }

    /// Builder: add a container
    pub fn with_container(mut self, container: ContainerWait) -> Self {
        self.containers.push(container);
        self
    }

    pub fn is_running(&self) -> bool {
        self.phase.as_deref() == Some(RUNNING_PHASE)
    }
}
