//! Pod health auditing
//!
//! Snapshots the pods in scope and reports stable/unstable transitions:
//! - a pod is unhealthy when its phase is not `Running`
//! - a container waiting in `CrashLoopBackOff` or `OOMKilled` is a finding
//!   of its own, even inside a Running pod
//!
//! A "stable" notification is sent only when the state flips to stable. While
//! unstable, every audit sends the full list of findings again so the
//! problem keeps surfacing.

use crate::cluster::InstanceLister;
use crate::domain::{Scope, WorkloadInstance};
use crate::error::{diagnostic, AppError};
use crate::notify::{deliver, report_error, Notification, Notifier, Tier};
use serde::{Deserialize, Serialize};

/// Footer shared by all audit notifications
const AUDIT_FOOTER: &str = "Pod list";

/// Aggregate health remembered between audits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HealthState {
    /// No audit has completed yet
    #[default]
    Unknown,
    /// Every pod was healthy at the last audit
    Stable,
    /// At least one finding at the last audit
    Unstable,
}

impl HealthState {
    pub fn is_stable(&self) -> bool {
        matches!(self, Self::Stable)
    }
}

impl std::fmt::Display for HealthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => write!(f, "Unknown"),
            Self::Stable => write!(f, "Stable"),
            Self::Unstable => write!(f, "Unstable"),
        }
    }
}

/// One reason a pod counts as unhealthy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub name: String,
    pub namespace: String,
    /// Pod phase, or the container wait reason
    pub status: String,
}

impl std::fmt::Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Pod: {}, Namespace: {}, Status: {}",
            self.name, self.namespace, self.status
        )
    }
}

/// Result of inspecting one snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    /// Number of pods inspected
    pub checked: usize,
    pub findings: Vec<Finding>,
}

impl HealthReport {
    /// Build a report from a pod snapshot
    pub fn from_instances(instances: &[WorkloadInstance]) -> Self {
        let mut findings = Vec::new();

        for pod in instances {
            if !pod.is_running() {
                findings.push(Finding {
                    name: pod.name.clone(),
                    namespace: pod.namespace.clone(),
                    status: pod.phase.clone().unwrap_or_else(|| "Unknown".to_string()),
                });
            }

            for container in pod.containers.iter().filter(|c| c.is_failing()) {
                findings.push(Finding {
                    name: pod.name.clone(),
                    namespace: pod.namespace.clone(),
                    status: container.waiting_reason.clone().unwrap_or_default(),
                });
            }
        }

        Self {
            checked: instances.len(),
            findings,
        }
    }

    pub fn all_healthy(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn state(&self) -> HealthState {
        if self.all_healthy() {
            HealthState::Stable
        } else {
            HealthState::Unstable
        }
    }
}

/// Periodic pod health auditor
#[derive(Debug, Clone, Default)]
pub struct HealthAuditor {
    scope: Scope,
}

impl HealthAuditor {
    pub fn new(scope: Scope) -> Self {
        Self { scope }
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Snapshot the pods in scope without notifying anyone
    pub fn inspect(&self, lister: &dyn InstanceLister) -> Result<HealthReport, AppError> {
        let instances = lister.list_instances(&self.scope)?;
        Ok(HealthReport::from_instances(&instances))
    }

    /// Run one audit and return the new state.
    ///
    /// On any failure the error is reported and `previous` is returned
    /// unchanged.
    pub fn audit(
        &self,
        lister: &dyn InstanceLister,
        notifier: &dyn Notifier,
        previous: HealthState,
    ) -> HealthState {
        match self.try_audit(lister, notifier, previous) {
            Ok(state) => state,
            Err(e) => {
                log::error!("Health audit failed: {}", e);
                report_error(
                    notifier,
                    &format!("Failed to report the pod list:\n{}", diagnostic(&e)),
                );
                previous
            }
        }
    }

    fn try_audit(
        &self,
        lister: &dyn InstanceLister,
        notifier: &dyn Notifier,
        previous: HealthState,
    ) -> Result<HealthState, AppError> {
        let report = self.inspect(lister)?;
        log::debug!(
            "Audited {} pods in {}: {} findings",
            report.checked,
            self.scope,
            report.findings.len()
        );

        if report.all_healthy() {
            if !previous.is_stable() {
                let notification = Notification::tiered(
                    Tier::Normal,
                    "System stable",
                    "All pods are in the \"Running\" state.",
                )
                .with_footer(AUDIT_FOOTER);
                deliver(notifier, &notification)?;
                log::info!("System became stable");
            }
            return Ok(HealthState::Stable);
        }

        let lines: Vec<String> = report.findings.iter().map(ToString::to_string).collect();
        let notification = Notification::tiered(
            Tier::Critical,
            "PODS NOT IN RUNNING STATE",
            lines.join("\n"),
        )
        .with_footer(AUDIT_FOOTER);
        deliver(notifier, &notification)?;
        log::warn!("{} unhealthy pod findings reported", lines.len());

        Ok(HealthState::Unstable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ContainerWait;
    use crate::mock::{MockCluster, RecordingNotifier};
    use crate::notify::ERROR_COLOR;

    fn running(name: &str) -> WorkloadInstance {
        WorkloadInstance::new(name, "default", "Running")
    }

    #[test]
    fn test_healthy_after_unstable_sends_one_stable_notification() {
        let cluster = MockCluster::new().with_instances(vec![running("web-0")]);
        let notifier = RecordingNotifier::new();

        let state = HealthAuditor::default().audit(&cluster, &notifier, HealthState::Unstable);

        assert_eq!(state, HealthState::Stable);
        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        let attachment = sent[0].primary().unwrap();
        assert_eq!(attachment.color, Tier::Normal.color());
        assert_eq!(attachment.title, "System stable");
    }

    #[test]
    fn test_healthy_from_unknown_sends_stable() {
        let cluster = MockCluster::new().with_instances(vec![running("web-0")]);
        let notifier = RecordingNotifier::new();

        let state = HealthAuditor::default().audit(&cluster, &notifier, HealthState::Unknown);

        assert_eq!(state, HealthState::Stable);
        assert_eq!(notifier.sent().len(), 1);
    }

    #[test]
    fn test_healthy_when_already_stable_sends_nothing() {
        let cluster = MockCluster::new().with_instances(vec![running("web-0")]);
        let notifier = RecordingNotifier::new();

        let state = HealthAuditor::default().audit(&cluster, &notifier, HealthState::Stable);

        assert_eq!(state, HealthState::Stable);
        assert!(notifier.sent().is_empty());
    }

    #[test]
    fn test_pending_pod_reported() {
        let cluster = MockCluster::new()
            .with_instances(vec![WorkloadInstance::new("worker-7", "jobs", "Pending")]);
        let notifier = RecordingNotifier::new();

        let state = HealthAuditor::default().audit(&cluster, &notifier, HealthState::Stable);

        assert_eq!(state, HealthState::Unstable);
        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        let attachment = sent[0].primary().unwrap();
        assert_eq!(attachment.color, Tier::Critical.color());
        assert!(attachment.text.contains("worker-7"));
        assert!(attachment.text.contains("Pending"));
    }

    #[test]
    fn test_unhealthy_renotifies_every_audit() {
        let cluster = MockCluster::new()
            .with_instances(vec![WorkloadInstance::new("worker-7", "jobs", "Failed")]);
        let notifier = RecordingNotifier::new();
        let auditor = HealthAuditor::default();

        let mut state = HealthState::Unknown;
        for _ in 0..3 {
            state = auditor.audit(&cluster, &notifier, state);
        }

        assert_eq!(state, HealthState::Unstable);
        assert_eq!(notifier.sent().len(), 3);
    }

    #[test]
    fn test_crash_looping_container_in_running_pod() {
        let pod = running("api-0")
            .with_container(ContainerWait::ready("sidecar"))
            .with_container(ContainerWait::waiting("api", "CrashLoopBackOff"));
        let report = HealthReport::from_instances(&[pod]);

        assert!(!report.all_healthy());
        assert_eq!(report.findings.len(), 1);
        assert_eq!(
            report.findings[0].to_string(),
            "Pod: api-0, Namespace: default, Status: CrashLoopBackOff"
        );
    }

    #[test]
    fn test_pending_pod_with_oom_container_yields_two_findings() {
        let pod = WorkloadInstance::new("batch-1", "jobs", "Pending")
            .with_container(ContainerWait::waiting("main", "OOMKilled"));
        let report = HealthReport::from_instances(&[pod]);

        assert_eq!(report.findings.len(), 2);
        assert_eq!(report.findings[0].status, "Pending");
        assert_eq!(report.findings[1].status, "OOMKilled");
    }

    #[test]
    fn test_empty_snapshot_is_healthy() {
        let report = HealthReport::from_instances(&[]);
        assert!(report.all_healthy());
        assert_eq!(report.state(), HealthState::Stable);
    }

    #[test]
    fn test_listing_failure_keeps_previous_state() {
        let cluster = MockCluster::new().with_listing_error("forbidden");
        let notifier = RecordingNotifier::new();

        let state = HealthAuditor::default().audit(&cluster, &notifier, HealthState::Stable);

        assert_eq!(state, HealthState::Stable);
        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        let attachment = sent[0].primary().unwrap();
        assert_eq!(attachment.color, ERROR_COLOR);
        assert!(attachment.text.contains("forbidden"));
    }

    #[test]
    fn test_delivery_failure_keeps_previous_state() {
        let cluster = MockCluster::new()
            .with_instances(vec![WorkloadInstance::new("a", "b", "Pending")]);
        let notifier = RecordingNotifier::unreachable();

        let state = HealthAuditor::default().audit(&cluster, &notifier, HealthState::Unknown);

        assert_eq!(state, HealthState::Unknown);
    }

    #[test]
    fn test_auditor_uses_scope() {
        let cluster = MockCluster::new().with_instances(vec![running("a")]);
        let auditor = HealthAuditor::new(Scope::from_namespace("prod"));

        auditor.inspect(&cluster).unwrap();
        assert_eq!(cluster.listed_scopes(), vec![Scope::from_namespace("prod")]);
    }
}
