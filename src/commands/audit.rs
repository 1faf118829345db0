//! Audit command implementation
//!
//! Runs a single pod health audit and prints the findings. Nothing is posted.

use crate::cli::args::OutputFormat;
use crate::cli::output::{print_output, AuditSummary};
use crate::cluster::{InstanceLister, KubeCluster};
use crate::config::Settings;
use crate::error::Result;
use crate::health::HealthAuditor;

/// Execute the audit command
pub fn run_audit(settings: &Settings, format: OutputFormat) -> Result<()> {
    let cluster = KubeCluster::connect()?;
    let summary = audit_summary(settings, &cluster)?;
    print_output(&summary, format)?;
    Ok(())
}

fn audit_summary(settings: &Settings, lister: &dyn InstanceLister) -> Result<AuditSummary> {
    let auditor = HealthAuditor::new(settings.scope.clone());
    let report = auditor.inspect(lister)?;
    log::debug!(
        "Audited {} pods in {}: {} findings",
        report.checked,
        auditor.scope(),
        report.findings.len()
    );
    Ok(AuditSummary::new(auditor.scope(), report))
}
