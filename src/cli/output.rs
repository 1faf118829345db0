//! Output formatting utilities
//!
//! Provides table and JSON output formatting for CLI commands.

use crate::cli::args::OutputFormat;
use crate::domain::Scope;
use crate::health::{Finding, HealthReport, HealthState};
use crate::services::SessionStats;
use serde::Serialize;
use std::io::{self, Write};

/// Format and print output based on the selected format
pub fn print_output<T: Serialize + TableDisplay>(data: &T, format: OutputFormat) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match format {
        OutputFormat::Table => {
            writeln!(handle, "{}", data.to_table())?;
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(data).unwrap_or_else(|_| "{}".to_string());
            writeln!(handle, "{}", json)?;
        }
        OutputFormat::Compact => {
            writeln!(handle, "{}", data.to_compact())?;
        }
    }

    Ok(())
}

/// Trait for types that can be displayed as a table
pub trait TableDisplay {
    /// Format as a table string
    fn to_table(&self) -> String;

    /// Format as a compact single line
    fn to_compact(&self) -> String {
        self.to_table().replace('\n', " | ")
    }
}

/// Result of a one-off pod health audit
#[derive(Debug, Clone, Serialize)]
pub struct AuditSummary {
    pub scope: String,
    pub state: HealthState,
    pub checked: usize,
    pub findings: Vec<Finding>,
}

impl AuditSummary {
    pub fn new(scope: &Scope, report: HealthReport) -> Self {
        Self {
            scope: scope.to_string(),
            state: report.state(),
            checked: report.checked,
            findings: report.findings,
        }
    }
}

impl TableDisplay for AuditSummary {
    fn to_table(&self) -> String {
        let mut output = format!("Pod health ({})\n", self.scope);
        output.push_str(&format!("  Pods Checked: {}\n", self.checked));
        output.push_str(&format!("  State: {}\n", self.state));

        if self.findings.is_empty() {
            output.push_str("  All pods are running\n");
            return output;
        }

        output.push_str("\n  NAMESPACE            POD                                      STATUS\n");
        output.push_str("  ──────────────────────────────────────────────────────────────────────────\n");
        for finding in &self.findings {
            output.push_str(&format!(
                "  {:<20} {:<40} {}\n",
                finding.namespace, finding.name, finding.status
            ));
        }

        output
    }

    fn to_compact(&self) -> String {
        if self.findings.is_empty() {
            format!("{}: {} pods, all running", self.scope, self.checked)
        } else {
            format!(
                "{}: {} pods, {} findings",
                self.scope,
                self.checked,
                self.findings.len()
            )
        }
    }
}

/// Counters from a finished watch session
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub received: usize,
    pub notified: usize,
    pub skipped: usize,
    pub duplicates: usize,
    pub failed: usize,
    pub health: HealthState,
}

impl SessionSummary {
    pub fn new(stats: SessionStats, health: HealthState) -> Self {
        Self {
            received: stats.received,
            notified: stats.notified,
            skipped: stats.skipped,
            duplicates: stats.duplicates,
            failed: stats.failed,
            health,
        }
    }
}

impl TableDisplay for SessionSummary {
    fn to_table(&self) -> String {
        format!(
            "Session finished\n  Events Received: {}\n  Notified: {}\n  Skipped: {}\n  Duplicates: {}\n  Failed: {}\n  Pod Health: {}",
            self.received, self.notified, self.skipped, self.duplicates, self.failed, self.health
        )
    }

    fn to_compact(&self) -> String {
        format!(
            "received={} notified={} skipped={} duplicates={} failed={} health={}",
            self.received, self.notified, self.skipped, self.duplicates, self.failed, self.health
        )
    }
}
