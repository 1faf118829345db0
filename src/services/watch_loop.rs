//! Event watch loop
//!
//! Orchestrates watch sessions, event dispatch and periodic health audits on
//! a single thread. Each session gets its own dedup cache; the health state
//! carries over between sessions.

use crate::cluster::{EventSession, EventSource, InstanceLister, SessionItem};
use crate::domain::{Scope, WatchedEvent};
use crate::error::{diagnostic, ClusterError};
use crate::events::{DedupCache, DispatchOutcome, EventDispatcher};
use crate::health::{HealthAuditor, HealthState};
use crate::notify::{report_error, Notifier};
use crate::services::clock::Clock;

use std::time::{Duration, Instant};

/// Configuration for the watch loop
#[derive(Debug, Clone)]
pub struct WatchLoopConfig {
    /// Namespaces to watch and audit
    pub scope: Scope,
    /// Lifetime of one watch session
    pub session_timeout: Duration,
    /// Interval between health audits
    pub health_check_interval: Duration,
    /// Pause after a failed session or a failed event
    pub error_backoff: Duration,
    /// Stop after this many sessions (runs forever when unset)
    pub max_sessions: Option<usize>,
}

impl Default for WatchLoopConfig {
    fn default() -> Self {
        Self {
            scope: Scope::AllNamespaces,
            session_timeout: Duration::from_secs(7200),
            health_check_interval: Duration::from_secs(10),
            error_backoff: Duration::from_secs(30),
            max_sessions: None,
        }
    }
}

/// Why a session ended
#[derive(Debug)]
pub enum SessionEnd {
    /// Lifetime elapsed; renew quietly
    Expired,
    /// Opening or reading the stream failed; report and renew
    Failed(ClusterError),
}

/// Per-session counters, logged when the session ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub received: usize,
    pub notified: usize,
    pub skipped: usize,
    pub duplicates: usize,
    pub failed: usize,
}

impl SessionStats {
    fn record(&mut self, outcome: DispatchOutcome) {
        match outcome {
            DispatchOutcome::Notified => self.notified += 1,
            DispatchOutcome::Skipped => self.skipped += 1,
            DispatchOutcome::Duplicate => self.duplicates += 1,
        }
    }
}

/// Event watch loop
pub struct WatchLoop<'a, K, C>
where
    K: EventSource + InstanceLister,
    C: Clock,
{
    config: WatchLoopConfig,
    cluster: &'a K,
    notifier: &'a dyn Notifier,
    dispatcher: EventDispatcher,
    auditor: HealthAuditor,
    clock: &'a C,
    health: HealthState,
    last_audit: Instant,
    last_stats: SessionStats,
}

impl<'a, K, C> WatchLoop<'a, K, C>
where
    K: EventSource + InstanceLister,
    C: Clock,
{
    /// Create a new watch loop
    pub fn new(
        config: WatchLoopConfig,
        cluster: &'a K,
        notifier: &'a dyn Notifier,
        dispatcher: EventDispatcher,
        clock: &'a C,
    ) -> Self {
        let auditor = HealthAuditor::new(config.scope.clone());
        let last_audit = clock.now();

        Self {
            config,
            cluster,
            notifier,
            dispatcher,
            auditor,
            clock,
            health: HealthState::Unknown,
            last_audit,
            last_stats: SessionStats::default(),
        }
    }

    /// Run sessions back to back.
    ///
    /// Audits once up front, then never returns unless `max_sessions` is set.
    pub fn run(&mut self) {
        self.audit_now();

        let mut completed = 0usize;
        loop {
            match self.run_session() {
                SessionEnd::Expired => {
                    log::warn!("Watch session timed out, opening a new one");
                }
                SessionEnd::Failed(e) => {
                    log::error!("Watch session failed: {}", e);
                    report_error(
                        self.notifier,
                        &format!("Unexpected error:\n{}", diagnostic(&e)),
                    );
                }
            }

            completed += 1;
            if self.config.max_sessions.is_some_and(|max| completed >= max) {
                log::info!("Completed {} watch session(s), stopping", completed);
                return;
            }

            log::info!(
                "Waiting {:?} before the next watch session",
                self.config.error_backoff
            );
            self.clock.sleep(self.config.error_backoff);
        }
    }

    /// Open one session and consume it to the end
    pub fn run_session(&mut self) -> SessionEnd {
        log::info!(
            "Processing events in {} for {:?}...",
            self.config.scope,
            self.config.session_timeout
        );

        let mut session = match self
            .cluster
            .open_session(&self.config.scope, self.config.session_timeout)
        {
            Ok(session) => session,
            Err(e) => {
                self.last_stats = SessionStats::default();
                return SessionEnd::Failed(e);
            }
        };

        let mut cache = DedupCache::new();
        let mut stats = SessionStats::default();

        let end = loop {
            match session.next_item(self.until_next_audit()) {
                Ok(SessionItem::Event(event)) => self.handle_event(&event, &mut cache, &mut stats),
                Ok(SessionItem::Idle) => {}
                Ok(SessionItem::Expired) => break SessionEnd::Expired,
                Err(e) => break SessionEnd::Failed(e),
            }

            if self.audit_due() {
                self.audit_now();
            }
        };

        log::info!(
            "Session ended: {} received, {} notified, {} skipped, {} duplicates, {} failed",
            stats.received,
            stats.notified,
            stats.skipped,
            stats.duplicates,
            stats.failed
        );
        self.last_stats = stats;
        end
    }

    /// Run a health audit now and restart the cadence
    pub fn audit_now(&mut self) {
        self.health = self.auditor.audit(self.cluster, self.notifier, self.health);
        self.last_audit = self.clock.now();
    }

    /// Health state after the last audit
    pub fn health(&self) -> HealthState {
        self.health
    }

    /// Counters of the most recently finished session
    pub fn last_stats(&self) -> SessionStats {
        self.last_stats
    }

    fn handle_event(&self, event: &WatchedEvent, cache: &mut DedupCache, stats: &mut SessionStats) {
        log::debug!("Received {} event: {:?}", event.action, event.record);
        stats.received += 1;

        match self.dispatcher.dispatch(event, cache, self.notifier) {
            Ok(outcome) => stats.record(outcome),
            Err(e) => {
                stats.failed += 1;
                log::error!("Failed to process event {}: {}", event.record, e);
                report_error(
                    self.notifier,
                    &format!(
                        "Failed to process the event, error:\n{}\n{:?}",
                        diagnostic(&e),
                        event
                    ),
                );
                self.clock.sleep(self.config.error_backoff);
            }
        }
    }

    fn next_audit_at(&self) -> Instant {
        self.last_audit + self.config.health_check_interval
    }

    fn until_next_audit(&self) -> Duration {
        self.next_audit_at()
            .saturating_duration_since(self.clock.now())
    }

    fn audit_due(&self) -> bool {
        self.clock.now() >= self.next_audit_at()
    }
}
