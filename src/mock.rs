//! Mock implementations for testing
//!
//! Provides a scripted cluster, a recording notifier and a virtual clock for
//! unit testing without a cluster or a webhook endpoint.

use crate::cluster::{EventSession, EventSource, InstanceLister, SessionItem};
use crate::domain::{Scope, WorkloadInstance};
use crate::error::{ClusterError, NotifyError};
use crate::notify::{Notification, Notifier};
use crate::services::Clock;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// One scripted step of a mock session
#[derive(Debug, Clone)]
pub enum ScriptItem {
    Item(SessionItem),
    /// The stream fails with this message
    Fail(String),
}

/// Virtual clock: `sleep` advances time instantly and is recorded
#[derive(Debug)]
pub struct FakeClock {
    now: Mutex<Instant>,
    sleeps: Mutex<Vec<Duration>>,
}

impl FakeClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
            sleeps: Mutex::new(Vec::new()),
        }
    }

    /// Move time forward without recording a sleep
    pub fn advance(&self, duration: Duration) {
        *self.now.lock().unwrap() += duration;
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap()
    }

    fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
        self.advance(duration);
    }
}

/// Mock cluster with scripted sessions and a fixed pod snapshot
#[derive(Debug)]
pub struct MockCluster {
    sessions: Mutex<VecDeque<Result<Vec<ScriptItem>, String>>>,
    instances: Mutex<Result<Vec<WorkloadInstance>, String>>,
    clock: Option<Arc<FakeClock>>,
    session_scopes: Mutex<Vec<Scope>>,
    listed_scopes: Mutex<Vec<Scope>>,
}

impl MockCluster {
    /// A cluster with no pods and no scripted sessions
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(VecDeque::new()),
            instances: Mutex::new(Ok(Vec::new())),
            clock: None,
            session_scopes: Mutex::new(Vec::new()),
            listed_scopes: Mutex::new(Vec::new()),
        }
    }

    /// Builder: set the pod snapshot
    pub fn with_instances(self, instances: Vec<WorkloadInstance>) -> Self {
        *self.instances.lock().unwrap() = Ok(instances);
        self
    }

    /// Builder: make pod listing fail
    pub fn with_listing_error(self, message: &str) -> Self {
        *self.instances.lock().unwrap() = Err(message.to_string());
        self
    }

    /// Builder: queue a session; it expires once the script runs out
    pub fn with_session(self, items: Vec<ScriptItem>) -> Self {
        self.sessions.lock().unwrap().push_back(Ok(items));
        self
    }

    /// Builder: queue a session that fails to open
    pub fn with_failing_open(self, message: &str) -> Self {
        self.sessions
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
        self
    }

    /// Builder: idle waits advance this clock by the requested wait
    pub fn with_clock(mut self, clock: Arc<FakeClock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn opened_sessions(&self) -> usize {
        self.session_scopes.lock().unwrap().len()
    }

    pub fn session_scopes(&self) -> Vec<Scope> {
        self.session_scopes.lock().unwrap().clone()
    }

    pub fn listed_scopes(&self) -> Vec<Scope> {
        self.listed_scopes.lock().unwrap().clone()
    }
}

impl EventSource for MockCluster {
    type Session = MockSession;

    fn open_session(&self, scope: &Scope, _timeout: Duration) -> Result<MockSession, ClusterError> {
        self.session_scopes.lock().unwrap().push(scope.clone());

        let script = self.sessions.lock().unwrap().pop_front().unwrap_or(Ok(Vec::new()));
        match script {
            Ok(items) => Ok(MockSession {
                items: items.into(),
                clock: self.clock.clone(),
            }),
            Err(message) => Err(ClusterError::Api(message)),
        }
    }
}

impl InstanceLister for MockCluster {
    fn list_instances(&self, scope: &Scope) -> Result<Vec<WorkloadInstance>, ClusterError> {
        self.listed_scopes.lock().unwrap().push(scope.clone());
        self.instances
            .lock()
            .unwrap()
            .clone()
            .map_err(ClusterError::Api)
    }
}

/// Session replaying a script
#[derive(Debug)]
pub struct MockSession {
    items: VecDeque<ScriptItem>,
    clock: Option<Arc<FakeClock>>,
}

impl EventSession for MockSession {
    fn next_item(&mut self, max_wait: Duration) -> Result<SessionItem, ClusterError> {
        match self.items.pop_front() {
            None => Ok(SessionItem::Expired),
            Some(ScriptItem::Fail(message)) => Err(ClusterError::Watch(message)),
            Some(ScriptItem::Item(SessionItem::Idle)) => {
                if let Some(clock) = &self.clock {
                    clock.advance(max_wait);
                }
                Ok(SessionItem::Idle)
            }
            Some(ScriptItem::Item(item)) => Ok(item),
        }
    }
}

/// Notifier that records every attempt
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
    /// Answer every request with this status instead of 200
    reject_status: Option<u16>,
    /// Fail every request at the transport level
    unreachable: bool,
    /// Fail this many upcoming requests at the transport level
    pending_failures: Mutex<usize>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting(status: u16) -> Self {
        Self {
            reject_status: Some(status),
            ..Default::default()
        }
    }

    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Default::default()
        }
    }

    /// Make the next `count` requests fail at the transport level
    pub fn fail_next(&self, count: usize) {
        *self.pending_failures.lock().unwrap() = count;
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(notification.clone());

        let mut pending = self.pending_failures.lock().unwrap();
        if self.unreachable || *pending > 0 {
            *pending = pending.saturating_sub(1);
            return Err(NotifyError::Transport("connection refused".to_string()));
        }
        if let Some(status) = self.reject_status {
            return Err(NotifyError::Rejected {
                status,
                body: "invalid_payload".to_string(),
            });
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}
