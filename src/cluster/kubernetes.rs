//! Kubernetes implementation of the cluster traits
//!
//! Wraps a kube-rs client and a current-thread tokio runtime so the rest of
//! the crate can stay synchronous: every API call is driven to completion
//! with `block_on` from the single control thread.

use crate::cluster::traits::{EventSession, EventSource, InstanceLister, SessionItem};
use crate::domain::event::non_empty;
use crate::domain::{
    ContainerWait, EventRecord, ObjectRef, Scope, WatchAction, WatchedEvent, WorkloadInstance,
};
use crate::error::ClusterError;

use futures::stream::BoxStream;
use futures::StreamExt;
use k8s_openapi::api::core::v1::{Event, Pod};
use kube::api::{Api, ListParams, WatchEvent, WatchParams};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::runtime::Runtime;

/// The API server refuses single watch calls of 295 seconds or more
const MAX_WATCH_CALL_SECS: u64 = 290;

type EventStream = BoxStream<'static, kube::Result<WatchEvent<Event>>>;

/// Cluster access through kube-rs
pub struct KubeCluster {
    runtime: Arc<Runtime>,
    client: kube::Client,
}

impl KubeCluster {
    /// Connect using in-cluster configuration, falling back to kubeconfig
    pub fn connect() -> Result<Self, ClusterError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let client = runtime
            .block_on(kube::Client::try_default())
            .map_err(|e| ClusterError::Connect(e.to_string()))?;

        Ok(Self {
            runtime: Arc::new(runtime),
            client,
        })
    }

    fn api<K>(&self, scope: &Scope) -> Api<K>
    where
        K: kube::Resource<Scope = k8s_openapi::NamespaceResourceScope>,
        <K as kube::Resource>::DynamicType: Default,
    {
        match scope.namespace() {
            Some(ns) => Api::namespaced(self.client.clone(), ns),
            None => Api::all(self.client.clone()),
        }
    }
}

impl EventSource for KubeCluster {
    type Session = KubeEventSession;

    fn open_session(
        &self,
        scope: &Scope,
        timeout: Duration,
    ) -> Result<Self::Session, ClusterError> {
        log::info!("Watching events in {} for {:?}", scope, timeout);

        let mut session = KubeEventSession {
            runtime: Arc::clone(&self.runtime),
            api: self.api(scope),
            cursor: WatchCursor::new(Instant::now() + timeout),
            stream: None,
        };
        session.stream = Some(session.open_watch()?);
        Ok(session)
    }
}

impl InstanceLister for KubeCluster {
    fn list_instances(&self, scope: &Scope) -> Result<Vec<WorkloadInstance>, ClusterError> {
        let api: Api<Pod> = self.api(scope);
        let pods = self
            .runtime
            .block_on(async move { api.list(&ListParams::default()).await })?;

        Ok(pods.items.iter().map(workload_instance).collect())
    }
}

/// Outcome of one bounded read from a watch call
#[derive(Debug)]
enum WatchRead {
    /// Nothing arrived within the wait
    TimedOut,
    /// The server closed this watch call
    Ended,
    /// The stream yielded a transport or decode error
    Failed(String),
    Event(WatchEvent<Event>),
}

/// Session bookkeeping that outlives individual watch calls.
///
/// Tracks the session deadline and the last seen resource version, and
/// decides when the current watch call has to be reopened.
#[derive(Debug)]
struct WatchCursor {
    deadline: Instant,
    resource_version: String,
    reopen: bool,
}

impl WatchCursor {
    fn new(deadline: Instant) -> Self {
        Self {
            deadline,
            // "0" replays the current state first, like a fresh watch should
            resource_version: "0".to_string(),
            reopen: false,
        }
    }

    /// Server-side timeout for the next watch call
    fn call_timeout_secs(&self, now: Instant) -> u32 {
        let remaining = self.deadline.saturating_duration_since(now);
        remaining.as_secs().clamp(1, MAX_WATCH_CALL_SECS) as u32
    }

    /// How long the next read may block, or `None` once the session is over
    fn read_budget(&self, now: Instant, max_wait: Duration) -> Option<Duration> {
        if now >= self.deadline {
            return None;
        }
        Some(max_wait.min(self.deadline - now))
    }

    /// True once if the current watch call must be replaced
    fn take_reopen(&mut self) -> bool {
        std::mem::take(&mut self.reopen)
    }

    fn resume(&mut self, read: WatchRead, now: Instant) -> Result<SessionItem, ClusterError> {
        match read {
            WatchRead::TimedOut if now >= self.deadline => Ok(SessionItem::Expired),
            WatchRead::TimedOut => Ok(SessionItem::Idle),
            WatchRead::Ended => {
                self.reopen = true;
                Ok(SessionItem::Idle)
            }
            WatchRead::Failed(message) => {
                self.reopen = true;
                Err(ClusterError::Watch(message))
            }
            WatchRead::Event(event) => match event {
                WatchEvent::Added(ev) => Ok(self.track(WatchAction::Added, ev)),
                WatchEvent::Modified(ev) => Ok(self.track(WatchAction::Modified, ev)),
                WatchEvent::Deleted(ev) => Ok(self.track(WatchAction::Deleted, ev)),
                WatchEvent::Bookmark(bookmark) => {
                    self.resource_version = bookmark.metadata.resource_version;
                    Ok(SessionItem::Idle)
                }
                WatchEvent::Error(status) => {
                    self.reopen = true;
                    Err(ClusterError::Watch(format!("{:?}", status)))
                }
            },
        }
    }

    fn track(&mut self, action: WatchAction, event: Event) -> SessionItem {
        if let Some(version) = non_empty(event.metadata.resource_version.clone()) {
            self.resource_version = version;
        }
        SessionItem::Event(WatchedEvent {
            action,
            record: event_record(&event),
        })
    }
}

/// One watch session against the API server.
///
/// A single watch call is capped by the server, so the session reopens the
/// watch from the last seen resource version until its own deadline passes.
pub struct KubeEventSession {
    runtime: Arc<Runtime>,
    api: Api<Event>,
    cursor: WatchCursor,
    stream: Option<EventStream>,
}

impl KubeEventSession {
    fn open_watch(&self) -> Result<EventStream, ClusterError> {
        let call_secs = self.cursor.call_timeout_secs(Instant::now());
        let params = WatchParams::default().timeout(call_secs);

        let api = self.api.clone();
        let version = self.cursor.resource_version.clone();
        log::debug!("Opening watch call from version {} for {}s", version, call_secs);

        let stream = self
            .runtime
            .block_on(async move { api.watch(&params, &version).await })?;
        Ok(stream.boxed())
    }
}

impl EventSession for KubeEventSession {
    fn next_item(&mut self, max_wait: Duration) -> Result<SessionItem, ClusterError> {
        let Some(wait) = self.cursor.read_budget(Instant::now(), max_wait) else {
            return Ok(SessionItem::Expired);
        };

        if self.cursor.take_reopen() {
            self.stream = None;
        }
        if self.stream.is_none() {
            let stream = self.open_watch()?;
            self.stream = Some(stream);
        }
        let runtime = Arc::clone(&self.runtime);
        let Some(stream) = self.stream.as_mut() else {
            return Ok(SessionItem::Idle);
        };

        let next = runtime.block_on(async { tokio::time::timeout(wait, stream.next()).await });
        let read = match next {
            Err(_elapsed) => WatchRead::TimedOut,
            Ok(None) => WatchRead::Ended,
            Ok(Some(Err(e))) => WatchRead::Failed(e.to_string()),
            Ok(Some(Ok(event))) => WatchRead::Event(event),
        };
        self.cursor.resume(read, Instant::now())
    }
}

/// Flatten a `core/v1 Event` into an `EventRecord`
pub fn event_record(event: &Event) -> EventRecord {
    let meta = &event.metadata;
    let name = non_empty(meta.name.clone());
    let uid = non_empty(meta.uid.clone()).unwrap_or_else(|| {
        format!(
            "{}/{}",
            meta.namespace.as_deref().unwrap_or_default(),
            name.as_deref().unwrap_or_default()
        )
    });
    let involved = &event.involved_object;

    EventRecord {
        uid,
        name,
        created_at: meta.creation_timestamp.as_ref().map(|t| t.0.to_string()),
        reason: non_empty(event.reason.clone()),
        event_type: non_empty(event.type_.clone()),
        message: non_empty(event.message.clone()),
        involved_object: ObjectRef {
            kind: non_empty(involved.kind.clone()),
            name: non_empty(involved.name.clone()),
            namespace: non_empty(involved.namespace.clone()),
        },
        first_seen: event.first_timestamp.as_ref().map(|t| t.0.to_string()),
        last_seen: event.last_timestamp.as_ref().map(|t| t.0.to_string()),
        count: event.count.filter(|c| *c != 0),
    }
}

/// Reduce a `core/v1 Pod` to the parts the health audit needs
pub fn workload_instance(pod: &Pod) -> WorkloadInstance {
    let status = pod.status.as_ref();
    let containers = status
        .and_then(|s| s.container_statuses.as_ref())
        .map(|statuses| {
            statuses
                .iter()
                .map(|cs| ContainerWait {
                    name: cs.name.clone(),
                    waiting_reason: cs
                        .state
                        .as_ref()
                        .and_then(|state| state.waiting.as_ref())
                        .and_then(|waiting| waiting.reason.clone()),
                })
                .collect()
        })
        .unwrap_or_default();

    WorkloadInstance {
        name: pod.metadata.name.clone().unwrap_or_default(),
        namespace: pod.metadata.namespace.clone().unwrap_or_default(),
        phase: status.and_then(|s| non_empty(s.phase.clone())),
        containers,
    }
}
