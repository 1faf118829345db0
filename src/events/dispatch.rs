//! Event dispatch pipeline
//!
//! skip filter -> dedup check -> classify -> deliver -> remember identity

use super::classifier::EventClassifier;
use super::dedup::DedupCache;
use crate::domain::WatchedEvent;
use crate::error::NotifyError;
use crate::notify::{deliver, Notifier};

use std::collections::BTreeSet;
use std::fmt;

/// Reason added to the skip set when delete events are suppressed
pub const SUCCESSFUL_DELETE_REASON: &str = "SUCCESSFULDELETE";

/// Set of uppercased reason codes that are never notified
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkipReasons(BTreeSet<String>);

impl SkipReasons {
    /// Build from a list of reasons, matched case-insensitively
    pub fn new<I, S>(reasons: I, skip_delete_events: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set: BTreeSet<String> = reasons
            .into_iter()
            .map(|r| r.as_ref().trim().to_uppercase())
            .filter(|r| !r.is_empty())
            .collect();
        if skip_delete_events {
            set.insert(SUCCESSFUL_DELETE_REASON.to_string());
        }
        Self(set)
    }

    /// Parse a whitespace-separated list
    pub fn parse(raw: &str, skip_delete_events: bool) -> Self {
        Self::new(raw.split_whitespace(), skip_delete_events)
    }

    pub fn contains(&self, reason_code: &str) -> bool {
        self.0.contains(&reason_code.to_uppercase())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl fmt::Display for SkipReasons {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.iter().collect::<Vec<_>>().join(", "))
    }
}

/// What happened to one dispatched event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Reason is in the skip set
    Skipped,
    /// Identity was already notified this session
    Duplicate,
    /// Sent to the notifier and recorded
    Notified,
}

/// Runs one event through the dispatch pipeline
#[derive(Debug, Clone, Default)]
pub struct EventDispatcher {
    skip: SkipReasons,
    classifier: EventClassifier,
}

impl EventDispatcher {
    pub fn new(skip: SkipReasons, classifier: EventClassifier) -> Self {
        Self { skip, classifier }
    }

    /// Dispatch one event.
    ///
    /// The skip check runs before the dedup check, and a skipped event never
    /// touches the cache. The identity is recorded only after the notifier
    /// accepted the message or the endpoint rejected it (rejections are not
    /// retried); a transport failure leaves the cache unchanged and is
    /// returned to the caller.
    pub fn dispatch(
        &self,
        event: &WatchedEvent,
        cache: &mut DedupCache,
        notifier: &dyn Notifier,
    ) -> Result<DispatchOutcome, NotifyError> {
        let record = &event.record;
        let reason = record.reason_code();
        if self.skip.contains(&reason) {
            log::info!("Event reason {} is in the skip list, skipping", reason);
            return Ok(DispatchOutcome::Skipped);
        }

        if cache.contains(&record.uid) {
            log::info!("Event {} was already notified, skipping", record.uid);
            return Ok(DispatchOutcome::Duplicate);
        }

        let notification = self.classifier.classify(event);
        deliver(notifier, &notification)?;
        cache.insert(&record.uid);

        Ok(DispatchOutcome::Notified)
    }
}
