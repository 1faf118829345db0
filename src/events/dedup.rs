//! Per-session deduplication cache

use std::collections::HashSet;

/// Event identities already notified in the current watch session.
///
/// Lives exactly as long as one session; the watch loop builds a fresh one
/// every time it opens a session, so an event replayed by a new watch is
/// notified again.
#[derive(Debug, Default)]
pub struct DedupCache {
    seen: HashSet<String>,
}

impl DedupCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, uid: &str) -> bool {
        self.seen.contains(uid)
    }

    /// Record an identity; returns false if it was already present
    pub fn insert(&mut self, uid: &str) -> bool {
        self.seen.insert(uid.to_string())
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
