//! Event filtering, deduplication and classification

pub mod classifier;
pub mod dedup;
pub mod dispatch;

pub use classifier::{tier_for, EventClassifier, FALLBACK};
pub use dedup::DedupCache;
pub use dispatch::{DispatchOutcome, EventDispatcher, SkipReasons};
