//! Last-access bookkeeping for pooled resources.
//!
//! An entry is created the first time a resource is handed out and refreshed
//! on every later hand-out. Resources that were never acquired have no entry
//! and are therefore invisible to idle reclamation.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::time::Duration;

use tokio::time::Instant;

/// Pool-assigned identity of a resource.
///
/// Unique within one pool for the pool's whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(u64);

impl ResourceId {
    pub(crate) const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Mapping from resource identity to the time it was last handed out.
#[derive(Debug, Default)]
pub struct IdleTracker {
    last_accessed: HashMap<ResourceId, Instant>,
}

impl IdleTracker {
    /// Create an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `id` was handed out at `at`.
    pub fn record_access(&mut self, id: ResourceId, at: Instant) {
        self.last_accessed.insert(id, at);
    }

    /// When `id` was last handed out, if it is tracked.
    #[must_use]
    pub fn last_access(&self, id: ResourceId) -> Option<Instant> {
        self.last_accessed.get(&id).copied()
    }

    /// Whether `id` is tracked and has been idle longer than `max_idle`.
    #[must_use]
    pub fn is_stale(&self, id: ResourceId, now: Instant, max_idle: Duration) -> bool {
        self.last_accessed
            .get(&id)
            .is_some_and(|last| now.saturating_duration_since(*last) > max_idle)
    }

    /// All tracked ids idle longer than `max_idle`.
    #[must_use]
    pub fn scan_stale(&self, now: Instant, max_idle: Duration) -> HashSet<ResourceId> {
        self.last_accessed
            .iter()
            .filter(|(_, last)| now.saturating_duration_since(**last) > max_idle)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Stop tracking `id`. Returns the last access time if it was tracked.
    pub fn remove(&mut self, id: ResourceId) -> Option<Instant> {
        self.last_accessed.remove(&id)
    }

    /// Snapshot of every tracked id.
    #[must_use]
    pub fn ids(&self) -> HashSet<ResourceId> {
        self.last_accessed.keys().copied().collect()
    }

    /// Whether `id` has an entry.
    #[must_use]
    pub fn contains(&self, id: ResourceId) -> bool {
        self.last_accessed.contains_key(&id)
    }

    /// Number of tracked resources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.last_accessed.len()
    }

    /// Whether nothing is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.last_accessed.is_empty()
    }
}
