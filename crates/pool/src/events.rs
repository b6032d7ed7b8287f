//! Event broadcasting for pool lifecycle observability.
//!
//! Provides [`PoolEvent`] variants emitted by the pool and its maintenance
//! loops, and an [`EventBus`] backed by `tokio::sync::broadcast`.

use std::time::Duration;

use tokio::sync::broadcast;

use crate::tracker::ResourceId;

/// Events emitted during pool operations.
///
/// Every variant carries the `resource_id` label of the factory that owns
/// the pool. Subscribers receive cloned copies via [`EventBus::subscribe`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolEvent {
    /// A new resource was created (initial fill or replenishment).
    Created {
        /// The factory identifier.
        resource_id: String,
        /// Identity of the new resource.
        id: ResourceId,
    },
    /// A resource was handed out to a caller.
    Acquired {
        /// The factory identifier.
        resource_id: String,
        /// Identity of the resource.
        id: ResourceId,
    },
    /// A resource came back to the pool.
    Released {
        /// The factory identifier.
        resource_id: String,
        /// Identity of the resource.
        id: ResourceId,
        /// How long the caller held it.
        held_for: Duration,
    },
    /// A resource was closed and removed from the pool.
    Evicted {
        /// The factory identifier.
        resource_id: String,
        /// Identity of the resource.
        id: ResourceId,
        /// Why it was removed.
        reason: EvictionReason,
    },
    /// A replenishment attempt failed; retried on the next tick.
    ReplenishFailed {
        /// The factory identifier.
        resource_id: String,
        /// How many resources were still missing.
        deficit: usize,
        /// Human-readable error description.
        error: String,
    },
    /// The pool was closed.
    Closed {
        /// The factory identifier.
        resource_id: String,
    },
}

/// Reason a resource was permanently removed from the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvictionReason {
    /// Not handed out for longer than `max_idle_time`.
    IdleTimeout,
    /// The factory's health check failed.
    HealthCheckFailed,
    /// The pool is shutting down.
    Shutdown,
    /// The buffer had no room left for the resource.
    Overflow,
}

/// Broadcast-based event bus for pool events.
///
/// Emission is fire-and-forget: if no subscribers are listening or the
/// channel is full, events are silently dropped.
pub struct EventBus {
    sender: broadcast::Sender<PoolEvent>,
}

impl EventBus {
    /// Create a new event bus with the given buffer size. A size of zero is
    /// raised to one.
    #[must_use]
    pub fn new(buffer_size: usize) -> Self {
        let (sender, _) = broadcast::channel(buffer_size.max(1));
        Self { sender }
    }

    /// Emit an event to all current subscribers.
    pub fn emit(&self, event: PoolEvent) {
        let _ = self.sender.send(event);
    }

    /// Subscribe to events emitted after this call.
    ///
    /// A subscriber that falls behind by more than the buffer size receives
    /// a `Lagged` error and skips to the latest events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<PoolEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.sender.receiver_count())
            .finish()
    }
}
