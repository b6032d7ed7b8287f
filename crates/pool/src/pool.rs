//! Resource pool: the acquisition/release engine.
//!
//! `Pool<F>` owns a bounded buffer of idle resources produced by a
//! [`Factory`], hands them out under a timeout, takes them back, and runs
//! the maintenance loops that evict idle or unhealthy resources and top the
//! pool back up to `max_connections`.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{Notify, broadcast};
use tokio::time::Instant;

use crate::buffer::{AvailableBuffer, Rejected, Take};
use crate::config::PoolConfig;
use crate::error::{Error, Result};
use crate::events::{EventBus, EvictionReason, PoolEvent};
use crate::factory::Factory;
use crate::maintenance::Maintenance;
use crate::tracker::{IdleTracker, ResourceId};

// ---------------------------------------------------------------------------
// Pool internals
// ---------------------------------------------------------------------------

/// A resource together with its pool-assigned identity.
pub(crate) struct Slot<T> {
    id: ResourceId,
    resource: T,
}

/// Pool statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Resources believed live (available, checked out, or being created).
    pub connection_count: usize,
    /// Resources sitting in the buffer.
    pub available: usize,
    /// Resources currently checked out.
    pub in_use: usize,
    /// Total successful acquisitions.
    pub total_acquisitions: u64,
    /// Total returns to the pool (explicit or on drop).
    pub total_releases: u64,
    /// Acquisitions that gave up after `acquire_timeout`.
    pub timeouts: u64,
    /// Total resources ever created.
    pub created: u64,
    /// Total resources ever closed.
    pub closed: u64,
    /// Health checks that failed.
    pub health_checks_failed: u64,
    /// Replenishment ticks aborted by a factory error.
    pub replenish_failures: u64,
}

#[derive(Debug, Default)]
struct Counters {
    total_acquisitions: u64,
    total_releases: u64,
    timeouts: u64,
    created: u64,
    closed: u64,
    health_checks_failed: u64,
    replenish_failures: u64,
}

/// State guarded by the pool's single lock. Never held across an `.await`.
#[derive(Debug, Default)]
struct PoolState {
    tracker: IdleTracker,
    connection_count: usize,
    checked_out: HashSet<ResourceId>,
    counters: Counters,
}

impl PoolState {
    /// Drop every trace of `id` from the accounting.
    fn forget(&mut self, id: ResourceId) {
        self.tracker.remove(id);
        self.connection_count = self.connection_count.saturating_sub(1);
        self.counters.closed += 1;
    }
}

/// Inner shared state for the pool.
pub(crate) struct Shared<F: Factory> {
    factory: F,
    config: PoolConfig,
    buffer: AvailableBuffer<Slot<F::Resource>>,
    state: Mutex<PoolState>,
    closed: AtomicBool,
    next_id: AtomicU64,
    /// Callers blocked in `acquire` on an empty buffer.
    waiters: AtomicUsize,
    /// Signalled whenever a caller starts waiting; interrupts health checks.
    demand: Notify,
    events: EventBus,
    pub(crate) maintenance: Maintenance,
}

/// Counts one blocked acquirer for as long as it lives.
struct Waiting<'a>(&'a AtomicUsize);

impl<'a> Waiting<'a> {
    fn register(waiters: &'a AtomicUsize) -> Self {
        waiters.fetch_add(1, Ordering::SeqCst);
        Self(waiters)
    }
}

impl Drop for Waiting<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl<F: Factory> Shared<F> {
    fn resource_id(&self) -> &str {
        self.factory.id()
    }

    pub(crate) fn config(&self) -> &PoolConfig {
        &self.config
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn forget(&self, id: ResourceId) {
        self.state.lock().forget(id);
    }

    async fn create_slot(&self) -> Result<Slot<F::Resource>> {
        let resource = self.factory.create().await?;
        let id = ResourceId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.state.lock().counters.created += 1;
        self.events.emit(PoolEvent::Created {
            resource_id: self.resource_id().to_string(),
            id,
        });
        tracing::trace!(resource_id = self.resource_id(), %id, "created resource");
        Ok(Slot { id, resource })
    }

    /// Hand the resource to the factory for good. Accounting is the caller's job.
    async fn close_resource(&self, slot: Slot<F::Resource>, reason: EvictionReason) {
        self.emit_evicted(slot.id, reason);
        self.factory.close(slot.resource).await;
    }

    fn emit_evicted(&self, id: ResourceId, reason: EvictionReason) {
        tracing::debug!(resource_id = self.resource_id(), %id, ?reason, "closing resource");
        self.events.emit(PoolEvent::Evicted {
            resource_id: self.resource_id().to_string(),
            id,
            reason,
        });
    }

    /// Put a slot into the buffer. The closed flag is checked before every write.
    fn push_back(
        &self,
        slot: Slot<F::Resource>,
    ) -> std::result::Result<(), (Slot<F::Resource>, EvictionReason)> {
        if self.is_closed() {
            return Err((slot, EvictionReason::Shutdown));
        }
        self.buffer.push(slot).map_err(|rejected| match rejected {
            Rejected::Closed(slot) => (slot, EvictionReason::Shutdown),
            Rejected::Full(slot) => {
                tracing::warn!(
                    resource_id = self.resource_id(),
                    id = %slot.id,
                    "buffer full; closing surplus resource"
                );
                (slot, EvictionReason::Overflow)
            }
        })
    }

    /// Return a slot taken out by a sweep or freshly created. Returns `false`
    /// if the buffer refused it and it was closed instead.
    async fn restore(&self, slot: Slot<F::Resource>) -> bool {
        match self.push_back(slot) {
            Ok(()) => true,
            Err((slot, reason)) => {
                self.forget(slot.id);
                self.close_resource(slot, reason).await;
                false
            }
        }
    }

    // -- acquisition ------------------------------------------------------

    async fn acquire(self: &Arc<Self>) -> Result<Pooled<F>> {
        if self.is_closed() {
            return Err(Error::closed(self.resource_id()));
        }

        // Waiters already queued keep their place ahead of newcomers.
        if self.waiters.load(Ordering::SeqCst) == 0
            && let Some(slot) = self.buffer.try_take()
        {
            return self.check_out(slot).await;
        }

        let timeout = self.config.acquire_timeout;
        let _waiting = Waiting::register(&self.waiters);
        self.demand.notify_waiters();
        // A timeout too large to represent means waiting without a deadline.
        let deadline = Instant::now().checked_add(timeout);
        let slot = match self.buffer.take(deadline).await {
            Take::Item(slot) => slot,
            Take::TimedOut => {
                self.state.lock().counters.timeouts += 1;
                tracing::debug!(
                    resource_id = self.resource_id(),
                    timeout_ms = timeout.as_millis(),
                    "acquire timed out"
                );
                return Err(Error::timeout(self.resource_id(), timeout));
            }
            Take::Closed => return Err(Error::closed(self.resource_id())),
        };

        self.check_out(slot).await
    }

    fn try_acquire(self: &Arc<Self>) -> Result<Option<Slot<F::Resource>>> {
        if self.is_closed() {
            return Err(Error::closed(self.resource_id()));
        }
        Ok(self.buffer.try_take())
    }

    /// Transfer ownership of `slot` to a caller.
    async fn check_out(self: &Arc<Self>, slot: Slot<F::Resource>) -> Result<Pooled<F>> {
        if self.is_closed() {
            self.forget(slot.id);
            self.close_resource(slot, EvictionReason::Shutdown).await;
            return Err(Error::closed(self.resource_id()));
        }
        Ok(self.hand_out(slot))
    }

    fn hand_out(self: &Arc<Self>, slot: Slot<F::Resource>) -> Pooled<F> {
        let now = Instant::now();
        {
            let mut state = self.state.lock();
            state.tracker.record_access(slot.id, now);
            state.checked_out.insert(slot.id);
            state.counters.total_acquisitions += 1;
        }
        self.events.emit(PoolEvent::Acquired {
            resource_id: self.resource_id().to_string(),
            id: slot.id,
        });
        tracing::trace!(resource_id = self.resource_id(), id = %slot.id, "resource acquired");
        Pooled {
            slot: Some(slot),
            shared: Arc::clone(self),
            acquired_at: now,
        }
    }

    // -- release ----------------------------------------------------------

    /// Take a checked-out slot back. On refusal the slot is returned with the
    /// reason it must be closed; accounting is already settled.
    fn return_slot(
        &self,
        slot: Slot<F::Resource>,
        held_for: Duration,
    ) -> std::result::Result<(), (Slot<F::Resource>, EvictionReason)> {
        {
            let mut state = self.state.lock();
            let was_checked_out = state.checked_out.remove(&slot.id);
            debug_assert!(was_checked_out, "returned resource was not checked out");
            state.counters.total_releases += 1;
        }
        self.events.emit(PoolEvent::Released {
            resource_id: self.resource_id().to_string(),
            id: slot.id,
            held_for,
        });

        self.push_back(slot).map_err(|(slot, reason)| {
            self.forget(slot.id);
            (slot, reason)
        })
    }

    async fn check_in(&self, slot: Slot<F::Resource>, held_for: Duration) -> Result<()> {
        match self.return_slot(slot, held_for) {
            Ok(()) => Ok(()),
            Err((slot, reason)) => {
                self.close_resource(slot, reason).await;
                match reason {
                    EvictionReason::Overflow => Ok(()),
                    _ => Err(Error::closed(self.resource_id())),
                }
            }
        }
    }

    /// Synchronous return path used when a `Pooled` handle is dropped.
    fn check_in_on_drop(self: &Arc<Self>, slot: Slot<F::Resource>, held_for: Duration) {
        let Err((slot, reason)) = self.return_slot(slot, held_for) else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let shared = Arc::clone(self);
                drop(handle.spawn(async move {
                    shared.close_resource(slot, reason).await;
                }));
            }
            Err(_) => {
                // No runtime to drive the factory; the value's own Drop has to do.
                self.emit_evicted(slot.id, reason);
                drop(slot);
            }
        }
    }

    // -- maintenance ------------------------------------------------------

    /// Close every idle resource not handed out for longer than
    /// `max_idle_time`. Returns how many were evicted.
    pub(crate) async fn reclaim_idle(&self) -> usize {
        if self.is_closed() {
            return 0;
        }
        let max_idle = self.config.max_idle_time;
        let now = Instant::now();
        let stale = self.state.lock().tracker.scan_stale(now, max_idle);
        if stale.is_empty() {
            return 0;
        }

        let mut evicted = 0;
        for _ in 0..self.buffer.len() {
            let Some(slot) = self.buffer.try_take() else {
                break;
            };
            let commit = stale.contains(&slot.id) && {
                let mut state = self.state.lock();
                let still_stale = state.tracker.is_stale(slot.id, now, max_idle);
                if still_stale {
                    state.forget(slot.id);
                }
                still_stale
            };
            if commit {
                self.close_resource(slot, EvictionReason::IdleTimeout).await;
                evicted += 1;
            } else {
                self.restore(slot).await;
            }
        }

        if evicted > 0 {
            tracing::debug!(
                resource_id = self.resource_id(),
                evicted,
                "reclaimed idle resources"
            );
        }
        evicted
    }

    /// Check every tracked idle resource; evict those that fail the check or
    /// have been idle too long. Returns how many were evicted.
    pub(crate) async fn check_health(&self) -> usize {
        if self.is_closed() {
            return 0;
        }
        let tracked = self.state.lock().tracker.ids();
        if tracked.is_empty() {
            return 0;
        }

        let max_idle = self.config.max_idle_time;
        let mut evicted = 0;
        for _ in 0..self.buffer.len() {
            let Some(mut slot) = self.buffer.try_take() else {
                break;
            };
            if !tracked.contains(&slot.id) {
                self.restore(slot).await;
                continue;
            }

            let Some(healthy) = self.run_health_check(&mut slot.resource).await else {
                tracing::trace!(
                    resource_id = self.resource_id(),
                    id = %slot.id,
                    "health check yielded to a waiting caller"
                );
                self.restore(slot).await;
                continue;
            };
            let now = Instant::now();
            let reason = {
                let mut state = self.state.lock();
                let reason = if !healthy {
                    state.counters.health_checks_failed += 1;
                    Some(EvictionReason::HealthCheckFailed)
                } else if state.tracker.is_stale(slot.id, now, max_idle) {
                    Some(EvictionReason::IdleTimeout)
                } else {
                    None
                };
                if reason.is_some() {
                    state.forget(slot.id);
                }
                reason
            };

            match reason {
                Some(reason) => {
                    if reason == EvictionReason::HealthCheckFailed {
                        tracing::warn!(
                            resource_id = self.resource_id(),
                            id = %slot.id,
                            "health check failed"
                        );
                    }
                    self.close_resource(slot, reason).await;
                    evicted += 1;
                }
                None => {
                    self.restore(slot).await;
                }
            }
        }
        evicted
    }

    /// Run the factory's health check unless a caller is blocked waiting
    /// for a resource. Returns `None` when the check was skipped or abandoned
    /// so the slot can go straight back to that caller.
    async fn run_health_check(&self, resource: &mut F::Resource) -> Option<bool> {
        let notified = self.demand.notified();
        tokio::pin!(notified);
        // Register before re-checking so a caller arriving in between is seen.
        notified.as_mut().enable();
        if self.waiters.load(Ordering::SeqCst) > 0 {
            return None;
        }
        tokio::select! {
            biased;
            healthy = self.factory.health_check(resource) => Some(healthy),
            () = &mut notified => None,
        }
    }

    /// Create resources until `connection_count` reaches `max_connections`.
    /// A factory failure aborts the batch. Returns how many were added.
    pub(crate) async fn replenish(&self) -> usize {
        let deficit = {
            let mut state = self.state.lock();
            if self.is_closed() {
                return 0;
            }
            let deficit = self
                .config
                .max_connections
                .saturating_sub(state.connection_count);
            // Reserve the whole batch so concurrent accounting stays within capacity.
            state.connection_count += deficit;
            deficit
        };
        if deficit == 0 {
            return 0;
        }

        let mut created = 0;
        for attempt in 0..deficit {
            if self.is_closed() {
                self.unreserve(deficit - attempt);
                break;
            }
            match self.create_slot().await {
                Ok(slot) => {
                    if self.restore(slot).await {
                        created += 1;
                    }
                }
                Err(e) => {
                    let missing = deficit - attempt;
                    self.unreserve(missing);
                    self.state.lock().counters.replenish_failures += 1;
                    tracing::warn!(
                        resource_id = self.resource_id(),
                        deficit = missing,
                        error = %e,
                        "replenishment failed; retrying next tick"
                    );
                    self.events.emit(PoolEvent::ReplenishFailed {
                        resource_id: self.resource_id().to_string(),
                        deficit: missing,
                        error: e.to_string(),
                    });
                    break;
                }
            }
        }

        if created > 0 {
            tracing::debug!(resource_id = self.resource_id(), created, "replenished pool");
        }
        created
    }

    fn unreserve(&self, count: usize) {
        let mut state = self.state.lock();
        state.connection_count = state.connection_count.saturating_sub(count);
    }

    // -- shutdown ---------------------------------------------------------

    async fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.maintenance.cancel();
        self.buffer.close();

        let mut drained = 0;
        while let Some(slot) = self.buffer.try_take() {
            self.forget(slot.id);
            self.close_resource(slot, EvictionReason::Shutdown).await;
            drained += 1;
        }
        self.maintenance.join().await;

        self.events.emit(PoolEvent::Closed {
            resource_id: self.resource_id().to_string(),
        });
        tracing::info!(resource_id = self.resource_id(), drained, "pool closed");
    }

    fn stats(&self) -> PoolStats {
        let state = self.state.lock();
        PoolStats {
            connection_count: state.connection_count,
            available: self.buffer.len(),
            in_use: state.checked_out.len(),
            total_acquisitions: state.counters.total_acquisitions,
            total_releases: state.counters.total_releases,
            timeouts: state.counters.timeouts,
            created: state.counters.created,
            closed: state.counters.closed,
            health_checks_failed: state.counters.health_checks_failed,
            replenish_failures: state.counters.replenish_failures,
        }
    }
}

impl<F: Factory> Drop for Shared<F> {
    fn drop(&mut self) {
        // Last handle gone without `close`: stop the loops; buffered values drop as-is.
        self.maintenance.cancel();
    }
}

// ---------------------------------------------------------------------------
// Pool<F>
// ---------------------------------------------------------------------------

/// Generic bounded resource pool.
///
/// Keeps `max_connections` resources created by `F` alive, hands them out
/// through [`Pooled`] handles, and runs three background loops (idle
/// reclamation, health checks, replenishment) until [`Pool::close`].
///
/// Cloning is cheap; all clones share the same pool.
///
/// # Example
///
/// ```rust,ignore
/// let pool = Pool::new(factory, config).await?;
/// let conn = pool.acquire().await?;
/// // use *conn ...
/// pool.release(conn).await?;
/// pool.close().await;
/// ```
pub struct Pool<F: Factory> {
    shared: Arc<Shared<F>>,
}

impl<F: Factory> Clone for Pool<F> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<F: Factory> std::fmt::Debug for Pool<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pool")
            .field("resource_id", &self.shared.resource_id())
            .field("closed", &self.shared.is_closed())
            .field("stats", &self.shared.stats())
            .finish()
    }
}

impl<F: Factory> Pool<F> {
    /// Create a pool, fill it with `max_connections` resources and start the
    /// maintenance loops. Must be called from within a tokio runtime.
    ///
    /// # Errors
    /// Returns `Configuration` if `config` is invalid, or the factory's error
    /// if the initial fill fails and `config.lazy_fill` is not set.
    pub async fn new(factory: F, config: PoolConfig) -> Result<Self> {
        config.validate()?;
        let max = config.max_connections;

        let shared = Arc::new(Shared {
            factory,
            buffer: AvailableBuffer::new(max),
            config,
            state: Mutex::new(PoolState::default()),
            closed: AtomicBool::new(false),
            next_id: AtomicU64::new(1),
            waiters: AtomicUsize::new(0),
            demand: Notify::new(),
            events: EventBus::default(),
            maintenance: Maintenance::new(),
        });

        for _ in 0..max {
            match shared.create_slot().await {
                Ok(slot) => {
                    shared.state.lock().connection_count += 1;
                    shared.restore(slot).await;
                }
                Err(e) if shared.config.lazy_fill => {
                    tracing::warn!(
                        resource_id = shared.resource_id(),
                        error = %e,
                        "initial fill incomplete; replenishment will retry"
                    );
                    break;
                }
                Err(e) => {
                    shared.close().await;
                    return Err(e);
                }
            }
        }

        Maintenance::start(&shared);

        tracing::info!(
            resource_id = shared.resource_id(),
            max_connections = max,
            filled = shared.state.lock().connection_count,
            "pool created"
        );

        Ok(Self { shared })
    }

    /// Acquire a resource, waiting up to `acquire_timeout` for one to become
    /// available.
    ///
    /// The returned handle goes back to the pool when passed to
    /// [`Pool::release`] or when dropped.
    ///
    /// # Errors
    /// `Timeout` if nothing became available in time, `ClosedPool` after
    /// [`Pool::close`].
    pub async fn acquire(&self) -> Result<Pooled<F>> {
        self.shared.acquire().await
    }

    /// Acquire a resource only if one is available right now.
    pub async fn try_acquire(&self) -> Result<Option<Pooled<F>>> {
        match self.shared.try_acquire()? {
            Some(slot) => self.shared.check_out(slot).await.map(Some),
            None => Ok(None),
        }
    }

    /// Return a resource to the pool.
    ///
    /// # Errors
    /// `InvalidResource` if the handle was acquired from a different pool
    /// (it is then returned to its own pool). `ClosedPool` if this pool has
    /// been closed; the resource is closed through the factory.
    pub async fn release(&self, mut conn: Pooled<F>) -> Result<()> {
        if !Arc::ptr_eq(&conn.shared, &self.shared) {
            return Err(Error::invalid_resource(self.shared.resource_id()));
        }
        let Some(slot) = conn.slot.take() else {
            return Err(Error::invalid_resource(self.shared.resource_id()));
        };
        let held_for = conn.acquired_at.elapsed();
        self.shared.check_in(slot, held_for).await
    }

    /// Close the pool.
    ///
    /// Stops the maintenance loops (a tick in progress is allowed to finish),
    /// refuses further writes to the buffer, and closes every resource that
    /// is not checked out. Checked-out resources are closed when they come
    /// back. Calling `close` again is a no-op.
    pub async fn close(&self) {
        self.shared.close().await;
    }

    /// Whether [`Pool::close`] has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.shared.is_closed()
    }

    /// Number of resources believed live.
    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.shared.state.lock().connection_count
    }

    /// Get current pool statistics.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        self.shared.stats()
    }

    /// The configuration the pool was built with.
    #[must_use]
    pub fn config(&self) -> &PoolConfig {
        &self.shared.config
    }

    /// The factory backing this pool.
    #[must_use]
    pub fn factory(&self) -> &F {
        &self.shared.factory
    }

    /// Subscribe to pool lifecycle events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<PoolEvent> {
        self.shared.events.subscribe()
    }

    /// Run one idle-reclamation sweep now. Returns how many resources were
    /// evicted.
    pub async fn reclaim_idle(&self) -> usize {
        self.shared.reclaim_idle().await
    }

    /// Run one health-check sweep now. Returns how many resources were
    /// evicted.
    pub async fn check_health(&self) -> usize {
        self.shared.check_health().await
    }

    /// Run one replenishment pass now. Returns how many resources were
    /// created.
    pub async fn replenish(&self) -> usize {
        self.shared.replenish().await
    }
}

// ---------------------------------------------------------------------------
// Pooled<F>
// ---------------------------------------------------------------------------

/// A resource checked out of a [`Pool`].
///
/// Dereferences to the resource. Goes back to the pool on [`Pool::release`]
/// or when dropped; [`detach`](Pooled::detach) takes it out of the pool for
/// good.
pub struct Pooled<F: Factory> {
    slot: Option<Slot<F::Resource>>,
    shared: Arc<Shared<F>>,
    acquired_at: Instant,
}

impl<F: Factory> Pooled<F> {
    /// Pool-assigned identity of the resource.
    #[must_use]
    pub fn id(&self) -> ResourceId {
        self.slot().id
    }

    /// When the resource was handed out.
    #[must_use]
    pub fn acquired_at(&self) -> Instant {
        self.acquired_at
    }

    /// Take the resource out of the pool.
    ///
    /// The pool stops counting it, so replenishment creates a replacement.
    /// Closing the detached resource is up to the caller.
    #[must_use]
    pub fn detach(mut self) -> F::Resource {
        let slot = self.slot.take().expect("pooled handle used after release");
        {
            let mut state = self.shared.state.lock();
            state.checked_out.remove(&slot.id);
            state.tracker.remove(slot.id);
            state.connection_count = state.connection_count.saturating_sub(1);
        }
        tracing::debug!(resource_id = self.shared.resource_id(), id = %slot.id, "resource detached");
        slot.resource
    }

    fn slot(&self) -> &Slot<F::Resource> {
        self.slot.as_ref().expect("pooled handle used after release")
    }
}

impl<F: Factory> std::ops::Deref for Pooled<F> {
    type Target = F::Resource;

    fn deref(&self) -> &F::Resource {
        &self.slot().resource
    }
}

impl<F: Factory> std::ops::DerefMut for Pooled<F> {
    fn deref_mut(&mut self) -> &mut F::Resource {
        &mut self
            .slot
            .as_mut()
            .expect("pooled handle used after release")
            .resource
    }
}

impl<F: Factory> Drop for Pooled<F> {
    fn drop(&mut self) {
        if let Some(slot) = self.slot.take() {
            let held_for = self.acquired_at.elapsed();
            self.shared.check_in_on_drop(slot, held_for);
        }
    }
}

impl<F: Factory> std::fmt::Debug for Pooled<F>
where
    F::Resource: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("Pooled");
        if let Some(slot) = &self.slot {
            s.field("id", &slot.id).field("resource", &slot.resource);
        }
        s.field("pool", &self.shared.resource_id()).finish()
    }
}
