//! Shared test factory for integration tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use reservoir_pool::{Error, Factory, PoolConfig, Result};

/// Resource handed out by [`MockFactory`].
#[derive(Debug, PartialEq, Eq)]
pub struct MockConn {
    pub serial: u64,
}

/// Knobs and counters shared between a test and the factory it moved into a pool.
#[derive(Debug, Default)]
pub struct MockState {
    next: AtomicU64,
    pub created: AtomicUsize,
    pub closed: AtomicUsize,
    pub health_checks: AtomicUsize,
    /// Every `create` fails while set.
    pub fail_create: AtomicBool,
    /// `create` fails once this many resources exist. `0` disables the limit.
    pub fail_after: AtomicUsize,
    /// Serials whose health check fails.
    pub unhealthy: Mutex<HashSet<u64>>,
    /// Every health check fails while set.
    pub all_unhealthy: AtomicBool,
    /// How long each health check takes, in milliseconds.
    pub health_latency_ms: AtomicU64,
    /// Serials passed to `close`, in order.
    pub closed_serials: Mutex<Vec<u64>>,
}

impl MockState {
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn set_fail_create(&self, fail: bool) {
        self.fail_create.store(fail, Ordering::SeqCst);
    }

    pub fn set_all_unhealthy(&self, unhealthy: bool) {
        self.all_unhealthy.store(unhealthy, Ordering::SeqCst);
    }

    pub fn set_health_latency(&self, latency: Duration) {
        let millis = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
        self.health_latency_ms.store(millis, Ordering::SeqCst);
    }

    pub fn mark_unhealthy(&self, serial: u64) {
        self.unhealthy.lock().insert(serial);
    }

    /// True if no serial was closed twice.
    pub fn closed_exactly_once(&self) -> bool {
        let serials = self.closed_serials.lock();
        let unique: HashSet<_> = serials.iter().collect();
        unique.len() == serials.len()
    }
}

/// Factory whose behaviour is steered through [`MockState`].
pub struct MockFactory {
    state: Arc<MockState>,
}

impl MockFactory {
    pub fn new() -> (Self, Arc<MockState>) {
        let state = Arc::new(MockState::default());
        (
            Self {
                state: Arc::clone(&state),
            },
            state,
        )
    }
}

impl Factory for MockFactory {
    type Resource = MockConn;

    fn id(&self) -> &str {
        "mock"
    }

    async fn create(&self) -> Result<MockConn> {
        if self.state.fail_create.load(Ordering::SeqCst) {
            return Err(Error::factory("mock", "connection refused"));
        }
        let limit = self.state.fail_after.load(Ordering::SeqCst);
        if limit > 0 && self.state.created() >= limit {
            return Err(Error::factory("mock", "limit reached"));
        }
        let serial = self.state.next.fetch_add(1, Ordering::SeqCst);
        self.state.created.fetch_add(1, Ordering::SeqCst);
        Ok(MockConn { serial })
    }

    async fn health_check(&self, resource: &mut MockConn) -> bool {
        self.state.health_checks.fetch_add(1, Ordering::SeqCst);
        let latency = self.state.health_latency_ms.load(Ordering::SeqCst);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }
        !self.state.all_unhealthy.load(Ordering::SeqCst)
            && !self.state.unhealthy.lock().contains(&resource.serial)
    }

    async fn close(&self, resource: MockConn) {
        self.state.closed.fetch_add(1, Ordering::SeqCst);
        self.state.closed_serials.lock().push(resource.serial);
    }
}

/// Config with maintenance periods long enough to never fire on their own.
pub fn quiet_config(max_connections: usize) -> PoolConfig {
    PoolConfig::new(
        max_connections,
        Duration::from_millis(100),
        Duration::from_secs(600),
        Duration::from_secs(3600),
        Duration::from_secs(3600),
    )
}

/// Poll until `cond` holds, yielding to spawned tasks in between.
pub async fn eventually(mut cond: impl FnMut() -> bool) {
    for _ in 0..100 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert!(cond(), "condition not reached in time");
}
