//! Background maintenance loops.
//!
//! Every pool runs three periodic tasks: idle reclamation, health checking
//! and replenishment. Each holds only a weak reference to the pool, so a
//! pool dropped without [`close`](crate::Pool::close) still lets its loops
//! wind down.

use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::config::PoolConfig;
use crate::factory::Factory;
use crate::pool::Shared;

/// The periodic jobs a pool runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Task {
    ReclaimIdle,
    HealthCheck,
    Replenish,
}

impl Task {
    const ALL: [Self; 3] = [Self::ReclaimIdle, Self::HealthCheck, Self::Replenish];

    fn name(self) -> &'static str {
        match self {
            Self::ReclaimIdle => "reclaim_idle",
            Self::HealthCheck => "health_check",
            Self::Replenish => "replenish",
        }
    }

    fn period(self, config: &PoolConfig) -> Duration {
        match self {
            Self::ReclaimIdle => config.cleanup_interval,
            Self::HealthCheck => config.health_check_interval,
            Self::Replenish => config.replenish_period(),
        }
    }

    async fn run<F: Factory>(self, shared: &Shared<F>) -> usize {
        match self {
            Self::ReclaimIdle => shared.reclaim_idle().await,
            Self::HealthCheck => shared.check_health().await,
            Self::Replenish => shared.replenish().await,
        }
    }
}

/// Handles to a pool's background loops.
#[derive(Debug)]
pub(crate) struct Maintenance {
    cancel: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl Maintenance {
    pub(crate) fn new() -> Self {
        Self {
            cancel: CancellationToken::new(),
            tasks: Mutex::new(Vec::with_capacity(Task::ALL.len())),
        }
    }

    /// Spawn every loop for `shared`. Must run inside a tokio runtime.
    pub(crate) fn start<F: Factory>(shared: &Arc<Shared<F>>) {
        let handles = Task::ALL.map(|task| {
            let period = task.period(shared.config());
            let cancel = shared.maintenance.cancel.child_token();
            tokio::spawn(run_loop(task, period, Arc::downgrade(shared), cancel))
        });
        shared.maintenance.tasks.lock().extend(handles);
    }

    /// Ask every loop to stop after its current tick.
    pub(crate) fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for every loop to exit.
    pub(crate) async fn join(&self) {
        let handles = std::mem::take(&mut *self.tasks.lock());
        for handle in handles {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "maintenance task ended abnormally");
            }
        }
    }
}

async fn run_loop<F: Factory>(
    task: Task,
    period: Duration,
    shared: Weak<Shared<F>>,
    cancel: CancellationToken,
) {
    // A period past the end of the clock never ticks.
    let Some(first_tick) = Instant::now().checked_add(period) else {
        cancel.cancelled().await;
        tracing::debug!(task = task.name(), "maintenance loop stopped");
        return;
    };
    let mut ticker = tokio::time::interval_at(first_tick, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let Some(shared) = shared.upgrade() else {
            break;
        };
        if shared.is_closed() {
            break;
        }

        let affected = task.run(&shared).await;
        if affected > 0 {
            tracing::trace!(task = task.name(), affected, "maintenance tick");
        }
    }

    tracing::debug!(task = task.name(), "maintenance loop stopped");
}
