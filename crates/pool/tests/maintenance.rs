//! Idle reclamation, health checks and replenishment.

mod common;

use std::sync::atomic::Ordering;
use std::time::Duration;

use common::{MockFactory, quiet_config};
use reservoir_pool::{Error, EvictionReason, Pool, PoolConfig, PoolEvent};

fn idle_config(max_connections: usize) -> PoolConfig {
    PoolConfig::new(
        max_connections,
        Duration::from_millis(100),
        Duration::from_millis(100),
        Duration::from_secs(3600),
        Duration::from_millis(50),
    )
}

#[tokio::test(start_paused = true)]
async fn idle_resources_are_reclaimed_by_the_background_sweep() {
    let (factory, state) = MockFactory::new();
    let pool = Pool::new(factory, idle_config(2)).await.unwrap();

    let a = pool.acquire().await.unwrap();
    let b = pool.acquire().await.unwrap();
    pool.release(a).await.unwrap();
    pool.release(b).await.unwrap();

    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(pool.connection_count(), 0);
    assert_eq!(pool.stats().available, 0);
    assert_eq!(state.closed(), 2);

    // Later sweeps find nothing left to close.
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(state.closed(), 2);
    assert!(state.closed_exactly_once());
}

#[tokio::test(start_paused = true)]
async fn never_acquired_resources_are_not_reclaimed() {
    let (factory, state) = MockFactory::new();
    let pool = Pool::new(factory, idle_config(3)).await.unwrap();

    let conn = pool.acquire().await.unwrap();
    pool.release(conn).await.unwrap();

    tokio::time::sleep(Duration::from_millis(300)).await;

    assert_eq!(state.closed(), 1);
    assert_eq!(pool.connection_count(), 2);
    assert_eq!(pool.stats().available, 2);
}

#[tokio::test(start_paused = true)]
async fn checked_out_resources_survive_idle_sweeps() {
    let (factory, state) = MockFactory::new();
    let pool = Pool::new(factory, idle_config(1)).await.unwrap();

    let held = pool.acquire().await.unwrap();
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(state.closed(), 0);

    // Released long after the last hand-out, so the next sweep takes it.
    pool.release(held).await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(state.closed(), 1);
}

#[tokio::test(start_paused = true)]
async fn manual_reclaim_reports_evictions() {
    let (factory, _state) = MockFactory::new();
    let pool = Pool::new(factory, quiet_config(2)).await.unwrap();
    let mut events = pool.subscribe();

    let conn = pool.acquire().await.unwrap();
    let id = conn.id();
    pool.release(conn).await.unwrap();

    assert_eq!(pool.reclaim_idle().await, 0);
    tokio::time::advance(Duration::from_secs(601)).await;
    assert_eq!(pool.reclaim_idle().await, 1);
    assert_eq!(pool.connection_count(), 1);

    let evicted = loop {
        if let PoolEvent::Evicted { id, reason, .. } = events.recv().await.unwrap() {
            break (id, reason);
        }
    };
    assert_eq!(evicted, (id, EvictionReason::IdleTimeout));
}

#[tokio::test]
async fn failed_health_check_evicts_and_replenish_restores() {
    let (factory, state) = MockFactory::new();
    let pool = Pool::new(factory, quiet_config(2)).await.unwrap();

    let a = pool.acquire().await.unwrap();
    let b = pool.acquire().await.unwrap();
    state.mark_unhealthy(a.serial);
    pool.release(a).await.unwrap();
    pool.release(b).await.unwrap();

    assert_eq!(pool.check_health().await, 1);
    assert_eq!(pool.connection_count(), 1);
    assert_eq!(pool.stats().health_checks_failed, 1);
    assert_eq!(state.closed(), 1);

    assert_eq!(pool.replenish().await, 1);
    assert_eq!(pool.connection_count(), 2);
    assert_eq!(pool.stats().available, 2);
    assert_eq!(state.created(), 3);
}

#[tokio::test]
async fn health_check_skips_checked_out_and_untracked_resources() {
    let (factory, state) = MockFactory::new();
    let pool = Pool::new(factory, quiet_config(3)).await.unwrap();
    state.set_all_unhealthy(true);

    // Nothing has been handed out yet: nothing is tracked.
    assert_eq!(pool.check_health().await, 0);
    assert_eq!(state.health_checks.load(Ordering::SeqCst), 0);

    let held = pool.acquire().await.unwrap();
    let returned = pool.acquire().await.unwrap();
    pool.release(returned).await.unwrap();

    assert_eq!(pool.check_health().await, 1);
    assert_eq!(state.health_checks.load(Ordering::SeqCst), 1);

    // The caller's resource was left alone and still goes back fine.
    pool.release(held).await.unwrap();
    assert_eq!(pool.connection_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn background_health_check_evicts_unhealthy() {
    let (factory, state) = MockFactory::new();
    let config = PoolConfig::new(
        1,
        Duration::from_millis(100),
        Duration::from_secs(600),
        Duration::from_millis(100),
        Duration::from_secs(3600),
    )
    .with_replenish_interval(Duration::from_secs(3600));
    let pool = Pool::new(factory, config).await.unwrap();

    let conn = pool.acquire().await.unwrap();
    pool.release(conn).await.unwrap();
    state.set_all_unhealthy(true);

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(pool.connection_count(), 0);
    assert_eq!(state.closed(), 1);
}

#[tokio::test(start_paused = true)]
async fn slow_health_check_yields_to_a_waiting_caller() {
    let (factory, state) = MockFactory::new();
    let pool = Pool::new(factory, quiet_config(1)).await.unwrap();

    let conn = pool.acquire().await.unwrap();
    let id = conn.id();
    pool.release(conn).await.unwrap();
    state.set_health_latency(Duration::from_millis(500));

    let sweep = {
        let pool = pool.clone();
        tokio::spawn(async move { pool.check_health().await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(pool.stats().available, 0, "sweep holds the only resource");

    let start = tokio::time::Instant::now();
    let conn = pool.acquire().await.expect("healthy resource is handed out");
    assert_eq!(conn.id(), id);
    assert!(start.elapsed() < Duration::from_millis(100));

    assert_eq!(sweep.await.unwrap(), 0);
    assert_eq!(state.closed(), 0);
    assert_eq!(pool.stats().timeouts, 0);
    pool.release(conn).await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn slow_health_check_still_evicts_when_nobody_waits() {
    let (factory, state) = MockFactory::new();
    let pool = Pool::new(factory, quiet_config(1)).await.unwrap();

    let conn = pool.acquire().await.unwrap();
    pool.release(conn).await.unwrap();
    state.set_health_latency(Duration::from_millis(500));
    state.set_all_unhealthy(true);

    assert_eq!(pool.check_health().await, 1);
    assert_eq!(pool.connection_count(), 0);
    assert_eq!(state.closed(), 1);
}

#[tokio::test(start_paused = true)]
async fn background_replenish_restores_reclaimed_resources() {
    let (factory, state) = MockFactory::new();
    let config = PoolConfig::new(
        2,
        Duration::from_millis(100),
        Duration::from_millis(50),
        Duration::from_secs(3600),
        Duration::from_millis(10),
    )
    .with_replenish_interval(Duration::from_millis(100));
    let pool = Pool::new(factory, config).await.unwrap();

    let a = pool.acquire().await.unwrap();
    let b = pool.acquire().await.unwrap();
    pool.release(a).await.unwrap();
    pool.release(b).await.unwrap();

    // Reclaimed by the 60ms sweep, before the first replenish tick at 100ms.
    tokio::time::sleep(Duration::from_millis(70)).await;
    assert_eq!(pool.connection_count(), 0);
    assert_eq!(state.closed(), 2);

    tokio::time::sleep(Duration::from_millis(80)).await;
    assert_eq!(pool.connection_count(), 2);
    assert_eq!(pool.stats().available, 2);
    assert_eq!(state.created(), 4);

    // The replacements were never handed out, so later sweeps leave them be.
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(pool.connection_count(), 2);
    assert_eq!(state.created(), 4);
}

#[tokio::test(start_paused = true)]
async fn background_replenish_retries_until_the_factory_recovers() {
    let (factory, state) = MockFactory::new();
    let config = quiet_config(2).with_replenish_interval(Duration::from_millis(100));
    let pool = Pool::new(factory, config).await.unwrap();

    let _a = pool.acquire().await.unwrap().detach();
    let _b = pool.acquire().await.unwrap().detach();
    state.set_fail_create(true);

    // Ticks at 100, 200 and 300ms all fail.
    tokio::time::sleep(Duration::from_millis(350)).await;
    assert_eq!(pool.stats().replenish_failures, 3);
    assert_eq!(pool.connection_count(), 0);

    state.set_fail_create(false);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(pool.connection_count(), 2);
    assert_eq!(pool.stats().available, 2);
    assert_eq!(pool.stats().replenish_failures, 3);
}

#[tokio::test]
async fn unbounded_maintenance_periods_start_and_stop() {
    let (factory, state) = MockFactory::new();
    let config = PoolConfig::new(
        2,
        Duration::from_millis(100),
        Duration::MAX,
        Duration::MAX,
        Duration::MAX,
    );
    let pool = Pool::new(factory, config).await.unwrap();

    let conn = pool.acquire().await.unwrap();
    pool.release(conn).await.unwrap();
    assert_eq!(pool.reclaim_idle().await, 0);

    pool.close().await;
    assert!(pool.is_closed());
    assert_eq!(state.closed(), 2);
}

#[tokio::test]
async fn replenish_failure_rolls_back_the_reservation() {
    let (factory, state) = MockFactory::new();
    let pool = Pool::new(factory, quiet_config(2)).await.unwrap();
    let mut events = pool.subscribe();

    let _a = pool.acquire().await.unwrap().detach();
    let _b = pool.acquire().await.unwrap().detach();
    assert_eq!(pool.connection_count(), 0);

    state.set_fail_create(true);
    for _ in 0..3 {
        assert_eq!(pool.replenish().await, 0);
        assert_eq!(pool.connection_count(), 0);
    }
    assert_eq!(pool.stats().replenish_failures, 3);

    let failure = loop {
        if let PoolEvent::ReplenishFailed { deficit, .. } = events.recv().await.unwrap() {
            break deficit;
        }
    };
    assert_eq!(failure, 2);

    state.set_fail_create(false);
    assert_eq!(pool.replenish().await, 2);
    assert_eq!(pool.connection_count(), 2);
    assert_eq!(pool.stats().available, 2);
}

#[tokio::test]
async fn replenish_on_full_pool_is_a_no_op() {
    let (factory, state) = MockFactory::new();
    let pool = Pool::new(factory, quiet_config(2)).await.unwrap();
    assert_eq!(pool.replenish().await, 0);
    assert_eq!(state.created(), 2);
}

#[tokio::test]
async fn initial_fill_failure_closes_what_was_created() {
    let (factory, state) = MockFactory::new();
    state.fail_after.store(2, Ordering::SeqCst);

    let err = Pool::new(factory, quiet_config(4)).await.unwrap_err();
    assert!(matches!(err, Error::Factory { .. }));
    assert_eq!(state.created(), 2);
    assert_eq!(state.closed(), 2);
}

#[tokio::test]
async fn lazy_fill_tolerates_factory_failure() {
    let (factory, state) = MockFactory::new();
    state.set_fail_create(true);

    let pool = Pool::new(factory, quiet_config(3).with_lazy_fill(true))
        .await
        .expect("cold pool");
    assert_eq!(pool.connection_count(), 0);

    state.set_fail_create(false);
    assert_eq!(pool.replenish().await, 3);
    assert!(pool.acquire().await.is_ok());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn sweeps_racing_close_close_each_resource_once() {
    let (factory, state) = MockFactory::new();
    let config = PoolConfig::new(
        8,
        Duration::from_millis(100),
        Duration::from_millis(1),
        Duration::from_secs(3600),
        Duration::from_secs(3600),
    );
    let pool = Pool::new(factory, config).await.unwrap();

    let mut held = Vec::new();
    for _ in 0..8 {
        held.push(pool.acquire().await.unwrap());
    }
    for conn in held {
        pool.release(conn).await.unwrap();
    }
    state.mark_unhealthy(0);
    state.mark_unhealthy(3);
    tokio::time::sleep(Duration::from_millis(5)).await;

    let _ = tokio::join!(
        pool.reclaim_idle(),
        pool.check_health(),
        pool.close(),
        pool.replenish(),
    );

    assert!(pool.is_closed());
    assert_eq!(pool.stats().available, 0);
    assert_eq!(state.created(), state.closed());
    assert!(state.closed_exactly_once());
}
