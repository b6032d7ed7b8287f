//! Pool an in-memory "connection" type and watch the maintenance loops work.
//!
//! Run with `RUST_LOG=reservoir_pool=debug cargo run --example basic`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use reservoir_pool::{Factory, Pool, PoolConfig, PoolEvent, Result};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
struct Session {
    serial: u64,
    queries: u32,
}

struct SessionFactory {
    next: AtomicU64,
}

impl Factory for SessionFactory {
    type Resource = Session;

    fn id(&self) -> &str {
        "session"
    }

    async fn create(&self) -> Result<Session> {
        Ok(Session {
            serial: self.next.fetch_add(1, Ordering::Relaxed),
            queries: 0,
        })
    }

    async fn health_check(&self, session: &mut Session) -> bool {
        // Pretend sessions wear out after a few uses.
        session.queries < 3
    }

    async fn close(&self, session: Session) {
        tracing::info!(serial = session.serial, queries = session.queries, "session closed");
    }
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = PoolConfig::new(
        3,
        Duration::from_millis(200),
        Duration::from_millis(500),
        Duration::from_millis(100),
        Duration::from_millis(100),
    );
    let pool = Pool::new(SessionFactory { next: AtomicU64::new(0) }, config).await?;

    let mut events = pool.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            if let PoolEvent::Evicted { id, reason, .. } = event {
                tracing::info!(%id, ?reason, "evicted");
            }
        }
    });

    for _ in 0..10 {
        let mut session = pool.acquire().await?;
        session.queries += 1;
        tracing::info!(serial = session.serial, queries = session.queries, "query");
        pool.release(session).await?;
    }

    tokio::time::sleep(Duration::from_secs(1)).await;
    tracing::info!(stats = ?pool.stats(), "before close");

    pool.close().await;
    Ok(())
}
