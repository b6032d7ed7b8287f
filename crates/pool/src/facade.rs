//! Uniform get/release/close contract over pool implementations.

use std::future::Future;
use std::sync::Arc;

use crate::error::Result;
use crate::factory::Factory;
use crate::pool::{Pool, Pooled};

/// Anything that hands out connections and takes them back.
pub trait ConnectionPool: Send + Sync + 'static {
    /// Handle given to callers.
    type Connection: Send;

    /// Obtain a connection, waiting as long as the implementation allows.
    fn get_connection(&self) -> impl Future<Output = Result<Self::Connection>> + Send;

    /// Give a connection back.
    fn release_connection(
        &self,
        conn: Self::Connection,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Shut the pool down.
    fn close(&self) -> impl Future<Output = ()> + Send;
}

impl<F: Factory> ConnectionPool for Pool<F> {
    type Connection = Pooled<F>;

    async fn get_connection(&self) -> Result<Pooled<F>> {
        self.acquire().await
    }

    async fn release_connection(&self, conn: Pooled<F>) -> Result<()> {
        self.release(conn).await
    }

    async fn close(&self) {
        Pool::close(self).await;
    }
}

/// Thin wrapper over a [`ConnectionPool`].
///
/// [`PoolFacade::new`] forwards every call as-is. [`PoolFacade::serialized`]
/// runs each call under one outer async lock, so at most one get, release or
/// close is in flight at a time. In that mode a `get_connection` waiting on
/// an empty pool holds the lock until it is served or times out, and
/// releases queue behind it.
#[derive(Debug)]
pub struct PoolFacade<P> {
    pool: Arc<P>,
    serial: Option<Arc<tokio::sync::Mutex<()>>>,
}

impl<P> Clone for PoolFacade<P> {
    fn clone(&self) -> Self {
        Self {
            pool: Arc::clone(&self.pool),
            serial: self.serial.clone(),
        }
    }
}

impl<P: ConnectionPool> PoolFacade<P> {
    /// Forward calls without an outer lock.
    #[must_use]
    pub fn new(pool: P) -> Self {
        Self {
            pool: Arc::new(pool),
            serial: None,
        }
    }

    /// Serialize every call through one outer lock.
    #[must_use]
    pub fn serialized(pool: P) -> Self {
        Self {
            pool: Arc::new(pool),
            serial: Some(Arc::new(tokio::sync::Mutex::new(()))),
        }
    }

    /// Whether calls go through the outer lock.
    #[must_use]
    pub fn is_serialized(&self) -> bool {
        self.serial.is_some()
    }

    /// The wrapped pool.
    #[must_use]
    pub fn inner(&self) -> &P {
        &self.pool
    }

    /// Obtain a connection.
    ///
    /// # Errors
    /// Whatever the wrapped pool returns.
    pub async fn get_connection(&self) -> Result<P::Connection> {
        let _guard = self.lock().await;
        self.pool.get_connection().await
    }

    /// Give a connection back.
    ///
    /// # Errors
    /// Whatever the wrapped pool returns.
    pub async fn release_connection(&self, conn: P::Connection) -> Result<()> {
        let _guard = self.lock().await;
        self.pool.release_connection(conn).await
    }

    /// Shut the wrapped pool down.
    pub async fn close(&self) {
        let _guard = self.lock().await;
        self.pool.close().await;
    }

    async fn lock(&self) -> Option<tokio::sync::MutexGuard<'_, ()>> {
        match &self.serial {
            Some(mutex) => Some(mutex.lock().await),
            None => None,
        }
    }
}
