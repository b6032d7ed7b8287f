//! Redis factory over multiplexed async connections.

use ::redis::Client;
use ::redis::aio::MultiplexedConnection;
use reservoir_pool::{Error, Factory, Result};

const ID: &str = "redis";

/// Opens one multiplexed connection per pool slot from a shared client.
#[derive(Debug, Clone)]
pub struct RedisFactory {
    client: Client,
}

impl RedisFactory {
    /// Build a factory from a connection URL (`redis://host:port/db`).
    ///
    /// # Errors
    /// `Configuration` if the URL is empty, uses another scheme, or does
    /// not parse.
    pub fn new(url: &str) -> Result<Self> {
        if url.is_empty() {
            return Err(Error::configuration("Redis URL cannot be empty"));
        }
        if !url.starts_with("redis://") && !url.starts_with("rediss://") {
            return Err(Error::configuration(
                "Redis URL must start with redis:// or rediss://",
            ));
        }
        let client = Client::open(url)
            .map_err(|e| Error::configuration(format!("invalid Redis URL: {e}")))?;
        Ok(Self { client })
    }
}

impl Factory for RedisFactory {
    type Resource = MultiplexedConnection;

    fn id(&self) -> &str {
        ID
    }

    async fn create(&self) -> Result<MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| Error::factory_with_source(ID, e))
    }

    async fn health_check(&self, conn: &mut MultiplexedConnection) -> bool {
        match ::redis::cmd("PING").query_async::<String>(conn).await {
            Ok(reply) => reply == "PONG",
            Err(e) => {
                tracing::debug!(error = %e, "redis ping failed");
                false
            }
        }
    }
}
