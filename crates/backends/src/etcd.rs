//! etcd factory: one gRPC client per pool slot.

use std::time::Duration;

use etcd_client::{Client, ConnectOptions};
use reservoir_pool::{Error, Factory, Result};

const ID: &str = "etcd";

/// Default bound on dialing and on the `Status` round trip.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Connects a fresh [`Client`] for every slot, so no two slots share a
/// channel.
///
/// A new client is confirmed with a `Status` call before it is handed to the
/// pool; the health check repeats that call.
#[derive(Debug, Clone)]
pub struct EtcdFactory {
    endpoints: Vec<String>,
    timeout: Duration,
}

impl EtcdFactory {
    /// Build a factory for the given endpoints (`http://host:2379`).
    ///
    /// # Errors
    /// `Configuration` if no endpoint is given or one is blank.
    pub fn new<I, S>(endpoints: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let endpoints: Vec<String> = endpoints.into_iter().map(Into::into).collect();
        if endpoints.is_empty() {
            return Err(Error::configuration("etcd needs at least one endpoint"));
        }
        if endpoints.iter().any(|e| e.trim().is_empty()) {
            return Err(Error::configuration("etcd endpoint cannot be empty"));
        }
        Ok(Self {
            endpoints,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Bound connect and status calls by `timeout` instead of the default.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Endpoints every client dials.
    #[must_use]
    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    fn options(&self) -> ConnectOptions {
        ConnectOptions::new()
            .with_connect_timeout(self.timeout)
            .with_timeout(self.timeout)
    }

    async fn status(&self, client: &mut Client) -> Result<()> {
        match tokio::time::timeout(self.timeout, client.status()).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(Error::factory_with_source(ID, e)),
            Err(_) => Err(Error::factory(
                ID,
                format!("no status reply within {:?}", self.timeout),
            )),
        }
    }
}

impl Factory for EtcdFactory {
    type Resource = Client;

    fn id(&self) -> &str {
        ID
    }

    async fn create(&self) -> Result<Client> {
        let connect = Client::connect(&self.endpoints, Some(self.options()));
        let mut client = match tokio::time::timeout(self.timeout, connect).await {
            Ok(Ok(client)) => client,
            Ok(Err(e)) => return Err(Error::factory_with_source(ID, e)),
            Err(_) => {
                return Err(Error::factory(
                    ID,
                    format!("connect timed out after {:?}", self.timeout),
                ));
            }
        };
        self.status(&mut client).await?;
        Ok(client)
    }

    async fn health_check(&self, client: &mut Client) -> bool {
        match self.status(client).await {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(error = %e, "etcd status failed");
                false
            }
        }
    }
}
