//! Pool configuration types

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Configuration for a resource pool.
///
/// Every required value must be supplied; nothing is defaulted internally.
/// Durations accept human-readable strings when deserialized (`"100ms"`,
/// `"10m"`). A duration too large to add to the current instant, such as
/// `Duration::MAX`, means "never": `acquire` waits without a deadline and a
/// maintenance loop with that period never ticks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PoolConfig {
    /// Number of resources the pool keeps alive (and buffer capacity)
    pub max_connections: usize,
    /// How long `acquire` waits for a resource before failing
    #[serde(with = "humantime_serde")]
    pub acquire_timeout: Duration,
    /// Time since the last hand-out after which an idle resource is closed
    #[serde(with = "humantime_serde")]
    pub max_idle_time: Duration,
    /// Period of the health-check sweep
    #[serde(with = "humantime_serde")]
    pub health_check_interval: Duration,
    /// Period of the idle-reclamation sweep
    #[serde(with = "humantime_serde")]
    pub cleanup_interval: Duration,
    /// Period of the replenishment task; falls back to `health_check_interval`
    #[serde(default, with = "humantime_serde")]
    pub replenish_interval: Option<Duration>,
    /// Tolerate creation failures during the initial fill
    #[serde(default)]
    pub lazy_fill: bool,
}

impl PoolConfig {
    /// Create a configuration from the five required values.
    #[must_use]
    pub fn new(
        max_connections: usize,
        acquire_timeout: Duration,
        max_idle_time: Duration,
        health_check_interval: Duration,
        cleanup_interval: Duration,
    ) -> Self {
        Self {
            max_connections,
            acquire_timeout,
            max_idle_time,
            health_check_interval,
            cleanup_interval,
            replenish_interval: None,
            lazy_fill: false,
        }
    }

    /// Run replenishment on its own period instead of the health-check one.
    #[must_use]
    pub fn with_replenish_interval(mut self, interval: Duration) -> Self {
        self.replenish_interval = Some(interval);
        self
    }

    /// Let construction succeed even if the factory cannot fill the pool.
    #[must_use]
    pub fn with_lazy_fill(mut self, lazy_fill: bool) -> Self {
        self.lazy_fill = lazy_fill;
        self
    }

    /// Effective replenishment period.
    #[must_use]
    pub fn replenish_period(&self) -> Duration {
        self.replenish_interval.unwrap_or(self.health_check_interval)
    }

    /// Validate pool configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.max_connections == 0 {
            return Err(Error::configuration(
                "max_connections must be greater than 0",
            ));
        }
        let durations = [
            ("acquire_timeout", Some(self.acquire_timeout)),
            ("max_idle_time", Some(self.max_idle_time)),
            ("health_check_interval", Some(self.health_check_interval)),
            ("cleanup_interval", Some(self.cleanup_interval)),
            ("replenish_interval", self.replenish_interval),
        ];
        for (name, value) in durations {
            if value.is_some_and(|d| d.is_zero()) {
                return Err(Error::configuration(format!(
                    "{name} must be greater than zero"
                )));
            }
        }
        Ok(())
    }
}
