//! # Reservoir Pool
//!
//! A generic, bounded pool of reusable resources (database connections,
//! cache clients, RPC channels).
//!
//! A [`Pool`] keeps up to `max_connections` resources produced by a
//! [`Factory`], hands them out under an acquire timeout, and runs three
//! background loops: idle reclamation, health checking and replenishment.
//! [`PoolFacade`] exposes the same pool through the uniform
//! [`ConnectionPool`] contract.

mod buffer;
mod maintenance;

pub mod config;
pub mod error;
pub mod events;
pub mod facade;
pub mod factory;
pub mod pool;
pub mod tracker;

pub use config::PoolConfig;
pub use error::{Error, Result};
pub use events::{EventBus, EvictionReason, PoolEvent};
pub use facade::{ConnectionPool, PoolFacade};
pub use factory::Factory;
pub use pool::{Pool, PoolStats, Pooled};
pub use tracker::{IdleTracker, ResourceId};
