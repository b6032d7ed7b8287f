//! Ready-made [`Factory`](reservoir_pool::Factory) implementations.
//!
//! Each backend sits behind a cargo feature:
//!
//! - `mysql`: [`MySqlFactory`](crate::mysql::MySqlFactory), one `sqlx::MySqlConnection` per slot.
//! - `redis`: [`RedisFactory`](crate::redis::RedisFactory), one multiplexed connection per slot.
//! - `etcd`: [`EtcdFactory`](crate::etcd::EtcdFactory), one etcd client per slot.

#[cfg(feature = "etcd")]
pub mod etcd;
#[cfg(feature = "mysql")]
pub mod mysql;
#[cfg(feature = "redis")]
pub mod redis;

#[cfg(feature = "etcd")]
pub use crate::etcd::EtcdFactory;
#[cfg(feature = "mysql")]
pub use crate::mysql::MySqlFactory;
#[cfg(feature = "redis")]
pub use crate::redis::RedisFactory;
