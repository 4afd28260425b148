//! Redis donor store.
//!
//! The document variant of the [`DonorStore`](crate::domain::ports::DonorStore)
//! port. Donors are JSON documents in a sorted set scored by donation time;
//! the aggregate is a hash updated with `MULTI`/`EXEC` and recounted by a
//! server-side script.
//!
//! # Example
//!
//! ```ignore
//! use donor_drive::outbound::PoolConfig;
//! use donor_drive::outbound::document::{RedisDonorStore, RedisPool};
//!
//! let pool = RedisPool::new(&PoolConfig::new("redis://127.0.0.1:6379")).await?;
//! let store = RedisDonorStore::new(pool, Arc::new(DefaultClock), "donor-drive");
//! store.initialize().await?;
//! ```

mod pool;
mod redis_donor_store;

pub use pool::{RedisConnection, RedisPool};
pub use redis_donor_store::{DEFAULT_NAMESPACE, RedisDonorStore};
