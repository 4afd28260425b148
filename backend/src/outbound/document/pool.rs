//! Pooled Redis connections via `bb8-redis`.
//!
//! Mirrors the relational pool: the `bb8` pool sits behind an async lock so
//! shutdown can drop it, after which checkouts fail with
//! [`PoolError::Closed`].

use std::sync::Arc;

use bb8_redis::RedisConnectionManager;
use bb8_redis::bb8::{Pool, PooledConnection};
use tokio::sync::RwLock;

use crate::outbound::pool::{PoolConfig, PoolError};

/// Checked-out Redis connection.
pub type RedisConnection = PooledConnection<'static, RedisConnectionManager>;

/// Async connection pool for Redis.
#[derive(Clone)]
pub struct RedisPool {
    inner: Arc<RwLock<Option<Pool<RedisConnectionManager>>>>,
}

impl RedisPool {
    /// Create a pool for the configured `redis://` or `rediss://` URL.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::Build` when the URL is malformed or the idle
    /// connections cannot be opened.
    pub async fn new(config: &PoolConfig) -> Result<Self, PoolError> {
        let manager = RedisConnectionManager::new(config.url())
            .map_err(|err| PoolError::build(err.to_string()))?;

        let pool = Pool::builder()
            .max_size(config.max_size())
            .min_idle(config.min_idle())
            .connection_timeout(config.connection_timeout())
            .build(manager)
            .await
            .map_err(|err| PoolError::build(err.to_string()))?;

        Ok(Self {
            inner: Arc::new(RwLock::new(Some(pool))),
        })
    }

    /// Get a connection from the pool.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::Checkout` on timeout or connection failure, or
    /// `PoolError::Closed` after [`RedisPool::close`].
    pub async fn get(&self) -> Result<RedisConnection, PoolError> {
        let pool = self.inner.read().await.clone().ok_or(PoolError::Closed)?;
        pool.get_owned()
            .await
            .map_err(|err| PoolError::checkout(err.to_string()))
    }

    /// Drop the pool. Returns `false` when it was already closed.
    pub async fn close(&self) -> bool {
        self.inner.write().await.take().is_some()
    }
}
