//! Async connection pool for Diesel PostgreSQL connections.
//!
//! Wraps `diesel-async` and `bb8`. The pool lives behind an async lock so
//! [`DbPool::close`] can drop it during shutdown; later checkouts report
//! [`PoolError::Closed`].

use std::sync::Arc;

use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};
use tokio::sync::RwLock;

use crate::outbound::pool::{PoolConfig, PoolError};

/// Checked-out PostgreSQL connection.
pub type PgConnection = PooledConnection<'static, AsyncPgConnection>;

/// Async connection pool for PostgreSQL via Diesel.
#[derive(Clone)]
pub struct DbPool {
    inner: Arc<RwLock<Option<Pool<AsyncPgConnection>>>>,
}

impl DbPool {
    /// Create a new connection pool with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::Build` if the pool cannot be constructed (e.g.
    /// invalid database URL or the idle connections cannot be opened).
    pub async fn new(config: &PoolConfig) -> Result<Self, PoolError> {
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(config.url());

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
    /// Returns `PoolError::Checkout` if a connection cannot be obtained within
    /// the configured timeout, or `PoolError::Closed` after [`DbPool::close`].
    pub async fn get(&self) -> Result<PgConnection, PoolError> {
        let pool = self.inner.read().await.clone().ok_or(PoolError::Closed)?;
        pool.get_owned()
            .await
            .map_err(|err| PoolError::checkout(err.to_string()))
    }

    /// Drop the pool, closing idle connections. Returns `false` when it was
    /// already closed.
    pub async fn close(&self) -> bool {
        self.inner.write().await.take().is_some()
    }
}
