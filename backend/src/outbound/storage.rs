//! Donor store selection and start-up.
//!
//! One connection URL picks the backend by scheme. Any failure to build a
//! pool or initialise the schema is logged and replaced with an
//! [`UnavailableDonorStore`], so the process still serves its health
//! endpoints while data endpoints answer 503.

use std::sync::Arc;
use std::time::Duration;

use mockable::Clock;
use tracing::{error, info, warn};
use url::Url;

use crate::domain::ports::{DonorStore, StorageBackend, UnavailableDonorStore};

use super::document::{DEFAULT_NAMESPACE, RedisDonorStore, RedisPool};
use super::persistence::{DbPool, DieselDonorStore};
use super::pool::PoolConfig;

const REDIS_CONNECTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Reason reported when no connection URL is configured.
pub const NOT_CONFIGURED_REASON: &str = "no database URL configured";

/// Inputs needed to open the donor store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageSettings {
    /// Connection URL; `None` selects degraded mode.
    pub url: Option<String>,
    /// Key prefix for the Redis backend.
    pub redis_namespace: String,
}

impl StorageSettings {
    /// Settings for `url` with the default Redis namespace.
    pub fn new(url: Option<String>) -> Self {
        Self {
            url,
            redis_namespace: DEFAULT_NAMESPACE.to_owned(),
        }
    }

    /// Override the Redis key prefix.
    #[must_use]
    pub fn with_redis_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.redis_namespace = namespace.into();
        self
    }
}

/// Decide which backend a connection URL refers to.
///
/// # Errors
///
/// Returns a human-readable reason when the URL is absent, malformed or uses
/// an unsupported scheme.
///
/// # Examples
/// ```
/// use donor_drive::domain::ports::StorageBackend;
/// use donor_drive::outbound::storage::backend_for_url;
///
/// assert_eq!(
///     backend_for_url(Some("postgresql://localhost/donors")),
///     Ok(StorageBackend::Postgres)
/// );
/// assert!(backend_for_url(Some("mysql://localhost/donors")).is_err());
/// ```
pub fn backend_for_url(url: Option<&str>) -> Result<StorageBackend, String> {
    let raw = url
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| NOT_CONFIGURED_REASON.to_owned())?;
    let parsed = Url::parse(raw).map_err(|err| format!("invalid database URL: {err}"))?;
    match parsed.scheme() {
        "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
        "redis" | "rediss" => Ok(StorageBackend::Redis),
        other => Err(format!("unsupported database URL scheme `{other}`")),
    }
}

fn unavailable(reason: String) -> Arc<dyn DonorStore> {
    Arc::new(UnavailableDonorStore::new(reason))
}

/// Open, initialise and return the configured donor store.
///
/// Never fails: on any error the unavailable store is returned carrying the
/// reason, and the failure is logged.
pub async fn connect_donor_store(
    settings: &StorageSettings,
    clock: Arc<dyn Clock>,
) -> Arc<dyn DonorStore> {
    let backend = match backend_for_url(settings.url.as_deref()) {
        Ok(backend) => backend,
        Err(reason) => {
            warn!(reason = %reason, "donor store not configured; running degraded");
            return unavailable(reason);
        }
    };
    // Checked by `backend_for_url`.
    let url = settings.url.as_deref().map(str::trim).unwrap_or_default();

    let store: Arc<dyn DonorStore> = match backend {
        StorageBackend::Postgres => match DbPool::new(&PoolConfig::new(url)).await {
            Ok(pool) => Arc::new(DieselDonorStore::new(pool, clock)),
            Err(err) => {
                error!(backend = %backend, error = %err, "failed to build donor store pool");
                return unavailable(err.to_string());
            }
        },
        StorageBackend::Redis => {
            let config = PoolConfig::new(url).with_connection_timeout(REDIS_CONNECTION_TIMEOUT);
            match RedisPool::new(&config).await {
                Ok(pool) => Arc::new(RedisDonorStore::new(
                    pool,
                    clock,
                    &settings.redis_namespace,
                )),
                Err(err) => {
                    error!(backend = %backend, error = %err, "failed to build donor store pool");
                    return unavailable(err.to_string());
                }
            }
        }
        StorageBackend::Memory | StorageBackend::Unavailable => {
            return unavailable(format!("backend `{backend}` cannot be opened from a URL"));
        }
    };

    if let Err(err) = store.initialize().await {
        error!(backend = %backend, error = %err, "failed to initialise donor store");
        store.shutdown().await;
        return unavailable(err.to_string());
    }
    info!(backend = %backend, "donor store ready");
    store
}
