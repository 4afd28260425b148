//! Port for donor persistence and the donation aggregate.
//!
//! One trait covers both the append-only donor log and the `global`
//! aggregate so a single backend owns the consistency story. Adapters must
//! implement [`DonorStore::increment_stats`] as one storage-side atomic
//! operation; callers never read-modify-write the total.

use std::fmt;

use async_trait::async_trait;

use crate::domain::{DonationStats, Donor, DonorListLimit, DonorSummary, NewDonor};

use super::define_port_error;

define_port_error! {
    /// Errors raised by donor store adapters.
    pub enum DonorStoreError {
        /// The store is not configured, unreachable or already shut down.
        Connection { message: String } =>
            "donor store connection failed: {message}",
        /// A statement or command failed, or stored data could not be decoded.
        Query { message: String } =>
            "donor store query failed: {message}",
    }
}

/// Storage technology behind a [`DonorStore`], for diagnostics only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// Relational store (PostgreSQL).
    Postgres,
    /// Document store (Redis).
    Redis,
    /// In-process store used by tests.
    Memory,
    /// No usable backend.
    Unavailable,
}

impl StorageBackend {
    /// Lower-case backend label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Redis => "redis",
            Self::Memory => "memory",
            Self::Unavailable => "unavailable",
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persistence capability for donors and the donation aggregate.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DonorStore: Send + Sync {
    /// Create tables or keys if absent and seed the aggregate with zero.
    ///
    /// Idempotent; must never reset an existing total.
    async fn initialize(&self) -> Result<(), DonorStoreError>;

    /// Persist a donor with a server-assigned identity and timestamp.
    async fn insert_donor(&self, donor: &NewDonor) -> Result<Donor, DonorStoreError>;

    /// Read the aggregate, defaulting to zero with no timestamp.
    async fn get_stats(&self) -> Result<DonationStats, DonorStoreError>;

    /// Atomically add one unit to the aggregate and return the new total.
    async fn increment_stats(&self) -> Result<u64, DonorStoreError>;

    /// Overwrite the aggregate with the exact donor count and return it.
    async fn recount_stats(&self) -> Result<u64, DonorStoreError>;

    /// Newest donors first, truncated to `limit`.
    async fn list_donors(
        &self,
        limit: DonorListLimit,
    ) -> Result<Vec<DonorSummary>, DonorStoreError>;

    /// Cheap round trip proving the backend is reachable.
    async fn ping(&self) -> Result<(), DonorStoreError>;

    /// Release pooled connections. Best effort: failures are logged only.
    async fn shutdown(&self);

    /// Backend label for diagnostics.
    fn backend(&self) -> StorageBackend;
}

/// Store installed when no backend is configured or startup failed.
///
/// Every data operation reports [`DonorStoreError::Connection`] with the
/// recorded reason, so the process keeps serving health endpoints.
#[derive(Debug, Clone)]
pub struct UnavailableDonorStore {
    reason: String,
}

impl UnavailableDonorStore {
    /// Record why no backend is available.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// Reason recorded at startup.
    pub fn reason(&self) -> &str {
        self.reason.as_str()
    }

    fn error(&self) -> DonorStoreError {
        DonorStoreError::connection(self.reason.clone())
    }
}

#[async_trait]
impl DonorStore for UnavailableDonorStore {
    async fn initialize(&self) -> Result<(), DonorStoreError> {
        Err(self.error())
    }

    async fn insert_donor(&self, _donor: &NewDonor) -> Result<Donor, DonorStoreError> {
        Err(self.error())
    }

    async fn get_stats(&self) -> Result<DonationStats, DonorStoreError> {
        Err(self.error())
    }

    async fn increment_stats(&self) -> Result<u64, DonorStoreError> {
        Err(self.error())
    }

    async fn recount_stats(&self) -> Result<u64, DonorStoreError> {
        Err(self.error())
    }

    async fn list_donors(
        &self,
        _limit: DonorListLimit,
    ) -> Result<Vec<DonorSummary>, DonorStoreError> {
        Err(self.error())
    }

    async fn ping(&self) -> Result<(), DonorStoreError> {
        Err(self.error())
    }

    async fn shutdown(&self) {}

    fn backend(&self) -> StorageBackend {
        StorageBackend::Unavailable
    }
}
