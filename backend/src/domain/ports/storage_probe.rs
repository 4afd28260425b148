//! Driving port reporting storage connectivity for health endpoints.

use async_trait::async_trait;

use super::StorageBackend;

/// Connectivity snapshot of the active donor store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageStatus {
    /// Backend in use.
    pub backend: StorageBackend,
    /// Whether the last ping succeeded.
    pub connected: bool,
    /// Failure reason when not connected.
    pub error: Option<String>,
}

/// Reports whether the donor store is reachable.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StorageProbe: Send + Sync {
    /// Ping the store. Never fails; failures are folded into the status.
    async fn storage_status(&self) -> StorageStatus;
}
