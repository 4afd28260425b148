//! Driving port for the administrative recount.

use async_trait::async_trait;

use crate::domain::Error;

/// Rebuilds the aggregate from the donor log.
///
/// Performs a full count; callers invoke it deliberately after drift is
/// suspected rather than on every request.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatsReconciliation: Send + Sync {
    /// Recount donors and return the corrected total.
    async fn recount(&self) -> Result<u64, Error>;
}
