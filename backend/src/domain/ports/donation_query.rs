//! Driving port for dashboard reads.

use async_trait::async_trait;

use crate::domain::{DonationStats, DonorListLimit, DonorSummary, Error};

/// Use-case port backing the live statistics dashboard.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DonationQuery: Send + Sync {
    /// Current aggregate as stored.
    async fn stats(&self) -> Result<DonationStats, Error>;

    /// Most recent donors, newest first.
    async fn recent_donors(&self, limit: DonorListLimit) -> Result<Vec<DonorSummary>, Error>;
}
