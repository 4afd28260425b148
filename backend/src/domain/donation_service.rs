//! Donation domain service.
//!
//! Implements every driving port on top of a single [`DonorStore`]. The
//! submit flow is validate, insert, then increment: two storage calls with
//! no transaction between them. If the increment fails after the insert
//! succeeded, the aggregate under-counts until the next recount.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::ports::{
    DonationCommand, DonationQuery, DonationReceipt, DonorStore, DonorStoreError,
    StatsReconciliation, StorageProbe, StorageStatus,
};
use crate::domain::{DonationStats, DonationSubmission, DonorListLimit, DonorSummary, Error};

/// Client-facing message for storage outages.
pub const STORAGE_UNAVAILABLE_MESSAGE: &str = "Storage is currently unavailable";
/// Client-facing message for unexpected storage failures.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

fn map_store_error(error: DonorStoreError) -> Error {
    match error {
        DonorStoreError::Connection { message } => {
            Error::service_unavailable(STORAGE_UNAVAILABLE_MESSAGE)
                .with_diagnostic(format!("donor store unavailable: {message}"))
        }
        DonorStoreError::Query { message } => Error::internal(INTERNAL_ERROR_MESSAGE)
            .with_diagnostic(format!("donor store error: {message}")),
    }
}

/// Donation service implementing the command, query, reconciliation and
/// probe ports.
pub struct DonationService<S: ?Sized> {
    store: Arc<S>,
}

impl<S: ?Sized> Clone for DonationService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: ?Sized> DonationService<S> {
    /// Create a service over the given store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S> DonationCommand for DonationService<S>
where
    S: DonorStore + ?Sized,
{
    async fn submit_donation(
        &self,
        submission: DonationSubmission,
    ) -> Result<DonationReceipt, Error> {
        let new_donor = submission.validate()?;

        let donor = self
            .store
            .insert_donor(&new_donor)
            .await
            .map_err(map_store_error)?;

        let total_units = match self.store.increment_stats().await {
            Ok(total) => total,
            Err(error) => {
                warn!(
                    donor_id = %donor.id(),
                    %error,
                    "donor stored but aggregate not incremented; run a recount"
                );
                return Err(map_store_error(error));
            }
        };

        if donor.age().exceeds_client_ceiling() {
            info!(
                donor_id = %donor.id(),
                age = donor.age().years(),
                "accepted donor above the registration form age ceiling"
            );
        }
        info!(donor_id = %donor.id(), total = total_units, "donation recorded");

        Ok(DonationReceipt { donor, total_units })
    }
}

#[async_trait]
impl<S> DonationQuery for DonationService<S>
where
    S: DonorStore + ?Sized,
{
    async fn stats(&self) -> Result<DonationStats, Error> {
        self.store.get_stats().await.map_err(map_store_error)
    }

    async fn recent_donors(&self, limit: DonorListLimit) -> Result<Vec<DonorSummary>, Error> {
        self.store.list_donors(limit).await.map_err(map_store_error)
    }
}

#[async_trait]
impl<S> StatsReconciliation for DonationService<S>
where
    S: DonorStore + ?Sized,
{
    async fn recount(&self) -> Result<u64, Error> {
        let total = self
            .store
            .recount_stats()
            .await
            .map_err(map_store_error)?;
        info!(total, backend = %self.store.backend(), "aggregate recounted");
        Ok(total)
    }
}

#[async_trait]
impl<S> StorageProbe for DonationService<S>
where
    S: DonorStore + ?Sized,
{
    async fn storage_status(&self) -> StorageStatus {
        let backend = self.store.backend();
        match self.store.ping().await {
            Ok(()) => StorageStatus {
                backend,
                connected: true,
                error: None,
            },
            Err(error) => StorageStatus {
                backend,
                connected: false,
                error: Some(error.to_string()),
            },
        }
    }
}

#[cfg(test)]
#[path = "donation_service_tests.rs"]
mod tests;
