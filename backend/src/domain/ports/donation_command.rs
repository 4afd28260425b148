//! Driving port for recording donations.

use async_trait::async_trait;

use crate::domain::{DonationSubmission, Donor, Error};

/// Outcome of a successful donation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DonationReceipt {
    /// Stored donor record.
    pub donor: Donor,
    /// Aggregate total after this donation was counted.
    pub total_units: u64,
}

/// Use-case port for submitting a donation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DonationCommand: Send + Sync {
    /// Validate, store and count a submission.
    async fn submit_donation(
        &self,
        submission: DonationSubmission,
    ) -> Result<DonationReceipt, Error>;
}
