//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod donation_command;
mod donation_query;
mod donor_store;
mod stats_reconciliation;
mod storage_probe;

#[cfg(test)]
pub use donation_command::MockDonationCommand;
pub use donation_command::{DonationCommand, DonationReceipt};
#[cfg(test)]
pub use donation_query::MockDonationQuery;
pub use donation_query::DonationQuery;
#[cfg(test)]
pub use donor_store::MockDonorStore;
pub use donor_store::{DonorStore, DonorStoreError, StorageBackend, UnavailableDonorStore};
#[cfg(test)]
pub use stats_reconciliation::MockStatsReconciliation;
pub use stats_reconciliation::StatsReconciliation;
#[cfg(test)]
pub use storage_probe::MockStorageProbe;
pub use storage_probe::{StorageProbe, StorageStatus};
