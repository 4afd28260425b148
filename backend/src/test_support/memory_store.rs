//! In-process donor store for handler, service and behaviour tests.
//!
//! Holds all state behind one mutex, so `increment_stats` and
//! `recount_stats` are atomic with respect to concurrent callers in the same
//! way the storage-side statements are for the real adapters.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::{Clock, DefaultClock};

use crate::domain::ports::{DonorStore, DonorStoreError, StorageBackend};
use crate::domain::{DonationStats, Donor, DonorId, DonorListLimit, DonorSummary, NewDonor};

#[derive(Debug, Default)]
struct MemoryState {
    donors: Vec<Donor>,
    stats: Option<DonationStats>,
    closed: bool,
    fail_increments: Option<DonorStoreError>,
    fail_all: Option<DonorStoreError>,
}

/// Donor store kept entirely in memory.
pub struct InMemoryDonorStore {
    state: Mutex<MemoryState>,
    clock: Arc<dyn Clock>,
}

impl Default for InMemoryDonorStore {
    fn default() -> Self {
        Self::new(Arc::new(DefaultClock))
    }
}

impl InMemoryDonorStore {
    /// Empty store stamping records with `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(MemoryState::default()),
            clock,
        }
    }

    /// Overwrite the stored total to simulate drift.
    pub fn set_total(&self, total: u64) {
        let mut state = self.lock();
        let last_updated = state.stats.and_then(|stats| stats.last_updated);
        state.stats = Some(DonationStats {
            total_blood_units: total,
            last_updated,
        });
    }

    /// Make every later `increment_stats` call fail with `error`.
    pub fn fail_increments(&self, error: Option<DonorStoreError>) {
        self.lock().fail_increments = error;
    }

    /// Make every later data operation fail with `error`.
    pub fn fail_all(&self, error: Option<DonorStoreError>) {
        self.lock().fail_all = error;
    }

    /// Number of stored donor records.
    pub fn donor_count(&self) -> usize {
        self.lock().donors.len()
    }

    /// Stored donor records in insertion order.
    pub fn donors(&self) -> Vec<Donor> {
        self.lock().donors.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn usable(&self) -> Result<MutexGuard<'_, MemoryState>, DonorStoreError> {
        let state = self.lock();
        if state.closed {
            return Err(DonorStoreError::connection("in-memory store has been shut down"));
        }
        if let Some(error) = state.fail_all.clone() {
            return Err(error);
        }
        Ok(state)
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.utc()
    }
}

#[async_trait]
impl DonorStore for InMemoryDonorStore {
    async fn initialize(&self) -> Result<(), DonorStoreError> {
        let mut state = self.usable()?;
        state.stats.get_or_insert_with(DonationStats::default);
        Ok(())
    }

    async fn insert_donor(&self, donor: &NewDonor) -> Result<Donor, DonorStoreError> {
        let stored = Donor::new(DonorId::random(), donor.clone(), self.now());
        self.usable()?.donors.push(stored.clone());
        Ok(stored)
    }

    async fn get_stats(&self) -> Result<DonationStats, DonorStoreError> {
        Ok(self.usable()?.stats.unwrap_or_default())
    }

    async fn increment_stats(&self) -> Result<u64, DonorStoreError> {
        let now = self.now();
        let mut state = self.usable()?;
        if let Some(error) = state.fail_increments.clone() {
            return Err(error);
        }
        let stats = state.stats.get_or_insert_with(DonationStats::default);
        stats.total_blood_units += 1;
        stats.last_updated = Some(now);
        Ok(stats.total_blood_units)
    }

    async fn recount_stats(&self) -> Result<u64, DonorStoreError> {
        let now = self.now();
        let mut state = self.usable()?;
        let total = state.donors.len() as u64;
        state.stats = Some(DonationStats {
            total_blood_units: total,
            last_updated: Some(now),
        });
        Ok(total)
    }

    async fn list_donors(
        &self,
        limit: DonorListLimit,
    ) -> Result<Vec<DonorSummary>, DonorStoreError> {
        let state = self.usable()?;
        let mut newest_first: Vec<&Donor> = state.donors.iter().rev().collect();
        // Stable sort keeps later insertions first among equal timestamps.
        newest_first.sort_by(|a, b| b.donated_at().cmp(&a.donated_at()));
        Ok(newest_first
            .into_iter()
            .take(limit.get())
            .map(Donor::summary)
            .collect())
    }

    async fn ping(&self) -> Result<(), DonorStoreError> {
        self.usable().map(|_| ())
    }

    async fn shutdown(&self) {
        self.lock().closed = true;
    }

    fn backend(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}
