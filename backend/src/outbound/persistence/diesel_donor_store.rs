//! PostgreSQL-backed donor store.
//!
//! The increment is a single `INSERT .. ON CONFLICT DO UPDATE` that adds one
//! to the stored total inside PostgreSQL, so concurrent donations never lose
//! updates. The recount is one `INSERT .. SELECT COUNT(*)` statement.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{Text, Timestamptz};
use diesel_async::{RunQueryDsl, SimpleAsyncConnection};
use mockable::Clock;
use tracing::{info, warn};

use crate::domain::ports::{DonorStore, DonorStoreError, StorageBackend};
use crate::domain::{
    DonationStats, Donor, DonorAge, DonorId, DonorListLimit, DonorName, DonorSummary,
    GLOBAL_STATS_KEY, NewDonor,
};

use super::ddl::{RECOUNT_SQL, SCHEMA_SQL};
use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{DonorRow, DonorSummaryRow, NewDonorRow, NewStatsRow, RecountRow, StatsRow};
use super::pool::DbPool;
use super::schema::{donation_stats, donors};

/// Diesel-backed implementation of the [`DonorStore`] port.
#[derive(Clone)]
pub struct DieselDonorStore {
    pool: DbPool,
    clock: Arc<dyn Clock>,
}

impl DieselDonorStore {
    /// Create a store over an existing pool.
    pub fn new(pool: DbPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }

    // PostgreSQL keeps microseconds; truncating up front keeps the returned
    // record identical to the stored one.
    fn now(&self) -> DateTime<Utc> {
        self.clock.utc().trunc_subsecs(6)
    }
}

fn corrupt(id: impl std::fmt::Display, detail: impl std::fmt::Display) -> DonorStoreError {
    DonorStoreError::query(format!("stored donor {id} is invalid: {detail}"))
}

fn donor_from_row(row: DonorRow) -> Result<Donor, DonorStoreError> {
    let DonorRow {
        id,
        full_name,
        blood_group,
        age,
        academic_year,
        donated_at,
    } = row;
    let new_donor = NewDonor {
        full_name: DonorName::new(&full_name).map_err(|err| corrupt(id, err))?,
        blood_group: blood_group.parse().map_err(|err| corrupt(id, err))?,
        age: DonorAge::new(i64::from(age)).map_err(|err| corrupt(id, err))?,
        academic_year: academic_year.parse().map_err(|err| corrupt(id, err))?,
    };
    Ok(Donor::new(DonorId::from_uuid(id), new_donor, donated_at))
}

fn summary_from_row(row: DonorSummaryRow) -> Result<DonorSummary, DonorStoreError> {
    let blood_group = row
        .blood_group
        .parse()
        .map_err(|err| corrupt(&row.full_name, err))?;
    Ok(DonorSummary {
        full_name: row.full_name,
        blood_group,
        donated_at: row.donated_at,
    })
}

fn total_from_i64(total: i64) -> Result<u64, DonorStoreError> {
    u64::try_from(total)
        .map_err(|_| DonorStoreError::query(format!("aggregate total is negative: {total}")))
}

#[async_trait]
impl DonorStore for DieselDonorStore {
    async fn initialize(&self) -> Result<(), DonorStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.batch_execute(SCHEMA_SQL)
            .await
            .map_err(|err| map_diesel_error(err, "initialize schema"))?;
        info!(backend = %StorageBackend::Postgres, "donor store initialised");
        Ok(())
    }

    async fn insert_donor(&self, donor: &NewDonor) -> Result<Donor, DonorStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let id = DonorId::random();
        let row = NewDonorRow {
            id: *id.as_uuid(),
            full_name: donor.full_name.as_ref(),
            blood_group: donor.blood_group.as_str(),
            age: i32::from(donor.age.years()),
            academic_year: donor.academic_year.as_str(),
            donated_at: self.now(),
        };

        let stored = diesel::insert_into(donors::table)
            .values(&row)
            .returning(DonorRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "insert donor"))?;
        donor_from_row(stored)
    }

    async fn get_stats(&self) -> Result<DonationStats, DonorStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = donation_stats::table
            .find(GLOBAL_STATS_KEY)
            .select(StatsRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "read stats"))?;

        match row {
            Some(row) => Ok(DonationStats {
                total_blood_units: total_from_i64(row.total_blood_units)?,
                last_updated: row.last_updated,
            }),
            None => Ok(DonationStats::default()),
        }
    }

    async fn increment_stats(&self) -> Result<u64, DonorStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let now = self.now();
        let seed = NewStatsRow {
            id: GLOBAL_STATS_KEY,
            total_blood_units: 1,
            last_updated: Some(now),
        };

        let total = diesel::insert_into(donation_stats::table)
            .values(&seed)
            .on_conflict(donation_stats::id)
            .do_update()
            .set((
                donation_stats::total_blood_units.eq(donation_stats::total_blood_units + 1),
                donation_stats::last_updated.eq(Some(now)),
            ))
            .returning(donation_stats::total_blood_units)
            .get_result::<i64>(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "increment stats"))?;
        total_from_i64(total)
    }

    async fn recount_stats(&self) -> Result<u64, DonorStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = sql_query(RECOUNT_SQL)
            .bind::<Text, _>(GLOBAL_STATS_KEY)
            .bind::<Timestamptz, _>(self.now())
            .get_result::<RecountRow>(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "recount stats"))?;
        total_from_i64(row.total_blood_units)
    }

    async fn list_donors(
        &self,
        limit: DonorListLimit,
    ) -> Result<Vec<DonorSummary>, DonorStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let limit = i64::try_from(limit.get()).unwrap_or(i64::MAX);
        let rows = donors::table
            .order((donors::donated_at.desc(), donors::seq.desc()))
            .limit(limit)
            .select(DonorSummaryRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "list donors"))?;

        rows.into_iter().map(summary_from_row).collect()
    }

    async fn ping(&self) -> Result<(), DonorStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        sql_query("SELECT 1")
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_diesel_error(err, "ping"))
    }

    async fn shutdown(&self) {
        if self.pool.close().await {
            info!(backend = %StorageBackend::Postgres, "donor store connection pool closed");
        } else {
            warn!(backend = %StorageBackend::Postgres, "donor store already shut down");
        }
    }

    fn backend(&self) -> StorageBackend {
        StorageBackend::Postgres
    }
}
