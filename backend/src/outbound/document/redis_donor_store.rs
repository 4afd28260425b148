//! Redis-backed donor store.
//!
//! Layout under a configurable namespace:
//!
//! - `<ns>:donors`: sorted set of JSON donor documents scored by donation
//!   time in microseconds. `ZREVRANGE` yields the roster newest first.
//! - `<ns>:stats:global`: hash with `total_blood_units` and `last_updated`
//!   (RFC 3339).
//!
//! The increment is `HINCRBY` and `HSET` inside one `MULTI`/`EXEC`; the
//! recount is a server-side script so the count and the overwrite cannot
//! interleave with other writers.

use std::sync::Arc;

use async_trait::async_trait;
use bb8_redis::redis::{self, RedisError};
use chrono::{DateTime, SubsecRound, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::ports::{DonorStore, DonorStoreError, StorageBackend};
use crate::domain::{
    AcademicYear, BloodGroup, DonationStats, Donor, DonorAge, DonorId, DonorListLimit,
    DonorName, DonorSummary, GLOBAL_STATS_KEY, NewDonor,
};
use crate::outbound::pool::PoolError;

use super::pool::RedisPool;

/// Namespace used when none is configured.
pub const DEFAULT_NAMESPACE: &str = "donor-drive";

const TOTAL_FIELD: &str = "total_blood_units";
const UPDATED_FIELD: &str = "last_updated";

const RECOUNT_SCRIPT: &str = r"
local total = redis.call('ZCARD', KEYS[1])
redis.call('HSET', KEYS[2], 'total_blood_units', total, 'last_updated', ARGV[1])
return total
";

/// Stored donor document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DonorDocument {
    id: Uuid,
    full_name: String,
    blood_group: BloodGroup,
    age: u8,
    year: AcademicYear,
    donated_at: DateTime<Utc>,
}

impl From<&Donor> for DonorDocument {
    fn from(donor: &Donor) -> Self {
        Self {
            id: *donor.id().as_uuid(),
            full_name: donor.full_name().to_string(),
            blood_group: donor.blood_group(),
            age: donor.age().years(),
            year: donor.academic_year(),
            donated_at: donor.donated_at(),
        }
    }
}

impl DonorDocument {
    fn into_donor(self) -> Result<Donor, DonorStoreError> {
        let id = self.id;
        let corrupt = |detail: String| {
            DonorStoreError::query(format!("stored donor {id} is invalid: {detail}"))
        };
        let new_donor = NewDonor {
            full_name: DonorName::new(&self.full_name).map_err(|err| corrupt(err.to_string()))?,
            blood_group: self.blood_group,
            age: DonorAge::new(i64::from(self.age)).map_err(|err| corrupt(err.to_string()))?,
            academic_year: self.year,
        };
        Ok(Donor::new(DonorId::from_uuid(id), new_donor, self.donated_at))
    }
}

fn map_pool_error(error: PoolError) -> DonorStoreError {
    DonorStoreError::connection(error.to_string())
}

fn map_redis_error(error: RedisError, operation: &'static str) -> DonorStoreError {
    let message = format!("{operation}: {error}");
    if error.is_connection_refusal()
        || error.is_connection_dropped()
        || error.is_timeout()
        || error.is_io_error()
    {
        DonorStoreError::connection(message)
    } else {
        DonorStoreError::query(message)
    }
}

fn score_for(donated_at: DateTime<Utc>) -> f64 {
    // Microseconds since the epoch stay below 2^53 until the year 2255.
    donated_at.timestamp_micros() as f64
}

fn parse_last_updated(raw: Option<String>) -> Result<Option<DateTime<Utc>>, DonorStoreError> {
    raw.filter(|value| !value.is_empty())
        .map(|value| {
            DateTime::parse_from_rfc3339(&value)
                .map(|parsed| parsed.with_timezone(&Utc))
                .map_err(|err| {
                    DonorStoreError::query(format!("invalid {UPDATED_FIELD} value {value:?}: {err}"))
                })
        })
        .transpose()
}

/// Redis-backed implementation of the [`DonorStore`] port.
#[derive(Clone)]
pub struct RedisDonorStore {
    pool: RedisPool,
    clock: Arc<dyn Clock>,
    donors_key: String,
    stats_key: String,
}

impl RedisDonorStore {
    /// Create a store over an existing pool, keeping keys under `namespace`.
    pub fn new(pool: RedisPool, clock: Arc<dyn Clock>, namespace: &str) -> Self {
        let namespace = namespace.trim_end_matches(':');
        let namespace = if namespace.is_empty() {
            DEFAULT_NAMESPACE
        } else {
            namespace
        };
        Self {
            pool,
            clock,
            donors_key: format!("{namespace}:donors"),
            stats_key: format!("{namespace}:stats:{GLOBAL_STATS_KEY}"),
        }
    }

    /// Key of the donor sorted set.
    pub fn donors_key(&self) -> &str {
        &self.donors_key
    }

    /// Key of the aggregate hash.
    pub fn stats_key(&self) -> &str {
        &self.stats_key
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.utc().trunc_subsecs(6)
    }
}

#[async_trait]
impl DonorStore for RedisDonorStore {
    async fn initialize(&self) -> Result<(), DonorStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let created: bool = redis::cmd("HSETNX")
            .arg(&self.stats_key)
            .arg(TOTAL_FIELD)
            .arg(0_u64)
            .query_async(&mut *conn)
            .await
            .map_err(|err| map_redis_error(err, "initialize stats"))?;
        info!(
            backend = %StorageBackend::Redis,
            seeded = created,
            "donor store initialised"
        );
        Ok(())
    }

    async fn insert_donor(&self, donor: &NewDonor) -> Result<Donor, DonorStoreError> {
        let stored = Donor::new(DonorId::random(), donor.clone(), self.now());
        let document = serde_json::to_string(&DonorDocument::from(&stored))
            .map_err(|err| DonorStoreError::query(format!("encode donor: {err}")))?;

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let _: u64 = redis::cmd("ZADD")
            .arg(&self.donors_key)
            .arg(score_for(stored.donated_at()))
            .arg(document)
            .query_async(&mut *conn)
            .await
            .map_err(|err| map_redis_error(err, "insert donor"))?;
        Ok(stored)
    }

    async fn get_stats(&self) -> Result<DonationStats, DonorStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let (total, last_updated): (Option<u64>, Option<String>) = redis::cmd("HMGET")
            .arg(&self.stats_key)
            .arg(TOTAL_FIELD)
            .arg(UPDATED_FIELD)
            .query_async(&mut *conn)
            .await
            .map_err(|err| map_redis_error(err, "read stats"))?;

        Ok(DonationStats {
            total_blood_units: total.unwrap_or_default(),
            last_updated: parse_last_updated(last_updated)?,
        })
    }

    async fn increment_stats(&self) -> Result<u64, DonorStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let (total,): (u64,) = redis::pipe()
            .atomic()
            .cmd("HINCRBY")
            .arg(&self.stats_key)
            .arg(TOTAL_FIELD)
            .arg(1_i64)
            .cmd("HSET")
            .arg(&self.stats_key)
            .arg(UPDATED_FIELD)
            .arg(self.now().to_rfc3339())
            .ignore()
            .query_async(&mut *conn)
            .await
            .map_err(|err| map_redis_error(err, "increment stats"))?;
        Ok(total)
    }

    async fn recount_stats(&self) -> Result<u64, DonorStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        redis::cmd("EVAL")
            .arg(RECOUNT_SCRIPT)
            .arg(2_u8)
            .arg(&self.donors_key)
            .arg(&self.stats_key)
            .arg(self.now().to_rfc3339())
            .query_async(&mut *conn)
            .await
            .map_err(|err| map_redis_error(err, "recount stats"))
    }

    async fn list_donors(
        &self,
        limit: DonorListLimit,
    ) -> Result<Vec<DonorSummary>, DonorStoreError> {
        let stop = i64::try_from(limit.get()).unwrap_or(i64::MAX).saturating_sub(1);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let documents: Vec<String> = redis::cmd("ZREVRANGE")
            .arg(&self.donors_key)
            .arg(0_i64)
            .arg(stop)
            .query_async(&mut *conn)
            .await
            .map_err(|err| map_redis_error(err, "list donors"))?;

        documents
            .iter()
            .map(|raw| decode_donor_document(raw).map(|donor| donor.summary()))
            .collect()
    }

    async fn ping(&self) -> Result<(), DonorStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let _: String = redis::cmd("PING")
            .query_async(&mut *conn)
            .await
            .map_err(|err| map_redis_error(err, "ping"))?;
        Ok(())
    }

    async fn shutdown(&self) {
        if self.pool.close().await {
            info!(backend = %StorageBackend::Redis, "donor store connection pool closed");
        } else {
            warn!(backend = %StorageBackend::Redis, "donor store already shut down");
        }
    }

    fn backend(&self) -> StorageBackend {
        StorageBackend::Redis
    }
}

/// Decode and re-validate a stored donor document.
fn decode_donor_document(raw: &str) -> Result<Donor, DonorStoreError> {
    serde_json::from_str::<DonorDocument>(raw)
        .map_err(|err| DonorStoreError::query(format!("decode donor: {err}")))?
        .into_donor()
}

#[cfg(test)]
mod tests {
    //! Document and key layout coverage; commands run in the opt-in Redis
    //! suite.

    use chrono::TimeZone;
    use rstest::{fixture, rstest};
    use serde_json::json;

    use super::*;

    #[fixture]
    fn donor() -> Donor {
        let new_donor = NewDonor {
            full_name: DonorName::new("Asha Rao").expect("valid name"),
            blood_group: BloodGroup::ONegative,
            age: DonorAge::new(22).expect("valid age"),
            academic_year: AcademicYear::Second,
        };
        let donated_at = Utc
            .with_ymd_and_hms(2026, 3, 1, 9, 30, 0)
            .single()
            .expect("valid timestamp");
        Donor::new(DonorId::from_uuid(Uuid::nil()), new_donor, donated_at)
    }

    #[rstest]
    fn documents_use_wire_labels(donor: Donor) {
        let value = serde_json::to_value(DonorDocument::from(&donor)).expect("encodes");
        assert_eq!(
            value,
            json!({
                "id": "00000000-0000-0000-0000-000000000000",
                "fullName": "Asha Rao",
                "bloodGroup": "O-",
                "age": 22,
                "year": "SY",
                "donatedAt": "2026-03-01T09:30:00Z",
            })
        );
    }

    #[rstest]
    fn documents_decode_back_to_donors(donor: Donor) {
        let raw = serde_json::to_string(&DonorDocument::from(&donor)).expect("encodes");
        assert_eq!(decode_donor_document(&raw).expect("decodes"), donor);
    }

    #[rstest]
    fn roster_entries_project_decoded_documents(donor: Donor) {
        let raw = serde_json::to_string(&DonorDocument::from(&donor)).expect("encodes");
        let summary = decode_donor_document(&raw).expect("decodes").summary();
        assert_eq!(summary.full_name, "Asha Rao");
        assert_eq!(summary.blood_group, BloodGroup::ONegative);
        assert_eq!(summary.donated_at, donor.donated_at());
    }

    #[rstest]
    #[case::short_name(r#"{"id":"00000000-0000-0000-0000-000000000000","fullName":"A","bloodGroup":"O-","age":22,"year":"SY","donatedAt":"2026-03-01T09:30:00Z"}"#)]
    #[case::underage(r#"{"id":"00000000-0000-0000-0000-000000000000","fullName":"Asha Rao","bloodGroup":"O-","age":12,"year":"SY","donatedAt":"2026-03-01T09:30:00Z"}"#)]
    #[case::not_json("donor:asha")]
    fn corrupt_documents_are_query_errors(#[case] raw: &str) {
        let err = decode_donor_document(raw).expect_err("corrupt document");
        assert!(matches!(err, DonorStoreError::Query { .. }));
    }

    #[rstest]
    fn later_donations_score_higher(donor: Donor) {
        let later = donor.donated_at() + chrono::Duration::microseconds(1);
        assert!(score_for(later) > score_for(donor.donated_at()));
    }

    #[rstest]
    #[case(None, None)]
    #[case(Some(String::new()), None)]
    fn missing_timestamps_parse_to_none(
        #[case] raw: Option<String>,
        #[case] expected: Option<DateTime<Utc>>,
    ) {
        assert_eq!(parse_last_updated(raw).expect("parses"), expected);
    }

    #[rstest]
    fn malformed_timestamps_are_query_errors() {
        let err = parse_last_updated(Some("yesterday".to_owned())).expect_err("invalid");
        assert!(matches!(err, DonorStoreError::Query { .. }));
    }
}
