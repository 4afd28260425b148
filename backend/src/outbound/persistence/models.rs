//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions into domain types re-validate
//! every column so a row edited by hand cannot smuggle invalid data in.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::BigInt;
use uuid::Uuid;

use super::schema::{donation_stats, donors};

/// Insertable donor record. `seq` is assigned by the database.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = donors)]
pub(crate) struct NewDonorRow<'a> {
    pub id: Uuid,
    pub full_name: &'a str,
    pub blood_group: &'a str,
    pub age: i32,
    pub academic_year: &'a str,
    pub donated_at: DateTime<Utc>,
}

/// Full donor row returned after an insert.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = donors)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct DonorRow {
    pub id: Uuid,
    pub full_name: String,
    pub blood_group: String,
    pub age: i32,
    pub academic_year: String,
    pub donated_at: DateTime<Utc>,
}

/// Roster projection.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = donors)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct DonorSummaryRow {
    pub full_name: String,
    pub blood_group: String,
    pub donated_at: DateTime<Utc>,
}

/// Aggregate row.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = donation_stats)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct StatsRow {
    pub total_blood_units: i64,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Insertable aggregate used by the increment upsert.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = donation_stats)]
pub(crate) struct NewStatsRow<'a> {
    pub id: &'a str,
    pub total_blood_units: i64,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Result of the raw recount statement.
#[derive(Debug, Clone, QueryableByName)]
pub(crate) struct RecountRow {
    #[diesel(sql_type = BigInt)]
    pub total_blood_units: i64,
}
