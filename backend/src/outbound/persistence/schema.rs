//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `SCHEMA_SQL` in `ddl.rs` exactly. The store
//! creates the tables itself during initialisation; there is no separate
//! migration step.

diesel::table! {
    /// Append-only donor log.
    ///
    /// `seq` is a monotonically increasing insertion counter used to break
    /// ties between donors stamped with the same timestamp.
    donors (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Insertion order.
        seq -> Int8,
        /// Trimmed donor name.
        full_name -> Varchar,
        /// Canonical blood group label.
        blood_group -> Varchar,
        /// Age in years.
        age -> Int4,
        /// Canonical academic year label.
        academic_year -> Varchar,
        /// Server-assigned donation time.
        donated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Singleton donation aggregate keyed by `global`.
    donation_stats (id) {
        /// Aggregate key.
        id -> Varchar,
        /// Running donor count.
        total_blood_units -> Int8,
        /// Last change to the total.
        last_updated -> Nullable<Timestamptz>,
    }
}
