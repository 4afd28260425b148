//! PostgreSQL donor store using Diesel ORM.
//!
//! The relational variant of the [`DonorStore`](crate::domain::ports::DonorStore)
//! port, backed by `diesel-async` with `bb8` connection pooling.
//!
//! - **Thin adapter**: the store only translates between Diesel rows and
//!   domain types. Validation lives in the domain.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **Self-provisioning**: `initialize` runs idempotent DDL, so a fresh
//!   database needs no migration tooling.
//!
//! # Example
//!
//! ```ignore
//! use donor_drive::outbound::PoolConfig;
//! use donor_drive::outbound::persistence::{DbPool, DieselDonorStore};
//!
//! let pool = DbPool::new(&PoolConfig::new("postgres://localhost/donors")).await?;
//! let store = DieselDonorStore::new(pool, Arc::new(DefaultClock));
//! store.initialize().await?;
//! ```

mod ddl;
mod diesel_donor_store;
mod diesel_error_mapping;
mod models;
mod pool;
mod schema;

pub use diesel_donor_store::DieselDonorStore;
pub use pool::{DbPool, PgConnection};
