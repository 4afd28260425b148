//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL donor store using Diesel.
//! - **document**: Redis donor store using `bb8-redis`.
//! - **storage**: picks and initialises one of them from the connection URL.
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod document;
pub mod persistence;
pub mod pool;
pub mod storage;

pub use pool::{PoolConfig, PoolError};
pub use storage::{StorageSettings, connect_donor_store};
