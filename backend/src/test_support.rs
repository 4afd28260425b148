//! Test utilities for the donor-drive crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`). It
//! is only compiled for tests or with the `test-support` feature.

pub mod clock;
pub mod memory_store;

pub use clock::MutableClock;
pub use memory_store::InMemoryDonorStore;
