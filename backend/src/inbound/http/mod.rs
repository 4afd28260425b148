//! HTTP inbound adapter exposing the donation REST endpoints.

pub mod donations;
pub mod error;
pub mod health;
pub mod state;

pub use error::{ApiError, ApiResult};
