//! Application settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `DONOR_DRIVE_*` environment variables and an
//! optional configuration file. `DATABASE_URL` is honoured when
//! `DONOR_DRIVE_DATABASE_URL` is unset.

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::DonorListLimit;
use crate::outbound::StorageSettings;
use crate::outbound::document::DEFAULT_NAMESPACE;

const DEFAULT_BIND_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DATABASE_URL_FALLBACK: &str = "DATABASE_URL";

/// Runtime configuration for the donor drive service and its tools.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "DONOR_DRIVE")]
pub struct AppSettings {
    /// Storage connection URL (`postgres://`, `postgresql://`, `redis://`,
    /// `rediss://`). Absent means degraded mode.
    pub database_url: Option<String>,
    /// Attach internal failure detail to 5xx responses.
    #[ortho_config(default = false)]
    pub verbose_errors: bool,
    /// Interface to bind.
    pub bind_host: Option<String>,
    /// Port to bind.
    pub port: Option<u16>,
    /// Ceiling for `GET /api/donors?limit=`.
    pub max_list_limit: Option<usize>,
    /// Key prefix used by the Redis backend.
    pub redis_namespace: Option<String>,
}

impl AppSettings {
    /// Connection URL, falling back to `DATABASE_URL`.
    pub fn database_url(&self) -> Option<String> {
        self.database_url
            .clone()
            .or_else(|| std::env::var(DATABASE_URL_FALLBACK).ok())
            .filter(|url| !url.trim().is_empty())
    }

    /// Host and port the HTTP server binds to.
    pub fn bind_address(&self) -> (String, u16) {
        (
            self.bind_host
                .clone()
                .unwrap_or_else(|| DEFAULT_BIND_HOST.to_owned()),
            self.port.unwrap_or(DEFAULT_PORT),
        )
    }

    /// Roster page ceiling.
    pub fn max_list_limit(&self) -> usize {
        self.max_list_limit
            .filter(|limit| *limit > 0)
            .unwrap_or(DonorListLimit::DEFAULT_MAX)
    }

    /// Redis key prefix.
    pub fn redis_namespace(&self) -> &str {
        self.redis_namespace
            .as_deref()
            .filter(|namespace| !namespace.trim().is_empty())
            .unwrap_or(DEFAULT_NAMESPACE)
    }

    /// Inputs for [`connect_donor_store`](crate::outbound::connect_donor_store).
    pub fn storage_settings(&self) -> StorageSettings {
        StorageSettings::new(self.database_url()).with_redis_namespace(self.redis_namespace())
    }
}
