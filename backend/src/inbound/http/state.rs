//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{DonationCommand, DonationQuery, StatsReconciliation, StorageProbe};
use crate::domain::{DonorListLimit, Error};

use super::error::{ApiError, DiagnosticsMode};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub donations: Arc<dyn DonationCommand>,
    pub dashboard: Arc<dyn DonationQuery>,
    pub reconciliation: Arc<dyn StatsReconciliation>,
    pub storage: Arc<dyn StorageProbe>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub donations: Arc<dyn DonationCommand>,
    pub dashboard: Arc<dyn DonationQuery>,
    pub reconciliation: Arc<dyn StatsReconciliation>,
    pub storage: Arc<dyn StorageProbe>,
    diagnostics: DiagnosticsMode,
    max_list_limit: usize,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Build state with redacted errors and the default roster ceiling.
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            donations,
            dashboard,
            reconciliation,
            storage,
        } = ports;
        Self {
            donations,
            dashboard,
            reconciliation,
            storage,
            diagnostics: DiagnosticsMode::Redacted,
            max_list_limit: DonorListLimit::DEFAULT_MAX,
        }
    }

    /// Choose whether internal detail reaches clients.
    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: DiagnosticsMode) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Cap the roster page size.
    #[must_use]
    pub fn with_max_list_limit(mut self, max_list_limit: usize) -> Self {
        self.max_list_limit = max_list_limit.max(1);
        self
    }

    /// Roster page size ceiling.
    pub fn max_list_limit(&self) -> usize {
        self.max_list_limit
    }

    /// Wrap a domain error with this deployment's diagnostics policy.
    pub fn reject(&self, error: Error) -> ApiError {
        ApiError::new(error, self.diagnostics)
    }
}
