//! HTTP server configuration object and helpers.

use std::sync::Arc;

use donor_drive::domain::DonorListLimit;
use donor_drive::domain::ports::DonorStore;
use donor_drive::inbound::http::error::DiagnosticsMode;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: (String, u16),
    pub(crate) store: Arc<dyn DonorStore>,
    pub(crate) diagnostics: DiagnosticsMode,
    pub(crate) max_list_limit: usize,
}

impl ServerConfig {
    /// Construct a server configuration around an opened donor store.
    #[must_use]
    pub fn new(bind_addr: (String, u16), store: Arc<dyn DonorStore>) -> Self {
        Self {
            bind_addr,
            store,
            diagnostics: DiagnosticsMode::Redacted,
            max_list_limit: DonorListLimit::DEFAULT_MAX,
        }
    }

    /// Choose whether 5xx responses carry internal detail.
    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: DiagnosticsMode) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Cap the roster page size.
    #[must_use]
    pub fn with_max_list_limit(mut self, max_list_limit: usize) -> Self {
        self.max_list_limit = max_list_limit;
        self
    }
}
