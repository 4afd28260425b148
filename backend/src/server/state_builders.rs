//! Builders for HTTP state ports.

use std::sync::Arc;

use actix_web::web;

use donor_drive::domain::DonationService;
use donor_drive::inbound::http::state::{HttpState, HttpStatePorts};

use super::ServerConfig;

/// Wire one donation service over the configured store into every port.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let service = Arc::new(DonationService::new(Arc::clone(&config.store)));
    let state = HttpState::new(HttpStatePorts {
        donations: service.clone(),
        dashboard: service.clone(),
        reconciliation: service.clone(),
        storage: service,
    })
    .with_diagnostics(config.diagnostics)
    .with_max_list_limit(config.max_list_limit);
    web::Data::new(state)
}
