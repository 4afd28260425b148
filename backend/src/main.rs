//! Backend entry-point: loads settings, opens the donor store and serves the
//! REST endpoints until a shutdown signal arrives.

mod server;

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use donor_drive::config::AppSettings;
use donor_drive::inbound::http::error::DiagnosticsMode;
use donor_drive::inbound::http::health::HealthState;
use donor_drive::outbound::connect_donor_store;
use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load()
        .map_err(|err| std::io::Error::other(format!("failed to load settings: {err}")))?;

    let store = connect_donor_store(&settings.storage_settings(), Arc::new(DefaultClock)).await;
    let (host, port) = settings.bind_address();
    info!(backend = %store.backend(), %host, port, "starting donor drive server");

    let config = ServerConfig::new((host, port), Arc::clone(&store))
        .with_diagnostics(DiagnosticsMode::from_verbose(settings.verbose_errors))
        .with_max_list_limit(settings.max_list_limit());

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)?;
    let outcome = server.await;

    health_state.mark_unhealthy();
    store.shutdown().await;
    info!("donor drive server stopped");
    outcome
}
