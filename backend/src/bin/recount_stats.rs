//! Recount the donation aggregate from the stored donor records.
//!
//! Connects to the configured backend, runs the reconciliation once and
//! prints the corrected total. Settings come from the same `DONOR_DRIVE_*`
//! environment as the server; flags override them.

use std::ffi::OsString;
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Result, eyre};
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

use donor_drive::config::AppSettings;
use donor_drive::domain::DonationService;
use donor_drive::domain::ports::{StatsReconciliation, StorageBackend};
use donor_drive::outbound::{StorageSettings, connect_donor_store};

/// Command-line arguments for `recount-stats`.
#[derive(Debug, Parser)]
#[command(name = "recount-stats", about = "Recount the donation aggregate")]
struct Cli {
    /// Storage connection URL; defaults to the configured one.
    #[arg(long)]
    database_url: Option<String>,
    /// Redis key prefix; defaults to the configured one.
    #[arg(long)]
    redis_namespace: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| eyre!("failed to initialise tracing: {err}"))?;

    let cli = Cli::parse();
    let settings = AppSettings::load_from_iter([OsString::from("recount-stats")])
        .map_err(|err| eyre!("failed to load settings: {err}"))?;

    let storage = resolve_storage(&cli, &settings);
    let store = connect_donor_store(&storage, Arc::new(DefaultClock)).await;
    if store.backend() == StorageBackend::Unavailable {
        store.shutdown().await;
        return Err(eyre!("donor store is unavailable; check the database URL"));
    }

    let outcome = DonationService::new(Arc::clone(&store)).recount().await;
    store.shutdown().await;
    let total = outcome.map_err(|err| eyre!("recount failed: {err}"))?;

    info!(total, "aggregate recounted");
    println!("{total}");
    Ok(())
}

fn resolve_storage(cli: &Cli, settings: &AppSettings) -> StorageSettings {
    let base = settings.storage_settings();
    let url = cli.database_url.clone().or(base.url);
    let namespace = cli
        .redis_namespace
        .clone()
        .unwrap_or(base.redis_namespace);
    StorageSettings::new(url).with_redis_namespace(namespace)
}
