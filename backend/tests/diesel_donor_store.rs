//! PostgreSQL donor store against an embedded cluster.
//! Use `cargo test -- --ignored` with `RUN_PG_EMBEDDED=1` to run it.

#[path = "support/store_contract.rs"]
mod store_contract;

use std::sync::Arc;

use donor_drive::domain::ports::{DonorStore, StorageBackend};
use donor_drive::outbound::PoolConfig;
use donor_drive::outbound::persistence::{DbPool, DieselDonorStore};
use donor_drive::test_support::MutableClock;
use pg_embedded_setup_unpriv::TestCluster;

#[test]
#[ignore = "requires embedded Postgres binaries; opt-in via RUN_PG_EMBEDDED=1"]
fn diesel_store_honours_the_donor_store_contract() {
    if std::env::var("RUN_PG_EMBEDDED").as_deref() != Ok("1") {
        eprintln!("SKIP-TEST-CLUSTER: set RUN_PG_EMBEDDED=1 to run");
        return;
    }

    let cluster = TestCluster::new().expect("embedded Postgres should start");
    let url = cluster.connection().database_url("postgres");
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime");

    runtime.block_on(async {
        let clock = Arc::new(MutableClock::drive_day());
        let pool = DbPool::new(&PoolConfig::new(url)).await.expect("pool");
        let store = DieselDonorStore::new(pool, clock.clone());
        assert_eq!(store.backend(), StorageBackend::Postgres);
        store_contract::exercise_store(&store, &clock).await;
    });
}
