//! Behaviour every `DonorStore` adapter must share.
//!
//! Drives a freshly provisioned backend through initialisation, inserts,
//! overlapping increments, listing, recounting and shutdown. Callers own
//! provisioning.

use donor_drive::domain::ports::{DonorStore, DonorStoreError};
use donor_drive::domain::{
    AcademicYear, BloodGroup, DonorAge, DonorListLimit, DonorName, NewDonor,
};
use donor_drive::test_support::MutableClock;
use futures_util::future::join_all;

/// Increments issued at once; none may be lost.
const CONCURRENT_INCREMENTS: u64 = 16;

fn new_donor(name: &str, blood_group: BloodGroup) -> NewDonor {
    NewDonor {
        full_name: DonorName::new(name).expect("valid name"),
        blood_group,
        age: DonorAge::new(24).expect("valid age"),
        academic_year: AcademicYear::Final,
    }
}

/// Exercise `store` end to end. `clock` must be the clock the store stamps with.
pub async fn exercise_store(store: &dyn DonorStore, clock: &MutableClock) {
    store.initialize().await.expect("first initialise");
    store.initialize().await.expect("initialise is idempotent");
    assert_eq!(store.get_stats().await.expect("stats").total_blood_units, 0);
    store.ping().await.expect("ping");

    let names = ["Asha Rao", "Kiran Das", "Meera Iyer"];
    for (index, name) in names.iter().enumerate() {
        clock.advance_seconds(30);
        let stored = store
            .insert_donor(&new_donor(name, BloodGroup::ONegative))
            .await
            .expect("insert donor");
        assert_eq!(stored.full_name().as_ref(), *name);
        assert_eq!(stored.donated_at(), clock_now(clock));
        let total = store.increment_stats().await.expect("increment");
        assert_eq!(total, index as u64 + 1);
    }

    let stats = store.get_stats().await.expect("stats after inserts");
    assert_eq!(stats.total_blood_units, 3);
    assert!(stats.last_updated.is_some());

    let recent = store
        .list_donors(DonorListLimit::new(2, DonorListLimit::DEFAULT_MAX))
        .await
        .expect("list donors");
    let listed: Vec<_> = recent.iter().map(|donor| donor.full_name.as_str()).collect();
    assert_eq!(listed, ["Meera Iyer", "Kiran Das"]);

    let increments = (0..CONCURRENT_INCREMENTS).map(|_| store.increment_stats());
    let mut totals: Vec<u64> = join_all(increments)
        .await
        .into_iter()
        .map(|total| total.expect("concurrent increment"))
        .collect();
    totals.sort_unstable();
    let expected: Vec<u64> = (4..=3 + CONCURRENT_INCREMENTS).collect();
    assert_eq!(totals, expected, "each increment sees a distinct total");
    assert_eq!(
        store.get_stats().await.expect("stats after increments").total_blood_units,
        3 + CONCURRENT_INCREMENTS
    );

    assert_eq!(store.recount_stats().await.expect("recount"), 3);
    assert_eq!(store.recount_stats().await.expect("recount again"), 3);
    store.initialize().await.expect("initialise keeps totals");
    assert_eq!(store.get_stats().await.expect("stats").total_blood_units, 3);

    store.shutdown().await;
    let error = store.get_stats().await.expect_err("closed store fails");
    assert!(matches!(error, DonorStoreError::Connection { .. }), "{error}");
}

fn clock_now(clock: &MutableClock) -> chrono::DateTime<chrono::Utc> {
    use mockable::Clock;
    clock.utc()
}
