//! Tests for donation HTTP handlers.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test, web};
use rstest::{fixture, rstest};
use serde_json::{Value, json};

use super::*;
use crate::domain::DonationService;
use crate::domain::donation_service::{INTERNAL_ERROR_MESSAGE, STORAGE_UNAVAILABLE_MESSAGE};
use crate::domain::ports::{DonationCommand, DonorStore, DonorStoreError, UnavailableDonorStore};
use crate::inbound::http::error::{DiagnosticsMode, json_config};
use crate::inbound::http::state::HttpStatePorts;
use crate::test_support::{InMemoryDonorStore, MutableClock};

fn state_for(store: Arc<dyn DonorStore>) -> HttpState {
    let service = Arc::new(DonationService::new(store));
    HttpState::new(HttpStatePorts {
        donations: service.clone(),
        dashboard: service.clone(),
        reconciliation: service.clone(),
        storage: service,
    })
}

fn test_app(
    state: HttpState,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .app_data(json_config())
        .service(
            web::scope("/api")
                .service(submit_donation)
                .service(get_stats)
                .service(list_donors)
                .service(sync_stats),
        )
}

#[fixture]
fn clock() -> Arc<MutableClock> {
    Arc::new(MutableClock::drive_day())
}

#[fixture]
fn store(clock: Arc<MutableClock>) -> Arc<InMemoryDonorStore> {
    Arc::new(InMemoryDonorStore::new(clock))
}

fn asha() -> Value {
    json!({"fullName": "Asha Rao", "bloodGroup": "O-", "age": 22, "year": "SY"})
}

async fn call(
    state: HttpState,
    request: actix_test::TestRequest,
) -> (StatusCode, Value) {
    let app = actix_test::init_service(test_app(state)).await;
    let response = actix_test::call_service(&app, request.to_request()).await;
    let status = response.status();
    let body = actix_test::read_body(response).await;
    let value = serde_json::from_slice(&body).expect("JSON body");
    (status, value)
}

#[rstest]
#[actix_web::test]
async fn donation_is_created_and_counted(store: Arc<InMemoryDonorStore>) {
    let (status, body) = call(
        state_for(store.clone()),
        actix_test::TestRequest::post().uri("/api/donate").set_json(asha()),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        body,
        json!({
            "success": true,
            "message": DONATION_RECORDED_MESSAGE,
            "data": {
                "donor": {"fullName": "Asha Rao", "bloodGroup": "O-"},
                "totalUnits": 1
            }
        })
    );
    assert_eq!(store.donor_count(), 1);
}

#[rstest]
#[actix_web::test]
async fn string_ages_and_padded_names_are_accepted(store: Arc<InMemoryDonorStore>) {
    let payload = json!({"fullName": "  Ravi K  ", "bloodGroup": "AB+", "age": "30", "year": "Final Year"});
    let (status, body) = call(
        state_for(store),
        actix_test::TestRequest::post().uri("/api/donate").set_json(payload),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["donor"]["fullName"], "Ravi K");
}

#[rstest]
#[case(json!({"bloodGroup": "O-", "age": 22, "year": "SY"}), "All fields are required", "missing_fields")]
#[case(json!({"fullName": "Asha Rao", "bloodGroup": "O-", "age": null, "year": "SY"}), "All fields are required", "missing_fields")]
#[case(json!({"fullName": "Asha Rao", "bloodGroup": "O-", "age": 17, "year": "SY"}), "Must be at least 18 years old", "age_below_minimum")]
#[case(json!({"fullName": "Asha Rao", "bloodGroup": "O-", "age": 101, "year": "SY"}), "Age must not exceed 100", "age_above_maximum")]
#[case(json!({"fullName": "Asha Rao", "bloodGroup": "a+", "age": 22, "year": "SY"}), "Invalid blood group", "invalid_blood_group")]
#[case(json!({"fullName": "Asha Rao", "bloodGroup": "O-", "age": 22, "year": "PG"}), "Invalid year selection", "invalid_year")]
#[case(json!({"fullName": "Asha Rao", "bloodGroup": "O-", "age": 17.0, "year": "SY"}), "Must be at least 18 years old", "age_below_minimum")]
#[case(json!({"fullName": "Asha Rao", "bloodGroup": "O-", "age": 18.5, "year": "SY"}), "Must be at least 18 years old", "age_below_minimum")]
#[case(json!({"fullName": "a".repeat(201), "bloodGroup": "O-", "age": 22, "year": "SY"}), "Full name must not exceed 200 characters", "name_too_long")]
#[actix_web::test]
async fn invalid_submissions_are_rejected_without_writes(
    store: Arc<InMemoryDonorStore>,
    #[case] payload: Value,
    #[case] message: &str,
    #[case] code: &str,
) {
    let (status, body) = call(
        state_for(store.clone()),
        actix_test::TestRequest::post().uri("/api/donate").set_json(payload),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], message);
    assert_eq!(body["code"], "invalid_request");
    assert_eq!(body["details"]["code"], code);
    assert_eq!(store.donor_count(), 0);
    assert_eq!(
        store.get_stats().await.expect("stats").total_blood_units,
        0
    );
}

#[rstest]
#[case(json!({"fullName": "Asha Rao", "bloodGroup": "O-", "age": 22.0, "year": "SY"}))]
#[case(json!({"fullName": "Asha Rao", "bloodGroup": "O-", "age": "18.00", "year": "SY"}))]
#[case(json!({"fullName": "a".repeat(200), "bloodGroup": "O-", "age": 22, "year": "SY"}))]
#[actix_web::test]
async fn boundary_submissions_are_accepted(store: Arc<InMemoryDonorStore>, #[case] payload: Value) {
    let (status, body) = call(
        state_for(store.clone()),
        actix_test::TestRequest::post().uri("/api/donate").set_json(payload),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["totalUnits"], 1);
    assert_eq!(store.donor_count(), 1);
}

#[rstest]
#[actix_web::test]
async fn missing_fields_name_the_first_and_list_all(store: Arc<InMemoryDonorStore>) {
    let (status, body) = call(
        state_for(store),
        actix_test::TestRequest::post()
            .uri("/api/donate")
            .set_json(json!({"bloodGroup": "O-", "age": 22})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["details"],
        json!({"field": "fullName", "fields": ["fullName", "year"], "code": "missing_fields"})
    );
}

#[rstest]
#[actix_web::test]
async fn malformed_json_uses_the_error_envelope(store: Arc<InMemoryDonorStore>) {
    let (status, body) = call(
        state_for(store),
        actix_test::TestRequest::post()
            .uri("/api/donate")
            .insert_header(("content-type", "application/json"))
            .set_payload("{\"fullName\": "),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "invalid_request");
    assert_eq!(body["message"], "Request body must be valid JSON");
}

#[rstest]
#[actix_web::test]
async fn stats_start_empty(store: Arc<InMemoryDonorStore>) {
    let (status, body) = call(
        state_for(store),
        actix_test::TestRequest::get().uri("/api/stats"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"success": true, "data": {"totalBloodUnits": 0, "lastUpdated": null}})
    );
}

#[rstest]
#[actix_web::test]
async fn stats_report_the_stored_total_verbatim(store: Arc<InMemoryDonorStore>) {
    store.set_total(42);
    let (_, body) = call(
        state_for(store),
        actix_test::TestRequest::get().uri("/api/stats"),
    )
    .await;
    assert_eq!(body["data"]["totalBloodUnits"], 42);
}

async fn seed(store: &Arc<InMemoryDonorStore>, clock: &MutableClock, count: usize) {
    let service = DonationService::new(Arc::clone(store));
    for index in 0..count {
        clock.advance_seconds(60);
        let submission = DonationSubmission {
            full_name: Some(format!("Donor {index}")),
            blood_group: Some("B+".to_owned()),
            age: Some("20".to_owned()),
            year: Some("FY".to_owned()),
        };
        service
            .submit_donation(submission)
            .await
            .expect("seed donation");
    }
}

#[rstest]
#[case("/api/donors?limit=2", 2)]
#[case("/api/donors", 5)]
#[case("/api/donors?limit=abc", 5)]
#[case("/api/donors?limit=0", 5)]
#[case("/api/donors?limit=-3", 5)]
#[actix_web::test]
async fn donors_are_listed_newest_first(
    clock: Arc<MutableClock>,
    #[case] uri: &str,
    #[case] expected_len: usize,
) {
    let store = Arc::new(InMemoryDonorStore::new(clock.clone()));
    seed(&store, &clock, 5).await;
    let (status, body) = call(state_for(store), actix_test::TestRequest::get().uri(uri)).await;

    assert_eq!(status, StatusCode::OK);
    let donors = body["data"].as_array().expect("donor array");
    assert_eq!(donors.len(), expected_len);
    assert_eq!(donors[0]["fullName"], "Donor 4");
    if expected_len > 1 {
        assert_eq!(donors[1]["fullName"], "Donor 3");
    }
    assert!(donors[0].get("age").is_none());
}

#[rstest]
#[actix_web::test]
async fn donor_limit_is_capped_by_configuration(
    clock: Arc<MutableClock>,
) {
    let store = Arc::new(InMemoryDonorStore::new(clock.clone()));
    seed(&store, &clock, 5).await;
    let state = state_for(store).with_max_list_limit(3);
    let (_, body) = call(state, actix_test::TestRequest::get().uri("/api/donors?limit=1000")).await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(3));
}

#[rstest]
#[actix_web::test]
async fn sync_repairs_drift_and_is_idempotent(
    clock: Arc<MutableClock>,
) {
    let store = Arc::new(InMemoryDonorStore::new(clock.clone()));
    seed(&store, &clock, 3).await;
    store.set_total(99);

    for _ in 0..2 {
        let (status, body) = call(
            state_for(store.clone()),
            actix_test::TestRequest::post().uri("/api/sync-stats"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "success": true,
                "message": STATS_SYNCED_MESSAGE,
                "data": {"totalBloodUnits": 3}
            })
        );
    }
}

#[rstest]
#[case("/api/stats", actix_test::TestRequest::get())]
#[case("/api/donors", actix_test::TestRequest::get())]
#[case("/api/sync-stats", actix_test::TestRequest::post())]
#[actix_web::test]
async fn unavailable_storage_answers_503(
    #[case] uri: &str,
    #[case] request: actix_test::TestRequest,
) {
    let store = Arc::new(UnavailableDonorStore::new("no database URL configured"));
    let (status, body) = call(state_for(store), request.uri(uri)).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], STORAGE_UNAVAILABLE_MESSAGE);
    assert_eq!(body["code"], "service_unavailable");
    assert!(body.get("error").is_none());
}

#[rstest]
#[actix_web::test]
async fn verbose_mode_exposes_storage_detail() {
    let store = Arc::new(UnavailableDonorStore::new("no database URL configured"));
    let state = state_for(store).with_diagnostics(DiagnosticsMode::Verbose);
    let (status, body) = call(
        state,
        actix_test::TestRequest::post().uri("/api/donate").set_json(asha()),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(
        body["error"]
            .as_str()
            .is_some_and(|detail| detail.contains("no database URL configured"))
    );
}

#[rstest]
#[actix_web::test]
async fn query_failures_answer_500_with_a_generic_message(store: Arc<InMemoryDonorStore>) {
    store.fail_all(Some(DonorStoreError::query("syntax error at or near \"SELEC\"")));
    let (status, body) = call(
        state_for(store),
        actix_test::TestRequest::get().uri("/api/donors"),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], INTERNAL_ERROR_MESSAGE);
    assert_eq!(body["code"], "internal_error");
    assert!(!body.to_string().contains("SELEC"));
}

#[rstest]
#[actix_web::test]
async fn increment_failure_is_reported_after_the_insert(store: Arc<InMemoryDonorStore>) {
    store.fail_increments(Some(DonorStoreError::connection("connection reset")));
    let (status, _) = call(
        state_for(store.clone()),
        actix_test::TestRequest::post().uri("/api/donate").set_json(asha()),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(store.donor_count(), 1);
    store.fail_increments(None);
    assert_eq!(store.get_stats().await.expect("stats").total_blood_units, 0);
}

#[rstest]
fn loose_values_are_stringified() {
    let body = DonationRequestBody {
        full_name: Some(json!("Asha")),
        blood_group: Some(Value::Null),
        age: Some(json!(22)),
        year: Some(json!(true)),
    };
    let submission = DonationSubmission::from(body);
    assert_eq!(submission.full_name.as_deref(), Some("Asha"));
    assert_eq!(submission.blood_group, None);
    assert_eq!(submission.age.as_deref(), Some("22"));
    assert_eq!(submission.year.as_deref(), Some("true"));
}
