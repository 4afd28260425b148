//! Donation HTTP handlers.
//!
//! ```text
//! POST /api/donate {"fullName":"Asha Rao","bloodGroup":"O-","age":22,"year":"SY"}
//! GET /api/stats
//! GET /api/donors?limit=10
//! POST /api/sync-stats
//! ```

use actix_web::{HttpResponse, get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use crate::domain::{BloodGroup, DonationSubmission, DonorListLimit, DonorSummary};
use crate::inbound::http::ApiResult;
use crate::inbound::http::error::ErrorEnvelope;
use crate::inbound::http::state::HttpState;

/// Confirmation returned after a donation is stored.
pub const DONATION_RECORDED_MESSAGE: &str = "Donation recorded successfully";
/// Confirmation returned after a recount.
pub const STATS_SYNCED_MESSAGE: &str = "Stats synchronized successfully";

/// Registration form payload.
///
/// Fields are accepted as any JSON scalar so `"age": 22` and `"age": "22"`
/// behave alike; validation happens in the domain.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DonationRequestBody {
    #[schema(value_type = Option<String>, example = "Asha Rao")]
    #[serde(default)]
    pub full_name: Option<Value>,
    #[schema(value_type = Option<String>, example = "O-")]
    #[serde(default)]
    pub blood_group: Option<Value>,
    #[schema(value_type = Option<i64>, example = 22)]
    #[serde(default)]
    pub age: Option<Value>,
    #[schema(value_type = Option<String>, example = "SY")]
    #[serde(default)]
    pub year: Option<Value>,
}

fn loose_text(value: Option<Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(text) => Some(text),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Number(number) => Some(number.to_string()),
        other => Some(other.to_string()),
    }
}

impl From<DonationRequestBody> for DonationSubmission {
    fn from(body: DonationRequestBody) -> Self {
        Self {
            full_name: loose_text(body.full_name),
            blood_group: loose_text(body.blood_group),
            age: loose_text(body.age),
            year: loose_text(body.year),
        }
    }
}

/// Public fields of a newly stored donor.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DonorBody {
    pub full_name: String,
    pub blood_group: BloodGroup,
}

/// `data` of a successful donation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DonationData {
    pub donor: DonorBody,
    pub total_units: u64,
}

/// Response body for `POST /api/donate`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DonationResponse {
    pub success: bool,
    pub message: String,
    pub data: DonationData,
}

/// Aggregate snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatsBody {
    pub total_blood_units: u64,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Response body for `GET /api/stats`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatsResponse {
    pub success: bool,
    pub data: StatsBody,
}

/// Roster entry.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DonorSummaryBody {
    pub full_name: String,
    pub blood_group: BloodGroup,
    pub donated_at: DateTime<Utc>,
}

impl From<DonorSummary> for DonorSummaryBody {
    fn from(summary: DonorSummary) -> Self {
        Self {
            full_name: summary.full_name,
            blood_group: summary.blood_group,
            donated_at: summary.donated_at,
        }
    }
}

/// Response body for `GET /api/donors`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DonorsResponse {
    pub success: bool,
    pub data: Vec<DonorSummaryBody>,
}

/// `data` of a recount.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncData {
    pub total_blood_units: u64,
}

/// Response body for `POST /api/sync-stats`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SyncResponse {
    pub success: bool,
    pub message: String,
    pub data: SyncData,
}

/// Query string of `GET /api/donors`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DonorListQuery {
    /// Page size; missing or invalid values use 10, large values are capped.
    #[param(value_type = Option<i64>, example = 10)]
    pub limit: Option<String>,
}

/// Register a donor and count the unit.
#[utoipa::path(
    post,
    path = "/api/donate",
    request_body = DonationRequestBody,
    responses(
        (status = 201, description = "Donation recorded", body = DonationResponse),
        (status = 400, description = "Validation failed", body = ErrorEnvelope),
        (status = 500, description = "Internal server error", body = ErrorEnvelope),
        (status = 503, description = "Storage unavailable", body = ErrorEnvelope)
    ),
    tags = ["donations"],
    operation_id = "submitDonation"
)]
#[post("/donate")]
pub async fn submit_donation(
    state: web::Data<HttpState>,
    payload: web::Json<DonationRequestBody>,
) -> ApiResult<HttpResponse> {
    let submission = DonationSubmission::from(payload.into_inner());
    let receipt = state
        .donations
        .submit_donation(submission)
        .await
        .map_err(|err| state.reject(err))?;

    Ok(HttpResponse::Created().json(DonationResponse {
        success: true,
        message: DONATION_RECORDED_MESSAGE.to_owned(),
        data: DonationData {
            donor: DonorBody {
                full_name: receipt.donor.full_name().to_string(),
                blood_group: receipt.donor.blood_group(),
            },
            total_units: receipt.total_units,
        },
    }))
}

/// Read the aggregate exactly as stored.
#[utoipa::path(
    get,
    path = "/api/stats",
    responses(
        (status = 200, description = "Current aggregate", body = StatsResponse),
        (status = 500, description = "Internal server error", body = ErrorEnvelope),
        (status = 503, description = "Storage unavailable", body = ErrorEnvelope)
    ),
    tags = ["donations"],
    operation_id = "getStats"
)]
#[get("/stats")]
pub async fn get_stats(state: web::Data<HttpState>) -> ApiResult<web::Json<StatsResponse>> {
    let stats = state
        .dashboard
        .stats()
        .await
        .map_err(|err| state.reject(err))?;
    Ok(web::Json(StatsResponse {
        success: true,
        data: StatsBody {
            total_blood_units: stats.total_blood_units,
            last_updated: stats.last_updated,
        },
    }))
}

/// List the most recent donors, newest first.
#[utoipa::path(
    get,
    path = "/api/donors",
    params(DonorListQuery),
    responses(
        (status = 200, description = "Recent donors", body = DonorsResponse),
        (status = 500, description = "Internal server error", body = ErrorEnvelope),
        (status = 503, description = "Storage unavailable", body = ErrorEnvelope)
    ),
    tags = ["donations"],
    operation_id = "listDonors"
)]
#[get("/donors")]
pub async fn list_donors(
    state: web::Data<HttpState>,
    query: web::Query<DonorListQuery>,
) -> ApiResult<web::Json<DonorsResponse>> {
    let limit = DonorListLimit::from_query(query.limit.as_deref(), state.max_list_limit());
    let donors = state
        .dashboard
        .recent_donors(limit)
        .await
        .map_err(|err| state.reject(err))?;
    Ok(web::Json(DonorsResponse {
        success: true,
        data: donors.into_iter().map(DonorSummaryBody::from).collect(),
    }))
}

/// Recompute the aggregate from the donor records.
#[utoipa::path(
    post,
    path = "/api/sync-stats",
    responses(
        (status = 200, description = "Aggregate recounted", body = SyncResponse),
        (status = 500, description = "Internal server error", body = ErrorEnvelope),
        (status = 503, description = "Storage unavailable", body = ErrorEnvelope)
    ),
    tags = ["donations"],
    operation_id = "syncStats"
)]
#[post("/sync-stats")]
pub async fn sync_stats(state: web::Data<HttpState>) -> ApiResult<web::Json<SyncResponse>> {
    let total = state
        .reconciliation
        .recount()
        .await
        .map_err(|err| state.reject(err))?;
    Ok(web::Json(SyncResponse {
        success: true,
        message: STATS_SYNCED_MESSAGE.to_owned(),
        data: SyncData {
            total_blood_units: total,
        },
    }))
}

#[cfg(test)]
#[path = "donations_tests.rs"]
mod tests;
