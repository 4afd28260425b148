//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every donation endpoint, the health endpoints and
//! the response envelopes. The document is served by Swagger UI in debug
//! builds and exported via `cargo run --bin openapi-dump`.

use utoipa::OpenApi;

use crate::domain::ports::StorageBackend;
use crate::domain::{AcademicYear, BloodGroup, ErrorCode};
use crate::inbound::http::donations::{
    DonationData, DonationRequestBody, DonationResponse, DonorBody, DonorSummaryBody,
    DonorsResponse, StatsBody, StatsResponse, SyncData, SyncResponse,
};
use crate::inbound::http::error::ErrorEnvelope;
use crate::inbound::http::health::{HealthResponse, ServiceStatus, StorageStatusBody};

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Donor drive API",
        description = "Blood donation drive registration, live statistics and reconciliation."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::donations::submit_donation,
        crate::inbound::http::donations::get_stats,
        crate::inbound::http::donations::list_donors,
        crate::inbound::http::donations::sync_stats,
        crate::inbound::http::health::health,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        DonationRequestBody,
        DonationResponse,
        DonationData,
        DonorBody,
        StatsResponse,
        StatsBody,
        DonorsResponse,
        DonorSummaryBody,
        SyncResponse,
        SyncData,
        HealthResponse,
        ServiceStatus,
        StorageStatusBody,
        StorageBackend,
        ErrorEnvelope,
        ErrorCode,
        BloodGroup,
        AcademicYear,
    )),
    tags(
        (name = "donations", description = "Donor registration and dashboard data"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
