//! Health endpoints: liveness and readiness probes for orchestration, plus a
//! storage-aware status document for operators.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use actix_web::{HttpResponse, get, http::header, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{StorageBackend, StorageStatus};
use crate::inbound::http::state::HttpState;

/// Shared health state for readiness and liveness checks.
///
/// Tracks readiness, whether the process should report itself as alive to
/// orchestrators, and when it started.
#[derive(Debug)]
pub struct HealthState {
    ready: AtomicBool,
    live: AtomicBool,
    started_at: Instant,
}

impl Default for HealthState {
    fn default() -> Self {
        Self {
            ready: AtomicBool::new(false),
            live: AtomicBool::new(true),
            started_at: Instant::now(),
        }
    }
}

impl HealthState {
    /// Create a new health state starting as not ready but live.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the service as ready.
    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    /// Flag the service as unhealthy so liveness checks fail fast during shutdown.
    pub fn mark_unhealthy(&self) {
        self.live.store(false, Ordering::Release);
    }

    /// Return readiness state.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Return liveness state. When false, liveness probes emit 503 to trigger restarts.
    pub fn is_alive(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    /// Whole seconds since the state was created.
    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    fn probe_response(probe_ok: bool) -> HttpResponse {
        let mut response = if probe_ok {
            HttpResponse::Ok()
        } else {
            HttpResponse::ServiceUnavailable()
        };

        response
            .insert_header((header::CACHE_CONTROL, "no-store"))
            .finish()
    }
}

/// Overall service condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
    /// Storage answered the ping.
    Ok,
    /// Storage is unavailable; data endpoints answer 503.
    Degraded,
}

/// Storage section of the health document.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StorageStatusBody {
    pub backend: StorageBackend,
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<StorageStatus> for StorageStatusBody {
    fn from(status: StorageStatus) -> Self {
        Self {
            backend: status.backend,
            connected: status.connected,
            error: status.error,
        }
    }
}

/// Response body for `GET /api/health`.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub success: bool,
    pub status: ServiceStatus,
    pub uptime_seconds: u64,
    pub storage: StorageStatusBody,
}

/// Report uptime and storage connectivity.
///
/// Always answers 200 so dashboards can read the document while degraded.
#[utoipa::path(
    get,
    path = "/api/health",
    tags = ["health"],
    responses(
        (status = 200, description = "Service status", body = HealthResponse)
    ),
    operation_id = "health"
)]
#[get("/health")]
pub async fn health(
    state: web::Data<HttpState>,
    health: web::Data<HealthState>,
) -> HttpResponse {
    let storage = state.storage.storage_status().await;
    let status = if storage.connected {
        ServiceStatus::Ok
    } else {
        ServiceStatus::Degraded
    };
    HttpResponse::Ok()
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .json(HealthResponse {
            success: true,
            status,
            uptime_seconds: health.uptime_seconds(),
            storage: storage.into(),
        })
}

/// Readiness probe. Return 200 when the server can handle traffic; return 503 otherwise.
#[utoipa::path(
    get,
    path = "/health/ready",
    tags = ["health"],
    responses(
        (status = 200, description = "Server is ready to handle traffic"),
        (status = 503, description = "Server is not ready")
    )
)]
#[get("/health/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    HealthState::probe_response(state.is_ready())
}

/// Liveness probe. Return 200 while the process is marked alive and 503 once draining.
#[utoipa::path(
    get,
    path = "/health/live",
    tags = ["health"],
    responses(
        (status = 200, description = "Server is alive"),
        (status = 503, description = "Server is shutting down")
    )
)]
#[get("/health/live")]
pub async fn live(state: web::Data<HealthState>) -> HttpResponse {
    HealthState::probe_response(state.is_alive())
}
