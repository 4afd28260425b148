//! HTTP adapter mapping for domain errors.
//!
//! Purpose: keep the domain error type HTTP-agnostic while allowing Actix
//! handlers to turn domain failures into the `{success:false, ...}` JSON
//! envelope and matching status codes.

use actix_web::error::JsonPayloadError;
use actix_web::{HttpRequest, HttpResponse, ResponseError, http::StatusCode, web};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::{error, warn};
use utoipa::ToSchema;

use crate::domain::donation_service::INTERNAL_ERROR_MESSAGE;
use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Whether internal failure detail reaches clients.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DiagnosticsMode {
    /// Only the generic message is returned.
    #[default]
    Redacted,
    /// The internal diagnostic is attached as `error` on 5xx responses.
    Verbose,
}

impl DiagnosticsMode {
    /// Map the `verbose_errors` setting.
    pub fn from_verbose(verbose: bool) -> Self {
        if verbose { Self::Verbose } else { Self::Redacted }
    }
}

/// Failure envelope returned by every endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    /// Always `false`.
    pub success: bool,
    /// Human-readable reason.
    #[schema(example = "Must be at least 18 years old")]
    pub message: String,
    /// Failure category.
    pub code: ErrorCode,
    /// Request trace identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    /// Structured detail, e.g. `{"field": "age", "code": "underage"}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<serde_json::Value>)]
    pub details: Option<Value>,
    /// Internal detail, only in verbose diagnostics mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Domain error paired with the diagnostics policy used to render it.
#[derive(Debug, Clone)]
pub struct ApiError {
    error: Error,
    diagnostics: DiagnosticsMode,
}

impl ApiError {
    /// Wrap a domain error for rendering under `diagnostics`.
    pub fn new(error: Error, diagnostics: DiagnosticsMode) -> Self {
        Self { error, diagnostics }
    }

    /// Underlying domain error.
    pub fn error(&self) -> &Error {
        &self.error
    }

    fn envelope(&self) -> ErrorEnvelope {
        let error = &self.error;
        let internal = matches!(error.code(), ErrorCode::InternalError);
        let message = if internal {
            INTERNAL_ERROR_MESSAGE.to_owned()
        } else {
            error.message().to_owned()
        };
        let verbose_detail = match (self.diagnostics, self.status_code().is_server_error()) {
            (DiagnosticsMode::Verbose, true) => Some(
                error
                    .diagnostic()
                    .map_or_else(|| error.message().to_owned(), str::to_owned),
            ),
            _ => None,
        };
        ErrorEnvelope {
            success: false,
            message,
            code: error.code(),
            trace_id: error.trace_id().map(str::to_owned),
            details: if internal { None } else { error.details().cloned() },
            error: verbose_detail,
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        Self::new(error, DiagnosticsMode::Redacted)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.error, f)
    }
}

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        status_for(self.error.code())
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!(
                code = ?self.error.code(),
                trace_id = self.error.trace_id().unwrap_or_default(),
                error = self.error.diagnostic().unwrap_or(self.error.message()),
                "request failed"
            );
        }

        let mut builder = HttpResponse::build(status);
        if let Some(id) = self.error.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        builder.json(self.envelope())
    }
}

/// Render malformed JSON bodies with the standard envelope.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    warn!(error = %err, "rejected malformed JSON body");
    let message = match &err {
        JsonPayloadError::ContentType => "Content type must be application/json",
        JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
            "Request body is too large"
        }
        _ => "Request body must be valid JSON",
    };
    ApiError::from(Error::invalid_request(message).with_diagnostic(err.to_string())).into()
}

/// JSON extractor configuration used by every JSON endpoint.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(json_error_handler)
}
