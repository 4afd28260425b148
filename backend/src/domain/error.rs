//! Transport-agnostic failures returned by the driving ports.
//!
//! The HTTP adapter turns an [`Error`] into the `{success: false, ...}`
//! envelope; the CLI binaries render it through `color-eyre`.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::domain::TraceId;

/// Header used to propagate the request trace identifier to clients.
pub const TRACE_ID_HEADER: &str = "trace-id";

/// Failure category, serialised as the envelope `code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The submission failed validation or the body was malformed.
    InvalidRequest,
    /// The donor store is not configured, unreachable or shut down.
    ServiceUnavailable,
    /// Anything else; details stay in the logs.
    InternalError,
}

impl ErrorCode {
    fn fallback_message(self) -> &'static str {
        match self {
            Self::InvalidRequest => "Invalid request",
            Self::ServiceUnavailable => "Service unavailable",
            Self::InternalError => "Internal server error",
        }
    }
}

/// Domain failure with a client-facing message.
///
/// The trace identifier active at construction is captured automatically.
/// `diagnostic` holds internal detail such as a driver message; it is shown
/// to clients only when the HTTP adapter runs with verbose diagnostics.
///
/// ```
/// use donor_drive::domain::{Error, ErrorCode};
///
/// let err = Error::invalid_request("All fields are required");
/// assert_eq!(err.code(), ErrorCode::InvalidRequest);
/// assert_eq!(err.to_string(), "All fields are required");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    code: ErrorCode,
    message: String,
    trace_id: Option<String>,
    details: Option<Value>,
    diagnostic: Option<String>,
}

impl Error {
    fn with_code(code: ErrorCode, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            code.fallback_message().to_owned()
        } else {
            message
        };
        Self {
            code,
            message,
            trace_id: TraceId::current().map(|id| id.to_string()),
            details: None,
            diagnostic: None,
        }
    }

    /// Validation failure; the message is shown to the donor.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::with_code(ErrorCode::InvalidRequest, message)
    }

    /// The donor store cannot be reached.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::with_code(ErrorCode::ServiceUnavailable, message)
    }

    /// Unexpected failure.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::with_code(ErrorCode::InternalError, message)
    }

    /// Failure category.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Client-facing message.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Trace identifier captured at construction.
    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    /// Structured detail, e.g. the rejected field and rule code.
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Internal detail for logs and verbose diagnostics.
    pub fn diagnostic(&self) -> Option<&str> {
        self.diagnostic.as_deref()
    }

    /// Attach structured detail.
    ///
    /// ```
    /// use donor_drive::domain::Error;
    /// use serde_json::json;
    ///
    /// let err = Error::invalid_request("Invalid blood group")
    ///     .with_details(json!({ "field": "bloodGroup", "code": "invalid_blood_group" }));
    /// assert_eq!(err.details().and_then(|d| d["field"].as_str()), Some("bloodGroup"));
    /// ```
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Attach internal diagnostic text.
    #[must_use]
    pub fn with_diagnostic(mut self, diagnostic: impl Into<String>) -> Self {
        self.diagnostic = Some(diagnostic.into());
        self
    }

    /// Replace the captured trace identifier. Blank values are ignored.
    #[must_use]
    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        let trace_id = trace_id.into();
        if !trace_id.trim().is_empty() {
            self.trace_id = Some(trace_id);
        }
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.diagnostic {
            Some(diagnostic) => write!(f, "{}: {diagnostic}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for Error {}
