//! Domain primitives, services and ports.
//!
//! Purpose: define strongly typed donor entities, the validation gate and
//! the donation service. Nothing in this module knows about HTTP, Diesel or
//! Redis; adapters reach it through [`ports`].
//!
//! Public surface:
//! - [`Error`] / [`ErrorCode`]: transport-agnostic failures.
//! - [`DonationSubmission`]: the validation gate.
//! - [`DonationService`]: implementation of every driving port.

pub mod donation_service;
pub mod donation_submission;
pub mod donor;
pub mod error;
pub mod ports;
pub mod trace_id;

pub use self::donation_service::DonationService;
pub use self::donation_submission::{DonationSubmission, SubmissionField, SubmissionRejection};
pub use self::donor::{
    AcademicYear, BloodGroup, CLIENT_MAX_DONOR_AGE, DonationStats, Donor, DonorAge,
    DonorAgeError, DonorId, DonorListLimit, DonorName, DonorNameError, DonorSummary,
    GLOBAL_STATS_KEY, MAX_DONOR_AGE, MAX_NAME_CHARS, MIN_DONOR_AGE, MIN_NAME_CHARS, NewDonor,
    ParseAcademicYearError, ParseBloodGroupError,
};
pub use self::error::{Error, ErrorCode, TRACE_ID_HEADER};
pub use self::trace_id::TraceId;
