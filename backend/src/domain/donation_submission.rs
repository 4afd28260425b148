//! Validation gate for donor submissions.
//!
//! A submission arrives as four loosely-typed text fields. [`DonationSubmission::validate`]
//! applies the rules in a fixed order and stops at the first failure, so the
//! client always sees the most fundamental problem first:
//!
//! 1. every field is present and non-blank;
//! 2. the age is a whole number (`22` or `22.0`) of at least [`MIN_DONOR_AGE`];
//! 3. the age does not exceed [`MAX_DONOR_AGE`];
//! 4. the blood group is exactly one of the eight canonical labels;
//! 5. the academic year is exactly one of the four canonical labels;
//! 6. the trimmed name has at least [`MIN_NAME_CHARS`] characters;
//! 7. the trimmed name has at most [`MAX_NAME_CHARS`] characters.

use serde_json::json;

use crate::domain::donor::{
    AcademicYear, BloodGroup, DonorAge, DonorAgeError, DonorName, DonorNameError, MAX_DONOR_AGE,
    MAX_NAME_CHARS, MIN_DONOR_AGE, MIN_NAME_CHARS, NewDonor,
};
use crate::domain::Error;

/// Raw donor submission before validation.
///
/// `None` and blank strings are both treated as missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DonationSubmission {
    /// Donor name as typed.
    pub full_name: Option<String>,
    /// Blood group label as typed.
    pub blood_group: Option<String>,
    /// Age as text, so numeric and string inputs share one path.
    pub age: Option<String>,
    /// Academic year label as typed.
    pub year: Option<String>,
}

/// Submission field names as they appear on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionField {
    /// `fullName`
    FullName,
    /// `bloodGroup`
    BloodGroup,
    /// `age`
    Age,
    /// `year`
    Year,
}

impl SubmissionField {
    /// Wire name of the field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FullName => "fullName",
            Self::BloodGroup => "bloodGroup",
            Self::Age => "age",
            Self::Year => "year",
        }
    }
}

/// Reason a submission was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionRejection {
    /// At least one field is absent or blank.
    #[error("All fields are required")]
    MissingFields {
        /// Fields that were absent or blank, in form order.
        fields: Vec<SubmissionField>,
    },
    /// Age is not an integer or is below the minimum.
    #[error("Must be at least {} years old", MIN_DONOR_AGE)]
    Underage,
    /// Age exceeds the server ceiling.
    #[error("Age must not exceed {}", MAX_DONOR_AGE)]
    Overage,
    /// Blood group is not a canonical label.
    #[error("Invalid blood group")]
    InvalidBloodGroup,
    /// Academic year is not a canonical label.
    #[error("Invalid year selection")]
    InvalidYear,
    /// Trimmed name is too short.
    #[error("Full name must be at least {} characters", MIN_NAME_CHARS)]
    NameTooShort,
    /// Trimmed name is too long.
    #[error("Full name must not exceed {} characters", MAX_NAME_CHARS)]
    NameTooLong,
}

impl SubmissionRejection {
    /// Stable machine-readable code for clients.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingFields { .. } => "missing_fields",
            Self::Underage => "age_below_minimum",
            Self::Overage => "age_above_maximum",
            Self::InvalidBloodGroup => "invalid_blood_group",
            Self::InvalidYear => "invalid_year",
            Self::NameTooShort => "name_too_short",
            Self::NameTooLong => "name_too_long",
        }
    }

    /// Field the rejection refers to; the first missing one for
    /// [`SubmissionRejection::MissingFields`].
    pub fn field(&self) -> Option<SubmissionField> {
        match self {
            Self::MissingFields { fields } => fields.first().copied(),
            Self::Underage | Self::Overage => Some(SubmissionField::Age),
            Self::InvalidBloodGroup => Some(SubmissionField::BloodGroup),
            Self::InvalidYear => Some(SubmissionField::Year),
            Self::NameTooShort | Self::NameTooLong => Some(SubmissionField::FullName),
        }
    }
}

impl From<SubmissionRejection> for Error {
    fn from(rejection: SubmissionRejection) -> Self {
        let details = match &rejection {
            SubmissionRejection::MissingFields { fields } => json!({
                "field": rejection.field().map(|field| field.as_str()),
                "fields": fields.iter().map(SubmissionField::as_str).collect::<Vec<_>>(),
                "code": rejection.code(),
            }),
            other => json!({
                "field": other.field().map(|field| field.as_str()),
                "code": other.code(),
            }),
        };
        Error::invalid_request(rejection.to_string()).with_details(details)
    }
}

fn present(value: Option<&String>) -> Option<&str> {
    value.map(|raw| raw.trim()).filter(|trimmed| !trimmed.is_empty())
}

/// Parse a whole number, allowing a zero fraction such as `22.0` or `22.`
/// since JSON clients may send ages as floats.
fn parse_whole_years(raw: &str) -> Option<i64> {
    let (whole, fraction) = raw.split_once('.').unwrap_or((raw, ""));
    if !fraction.bytes().all(|digit| digit == b'0') {
        return None;
    }
    whole.parse::<i64>().ok()
}

impl DonationSubmission {
    /// Run the validation gate.
    ///
    /// Pure: performs no I/O and never mutates the submission.
    ///
    /// # Examples
    /// ```
    /// use donor_drive::domain::{BloodGroup, DonationSubmission};
    ///
    /// let submission = DonationSubmission {
    ///     full_name: Some(" Asha Rao ".into()),
    ///     blood_group: Some("O-".into()),
    ///     age: Some("22".into()),
    ///     year: Some("SY".into()),
    /// };
    /// let donor = submission.validate().expect("valid submission");
    /// assert_eq!(donor.full_name.as_ref(), "Asha Rao");
    /// assert_eq!(donor.blood_group, BloodGroup::ONegative);
    /// ```
    pub fn validate(&self) -> Result<NewDonor, SubmissionRejection> {
        let (full_name, blood_group, age, year) = self.required_fields()?;

        let years = parse_whole_years(age).ok_or(SubmissionRejection::Underage)?;
        let age = DonorAge::new(years).map_err(|err| match err {
            DonorAgeError::TooYoung { .. } => SubmissionRejection::Underage,
            DonorAgeError::TooOld { .. } => SubmissionRejection::Overage,
        })?;

        let blood_group = blood_group
            .parse::<BloodGroup>()
            .map_err(|_| SubmissionRejection::InvalidBloodGroup)?;
        let academic_year = year
            .parse::<AcademicYear>()
            .map_err(|_| SubmissionRejection::InvalidYear)?;
        let full_name = DonorName::new(full_name).map_err(|err| match err {
            DonorNameError::TooLong { .. } => SubmissionRejection::NameTooLong,
            DonorNameError::Empty | DonorNameError::TooShort { .. } => {
                SubmissionRejection::NameTooShort
            }
        })?;

        Ok(NewDonor {
            full_name,
            blood_group,
            age,
            academic_year,
        })
    }

    fn required_fields(&self) -> Result<(&str, &str, &str, &str), SubmissionRejection> {
        let full_name = present(self.full_name.as_ref());
        let blood_group = present(self.blood_group.as_ref());
        let age = present(self.age.as_ref());
        let year = present(self.year.as_ref());

        match (full_name, blood_group, age, year) {
            (Some(full_name), Some(_), Some(age), Some(_)) => Ok((
                full_name,
                self.blood_group.as_deref().unwrap_or_default(),
                age,
                self.year.as_deref().unwrap_or_default(),
            )),
            _ => {
                let fields = [
                    (SubmissionField::FullName, full_name),
                    (SubmissionField::BloodGroup, blood_group),
                    (SubmissionField::Age, age),
                    (SubmissionField::Year, year),
                ]
                .into_iter()
                .filter_map(|(field, value)| value.is_none().then_some(field))
                .collect();
                Err(SubmissionRejection::MissingFields { fields })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    //! Validation gate coverage, including rule ordering.

    use super::*;
    use crate::domain::ErrorCode;
    use rstest::{fixture, rstest};

    #[fixture]
    fn valid() -> DonationSubmission {
        DonationSubmission {
            full_name: Some("Asha Rao".to_owned()),
            blood_group: Some("O-".to_owned()),
            age: Some("22".to_owned()),
            year: Some("SY".to_owned()),
        }
    }

    #[rstest]
    fn accepts_valid_submission(valid: DonationSubmission) {
        let donor = valid.validate().expect("valid submission");
        assert_eq!(donor.full_name.as_ref(), "Asha Rao");
        assert_eq!(donor.blood_group, BloodGroup::ONegative);
        assert_eq!(donor.age.years(), 22);
        assert_eq!(donor.academic_year, AcademicYear::Second);
    }

    #[rstest]
    #[case::name(SubmissionField::FullName)]
    #[case::blood_group(SubmissionField::BloodGroup)]
    #[case::age(SubmissionField::Age)]
    #[case::year(SubmissionField::Year)]
    fn rejects_each_missing_field(valid: DonationSubmission, #[case] missing: SubmissionField) {
        let mut submission = valid;
        match missing {
            SubmissionField::FullName => submission.full_name = None,
            SubmissionField::BloodGroup => submission.blood_group = Some("   ".to_owned()),
            SubmissionField::Age => submission.age = Some(String::new()),
            SubmissionField::Year => submission.year = None,
        }

        let rejection = submission.validate().expect_err("missing field");

        assert_eq!(
            rejection,
            SubmissionRejection::MissingFields {
                fields: vec![missing]
            }
        );
        assert_eq!(rejection.to_string(), "All fields are required");
    }

    #[rstest]
    fn missing_fields_take_priority_over_invalid_values() {
        let submission = DonationSubmission {
            full_name: None,
            blood_group: Some("Z+".to_owned()),
            age: Some("3".to_owned()),
            year: None,
        };

        let rejection = submission.validate().expect_err("missing fields");

        assert_eq!(
            rejection,
            SubmissionRejection::MissingFields {
                fields: vec![SubmissionField::FullName, SubmissionField::Year]
            }
        );
    }

    #[rstest]
    #[case("17")]
    #[case("0")]
    #[case("-20")]
    #[case("twenty")]
    #[case("18.5")]
    #[case("22.05")]
    #[case("17.0")]
    #[case(".0")]
    #[case("1e2")]
    fn rejects_underage_or_non_integer_ages(valid: DonationSubmission, #[case] age: &str) {
        let submission = DonationSubmission {
            age: Some(age.to_owned()),
            ..valid
        };
        let rejection = submission.validate().expect_err("age rejected");
        assert_eq!(rejection, SubmissionRejection::Underage);
        assert_eq!(rejection.to_string(), "Must be at least 18 years old");
    }

    #[rstest]
    #[case("18")]
    #[case(" 18 ")]
    #[case("65")]
    #[case("100")]
    fn accepts_boundary_ages(valid: DonationSubmission, #[case] age: &str) {
        let submission = DonationSubmission {
            age: Some(age.to_owned()),
            ..valid
        };
        assert!(submission.validate().is_ok());
    }

    #[rstest]
    #[case("22.0", 22)]
    #[case("22.", 22)]
    #[case("18.000", 18)]
    #[case("100.0", 100)]
    fn accepts_whole_ages_written_as_decimals(
        valid: DonationSubmission,
        #[case] age: &str,
        #[case] expected: u8,
    ) {
        let submission = DonationSubmission {
            age: Some(age.to_owned()),
            ..valid
        };
        let donor = submission.validate().expect("whole-number age accepted");
        assert_eq!(donor.age.years(), expected);
    }

    #[rstest]
    fn decimal_ages_above_the_ceiling_are_overage(valid: DonationSubmission) {
        let submission = DonationSubmission {
            age: Some("101.0".to_owned()),
            ..valid
        };
        assert_eq!(submission.validate(), Err(SubmissionRejection::Overage));
    }

    #[rstest]
    fn rejects_ages_above_server_ceiling(valid: DonationSubmission) {
        let submission = DonationSubmission {
            age: Some("101".to_owned()),
            ..valid
        };
        let rejection = submission.validate().expect_err("too old");
        assert_eq!(rejection.to_string(), "Age must not exceed 100");
    }

    #[rstest]
    #[case("a+")]
    #[case("o-")]
    #[case("AB")]
    #[case("C+")]
    fn rejects_non_canonical_blood_groups(valid: DonationSubmission, #[case] group: &str) {
        let submission = DonationSubmission {
            blood_group: Some(group.to_owned()),
            ..valid
        };
        let rejection = submission.validate().expect_err("invalid group");
        assert_eq!(rejection, SubmissionRejection::InvalidBloodGroup);
        assert_eq!(rejection.to_string(), "Invalid blood group");
    }

    #[rstest]
    fn blood_group_match_is_not_trimmed(valid: DonationSubmission) {
        let submission = DonationSubmission {
            blood_group: Some("O- ".to_owned()),
            ..valid
        };
        assert_eq!(
            submission.validate(),
            Err(SubmissionRejection::InvalidBloodGroup)
        );
    }

    #[rstest]
    fn age_is_checked_before_blood_group(valid: DonationSubmission) {
        let submission = DonationSubmission {
            age: Some("16".to_owned()),
            blood_group: Some("a+".to_owned()),
            ..valid
        };
        assert_eq!(submission.validate(), Err(SubmissionRejection::Underage));
    }

    #[rstest]
    fn blood_group_is_checked_before_year(valid: DonationSubmission) {
        let submission = DonationSubmission {
            blood_group: Some("a+".to_owned()),
            year: Some("5th".to_owned()),
            ..valid
        };
        assert_eq!(
            submission.validate(),
            Err(SubmissionRejection::InvalidBloodGroup)
        );
    }

    #[rstest]
    fn rejects_unknown_years(valid: DonationSubmission) {
        let submission = DonationSubmission {
            year: Some("Fourth Year".to_owned()),
            ..valid
        };
        let rejection = submission.validate().expect_err("invalid year");
        assert_eq!(rejection.to_string(), "Invalid year selection");
    }

    #[rstest]
    fn rejects_single_character_names(valid: DonationSubmission) {
        let submission = DonationSubmission {
            full_name: Some("  A ".to_owned()),
            ..valid
        };
        assert_eq!(submission.validate(), Err(SubmissionRejection::NameTooShort));
    }

    #[rstest]
    #[case(MAX_NAME_CHARS, None)]
    #[case(MAX_NAME_CHARS + 1, Some(SubmissionRejection::NameTooLong))]
    #[case(250, Some(SubmissionRejection::NameTooLong))]
    fn name_length_is_capped(
        valid: DonationSubmission,
        #[case] chars: usize,
        #[case] expected: Option<SubmissionRejection>,
    ) {
        let submission = DonationSubmission {
            full_name: Some("a".repeat(chars)),
            ..valid
        };
        assert_eq!(submission.validate().err(), expected);
    }

    #[rstest]
    fn long_names_report_the_name_field() {
        let error = Error::from(SubmissionRejection::NameTooLong);
        assert_eq!(error.message(), "Full name must not exceed 200 characters");
        assert_eq!(
            error.details(),
            Some(&json!({"field": "fullName", "code": "name_too_long"}))
        );
    }

    #[rstest]
    fn rejection_maps_to_invalid_request_with_details() {
        let error = Error::from(SubmissionRejection::InvalidBloodGroup);
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        assert_eq!(error.message(), "Invalid blood group");
        assert_eq!(
            error.details(),
            Some(&json!({"field": "bloodGroup", "code": "invalid_blood_group"}))
        );
    }

    #[rstest]
    fn missing_fields_rejection_lists_every_field() {
        let error = Error::from(SubmissionRejection::MissingFields {
            fields: vec![SubmissionField::Age, SubmissionField::Year],
        });
        assert_eq!(
            error.details(),
            Some(&json!({"field": "age", "fields": ["age", "year"], "code": "missing_fields"}))
        );
    }
}
