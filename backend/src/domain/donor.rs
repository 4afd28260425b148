//! Donor records, the donation aggregate and their value types.
//!
//! Donor records are immutable once stored. The aggregate is a cached count
//! of donor records that the reconciler can rebuild from scratch.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Youngest age the server accepts.
pub const MIN_DONOR_AGE: u8 = 18;
/// Oldest age the server accepts.
pub const MAX_DONOR_AGE: u8 = 100;
/// Ceiling applied by the public registration form.
///
/// The server does not enforce it; submissions between this value and
/// [`MAX_DONOR_AGE`] are accepted.
pub const CLIENT_MAX_DONOR_AGE: u8 = 65;
/// Minimum number of characters in a trimmed donor name.
pub const MIN_NAME_CHARS: usize = 2;
/// Maximum number of characters in a trimmed donor name.
///
/// Matches the width of the relational `full_name` column so every backend
/// accepts the same names.
pub const MAX_NAME_CHARS: usize = 200;

/// ABO/Rh blood group.
///
/// Parsing is case-sensitive: `a+` is not a blood group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum BloodGroup {
    /// A+
    #[serde(rename = "A+")]
    APositive,
    /// A-
    #[serde(rename = "A-")]
    ANegative,
    /// B+
    #[serde(rename = "B+")]
    BPositive,
    /// B-
    #[serde(rename = "B-")]
    BNegative,
    /// AB+
    #[serde(rename = "AB+")]
    AbPositive,
    /// AB-
    #[serde(rename = "AB-")]
    AbNegative,
    /// O+
    #[serde(rename = "O+")]
    OPositive,
    /// O-
    #[serde(rename = "O-")]
    ONegative,
}

impl BloodGroup {
    /// Every accepted blood group, in form order.
    pub const ALL: [Self; 8] = [
        Self::APositive,
        Self::ANegative,
        Self::BPositive,
        Self::BNegative,
        Self::AbPositive,
        Self::AbNegative,
        Self::OPositive,
        Self::ONegative,
    ];

    /// Canonical label, as stored and rendered.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::APositive => "A+",
            Self::ANegative => "A-",
            Self::BPositive => "B+",
            Self::BNegative => "B-",
            Self::AbPositive => "AB+",
            Self::AbNegative => "AB-",
            Self::OPositive => "O+",
            Self::ONegative => "O-",
        }
    }
}

impl fmt::Display for BloodGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse error for [`BloodGroup`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseBloodGroupError {
    /// Rejected input.
    pub input: String,
}

impl fmt::Display for ParseBloodGroupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid blood group: {}", self.input)
    }
}

impl std::error::Error for ParseBloodGroupError {}

impl FromStr for BloodGroup {
    type Err = ParseBloodGroupError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|group| group.as_str() == value)
            .ok_or_else(|| ParseBloodGroupError {
                input: value.to_owned(),
            })
    }
}

/// Academic year of the donor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum AcademicYear {
    /// First year.
    #[serde(rename = "FY")]
    First,
    /// Second year.
    #[serde(rename = "SY")]
    Second,
    /// Third year.
    #[serde(rename = "TY")]
    Third,
    /// Final year.
    #[serde(rename = "Final Year")]
    Final,
}

impl AcademicYear {
    /// Every accepted academic year.
    pub const ALL: [Self; 4] = [Self::First, Self::Second, Self::Third, Self::Final];

    /// Canonical label, as stored and rendered.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::First => "FY",
            Self::Second => "SY",
            Self::Third => "TY",
            Self::Final => "Final Year",
        }
    }
}

impl fmt::Display for AcademicYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse error for [`AcademicYear`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseAcademicYearError {
    /// Rejected input.
    pub input: String,
}

impl fmt::Display for ParseAcademicYearError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid academic year: {}", self.input)
    }
}

impl std::error::Error for ParseAcademicYearError {}

impl FromStr for AcademicYear {
    type Err = ParseAcademicYearError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "FY" => Ok(Self::First),
            "SY" => Ok(Self::Second),
            "TY" => Ok(Self::Third),
            "Final Year" => Ok(Self::Final),
            _ => Err(ParseAcademicYearError {
                input: value.to_owned(),
            }),
        }
    }
}

/// Validation errors for [`DonorName`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DonorNameError {
    /// The name was empty after trimming.
    #[error("donor name must not be empty")]
    Empty,
    /// The trimmed name is shorter than [`MIN_NAME_CHARS`].
    #[error("donor name must contain at least {min} characters")]
    TooShort {
        /// Required minimum.
        min: usize,
    },
    /// The trimmed name is longer than [`MAX_NAME_CHARS`].
    #[error("donor name must not exceed {max} characters")]
    TooLong {
        /// Accepted maximum.
        max: usize,
    },
}

/// Trimmed donor name of [`MIN_NAME_CHARS`] to [`MAX_NAME_CHARS`] characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DonorName(String);

impl DonorName {
    /// Trim and validate a raw name.
    ///
    /// # Examples
    /// ```
    /// use donor_drive::domain::DonorName;
    ///
    /// let name = DonorName::new("  Asha Rao ").expect("valid name");
    /// assert_eq!(name.as_ref(), "Asha Rao");
    /// ```
    pub fn new(raw: impl AsRef<str>) -> Result<Self, DonorNameError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(DonorNameError::Empty);
        }
        let chars = trimmed.chars().count();
        if chars < MIN_NAME_CHARS {
            return Err(DonorNameError::TooShort {
                min: MIN_NAME_CHARS,
            });
        }
        if chars > MAX_NAME_CHARS {
            return Err(DonorNameError::TooLong {
                max: MAX_NAME_CHARS,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Consume the wrapper, returning the owned string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for DonorName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for DonorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validation errors for [`DonorAge`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DonorAgeError {
    /// Below [`MIN_DONOR_AGE`].
    #[error("donor must be at least {min} years old")]
    TooYoung {
        /// Required minimum.
        min: u8,
    },
    /// Above [`MAX_DONOR_AGE`].
    #[error("donor age must not exceed {max}")]
    TooOld {
        /// Accepted maximum.
        max: u8,
    },
}

/// Donor age in whole years, within the server's accepted range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DonorAge(u8);

impl DonorAge {
    /// Validate an age against [`MIN_DONOR_AGE`] and [`MAX_DONOR_AGE`].
    pub fn new(years: i64) -> Result<Self, DonorAgeError> {
        if years < i64::from(MIN_DONOR_AGE) {
            return Err(DonorAgeError::TooYoung { min: MIN_DONOR_AGE });
        }
        u8::try_from(years)
            .ok()
            .filter(|age| *age <= MAX_DONOR_AGE)
            .map(Self)
            .ok_or(DonorAgeError::TooOld { max: MAX_DONOR_AGE })
    }

    /// Age in years.
    pub fn years(self) -> u8 {
        self.0
    }

    /// Whether the age exceeds the registration form's advisory ceiling.
    pub fn exceeds_client_ceiling(self) -> bool {
        self.0 > CLIENT_MAX_DONOR_AGE
    }
}

/// Opaque donor identifier assigned by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DonorId(Uuid);

impl DonorId {
    /// Generate a fresh identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for DonorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated submission ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDonor {
    /// Trimmed donor name.
    pub full_name: DonorName,
    /// Blood group.
    pub blood_group: BloodGroup,
    /// Age in years.
    pub age: DonorAge,
    /// Academic year.
    pub academic_year: AcademicYear,
}

/// A stored donor record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Donor {
    id: DonorId,
    full_name: DonorName,
    blood_group: BloodGroup,
    age: DonorAge,
    academic_year: AcademicYear,
    donated_at: DateTime<Utc>,
}

impl Donor {
    /// Stamp a validated submission with its identity and donation time.
    pub fn new(id: DonorId, donor: NewDonor, donated_at: DateTime<Utc>) -> Self {
        let NewDonor {
            full_name,
            blood_group,
            age,
            academic_year,
        } = donor;
        Self {
            id,
            full_name,
            blood_group,
            age,
            academic_year,
            donated_at,
        }
    }

    /// Server-assigned identifier.
    pub fn id(&self) -> DonorId {
        self.id
    }

    /// Trimmed donor name.
    pub fn full_name(&self) -> &DonorName {
        &self.full_name
    }

    /// Blood group.
    pub fn blood_group(&self) -> BloodGroup {
        self.blood_group
    }

    /// Age in years.
    pub fn age(&self) -> DonorAge {
        self.age
    }

    /// Academic year.
    pub fn academic_year(&self) -> AcademicYear {
        self.academic_year
    }

    /// Server-assigned donation time.
    pub fn donated_at(&self) -> DateTime<Utc> {
        self.donated_at
    }

    /// Project the record to the fields shown on the roster.
    pub fn summary(&self) -> DonorSummary {
        DonorSummary {
            full_name: self.full_name.to_string(),
            blood_group: self.blood_group,
            donated_at: self.donated_at,
        }
    }
}

/// Roster projection of a donor record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DonorSummary {
    /// Donor name.
    pub full_name: String,
    /// Blood group.
    pub blood_group: BloodGroup,
    /// Donation time.
    pub donated_at: DateTime<Utc>,
}

/// The `global` donation aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DonationStats {
    /// Number of units collected; one per donor record.
    pub total_blood_units: u64,
    /// Last time the total changed, absent before the first write.
    pub last_updated: Option<DateTime<Utc>>,
}

/// Key of the singleton aggregate record.
pub const GLOBAL_STATS_KEY: &str = "global";

/// Bounded page size for the donor roster.
///
/// Missing, unparseable or non-positive requests fall back to
/// [`DonorListLimit::DEFAULT`]; larger requests are clamped to the
/// configured ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DonorListLimit(usize);

impl DonorListLimit {
    /// Page size when none is requested.
    pub const DEFAULT: usize = 10;
    /// Ceiling used when the deployment does not configure one.
    pub const DEFAULT_MAX: usize = 100;

    /// Clamp a requested size into `1..=max`.
    ///
    /// # Examples
    /// ```
    /// use donor_drive::domain::DonorListLimit;
    ///
    /// assert_eq!(DonorListLimit::new(500, 100).get(), 100);
    /// assert_eq!(DonorListLimit::new(0, 100).get(), 10);
    /// ```
    pub fn new(requested: usize, max: usize) -> Self {
        let max = max.max(1);
        if requested == 0 {
            return Self(Self::DEFAULT.min(max));
        }
        Self(requested.min(max))
    }

    /// Interpret a raw query-string value.
    pub fn from_query(raw: Option<&str>, max: usize) -> Self {
        let requested = raw
            .and_then(|value| value.trim().parse::<i64>().ok())
            .filter(|value| *value >= 1)
            .map_or(Self::DEFAULT, |value| {
                usize::try_from(value).unwrap_or(usize::MAX)
            });
        Self::new(requested, max)
    }

    /// Page size.
    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for DonorListLimit {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}
