//! Validated values carried by an hours claim.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Largest claim accepted for a single request.
pub const MAX_HOURS_PER_REQUEST: f64 = 24.0;
/// Maximum description length in characters.
pub const DESCRIPTION_MAX: usize = 500;
/// Maximum rejection reason length in characters.
pub const REJECTION_REASON_MAX: usize = 50;

/// Validation errors for [`ServiceHours`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ServiceHoursValidationError {
    #[error("hours must be a finite number")]
    NotFinite,
    #[error("hours must be greater than zero")]
    NotPositive,
    #[error("hours must not exceed {max}")]
    AboveMaximum { max: f64 },
}

/// A positive, finite number of hours no greater than one day.
///
/// # Examples
/// ```
/// use volunteer_ledger::domain::ServiceHours;
///
/// assert!(ServiceHours::new(2.5).is_ok());
/// assert!(ServiceHours::new(0.0).is_err());
/// assert!(ServiceHours::new(30.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "f64", into = "f64")]
#[schema(value_type = f64, example = 5.0)]
pub struct ServiceHours(f64);

impl ServiceHours {
    /// Validate a raw hours value.
    pub fn new(value: f64) -> Result<Self, ServiceHoursValidationError> {
        if !value.is_finite() {
            return Err(ServiceHoursValidationError::NotFinite);
        }
        if value <= 0.0 {
            return Err(ServiceHoursValidationError::NotPositive);
        }
        if value > MAX_HOURS_PER_REQUEST {
            return Err(ServiceHoursValidationError::AboveMaximum {
                max: MAX_HOURS_PER_REQUEST,
            });
        }
        Ok(Self(value))
    }

    /// Raw value.
    pub const fn get(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for ServiceHours {
    type Error = ServiceHoursValidationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ServiceHours> for f64 {
    fn from(value: ServiceHours) -> Self {
        value.0
    }
}

impl fmt::Display for ServiceHours {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Raised when free text exceeds its limit.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field} must be at most {max} characters")]
pub struct TextTooLongError {
    pub field: &'static str,
    pub max: usize,
}

/// Free-text description of the service performed; may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "Community Outreach")]
pub struct Description(String);

impl Description {
    /// Trim and length-check a description.
    pub fn new(value: impl AsRef<str>) -> Result<Self, TextTooLongError> {
        let trimmed = value.as_ref().trim();
        if trimmed.chars().count() > DESCRIPTION_MAX {
            return Err(TextTooLongError {
                field: "description",
                max: DESCRIPTION_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for Description {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for Description {
    type Error = TextTooLongError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Description> for String {
    fn from(value: Description) -> Self {
        value.0
    }
}

/// Optional reason recorded when a request is rejected.
///
/// ## Invariants
/// - Trimmed and non-empty; blank input means "no reason".
/// - At most 50 characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "Not a recognised activity")]
pub struct RejectionReason(String);

impl RejectionReason {
    /// Normalise an optional raw reason; blank input yields `None`.
    pub fn from_optional(value: Option<&str>) -> Result<Option<Self>, TextTooLongError> {
        let Some(trimmed) = value.map(str::trim).filter(|text| !text.is_empty()) else {
            return Ok(None);
        };
        if trimmed.chars().count() > REJECTION_REASON_MAX {
            return Err(TextTooLongError {
                field: "reason",
                max: REJECTION_REASON_MAX,
            });
        }
        Ok(Some(Self(trimmed.to_owned())))
    }
}

impl AsRef<str> for RejectionReason {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for RejectionReason {
    type Error = TextTooLongError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_optional(Some(&value))?.ok_or(TextTooLongError {
            field: "reason",
            max: REJECTION_REASON_MAX,
        })
    }
}

impl From<RejectionReason> for String {
    fn from(value: RejectionReason) -> Self {
        value.0
    }
}
