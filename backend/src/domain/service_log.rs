//! Immutable service log entries and student summaries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    AccountId, Description, LogEntryId, RequestId, ServiceHours, StaffId, StudentId, Username,
};

/// A confirmed, append-only record of hours served.
///
/// Exactly one entry exists per approved request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceLogEntry {
    pub id: LogEntryId,
    pub request_id: RequestId,
    pub student_id: StudentId,
    pub staff_id: StaffId,
    pub hours: ServiceHours,
    pub description: Description,
    pub logged_at: DateTime<Utc>,
}

/// Student profile joined with its account name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentSummary {
    pub student_id: StudentId,
    pub account_id: AccountId,
    pub username: Username,
    /// Cached sum of the student's logged hours.
    pub total_hours: f64,
}

/// Staff profile joined with its account name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StaffSummary {
    pub staff_id: StaffId,
    pub account_id: AccountId,
    pub username: Username,
}
