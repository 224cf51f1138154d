//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Decoding a row back into a domain record
//! re-runs the domain validation, so a row that violates an invariant
//! surfaces as a [`RowDecodeError`] instead of a malformed value.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::domain::{
    Accolade, AccoladeKind, Account, ConfirmationRequest, ConfirmationRequestDraft, Description,
    PasswordHash, RejectionReason, RequestStatus, Role, ServiceHours, ServiceLogEntry,
    StaffSummary, StoredAccount, StudentSummary, Username,
};

use super::schema::{
    accolades, accounts, confirmation_requests, service_log_entries, staff_profiles,
    student_profiles,
};

/// A stored row that no longer satisfies the domain rules.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("stored {table} row {id} is invalid: {message}")]
pub(crate) struct RowDecodeError {
    table: &'static str,
    id: i64,
    message: String,
}

impl RowDecodeError {
    fn new(table: &'static str, id: i64, error: impl std::fmt::Display) -> Self {
        Self {
            table,
            id,
            message: error.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = accounts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AccountRow {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for StoredAccount {
    type Error = RowDecodeError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let decode = |err: &dyn std::fmt::Display| RowDecodeError::new("accounts", row.id, err);
        let username = Username::new(&row.username).map_err(|err| decode(&err))?;
        let role: Role = row.role.parse().map_err(|err| decode(&err))?;
        let password_hash = PasswordHash::parse(row.password_hash.as_str()).map_err(|err| decode(&err))?;
        Ok(Self {
            account: Account {
                id: row.id.into(),
                username,
                role,
                created_at: row.created_at,
            },
            password_hash,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = accounts)]
pub(crate) struct NewAccountRow<'a> {
    pub username: &'a str,
    pub password_hash: &'a str,
    pub role: &'a str,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Profiles
// ---------------------------------------------------------------------------

/// Student profile joined with its account username.
#[derive(Debug, Clone, Queryable)]
pub(crate) struct StudentSummaryRow {
    pub id: i64,
    pub account_id: i64,
    pub username: String,
    pub total_hours: f64,
}

impl TryFrom<StudentSummaryRow> for StudentSummary {
    type Error = RowDecodeError;

    fn try_from(row: StudentSummaryRow) -> Result<Self, Self::Error> {
        let username = Username::new(&row.username)
            .map_err(|err| RowDecodeError::new("student_profiles", row.id, err))?;
        Ok(Self {
            student_id: row.id.into(),
            account_id: row.account_id.into(),
            username,
            total_hours: row.total_hours,
        })
    }
}

/// Staff profile joined with its account username.
#[derive(Debug, Clone, Queryable)]
pub(crate) struct StaffSummaryRow {
    pub id: i64,
    pub account_id: i64,
    pub username: String,
}

impl TryFrom<StaffSummaryRow> for StaffSummary {
    type Error = RowDecodeError;

    fn try_from(row: StaffSummaryRow) -> Result<Self, Self::Error> {
        let username = Username::new(&row.username)
            .map_err(|err| RowDecodeError::new("staff_profiles", row.id, err))?;
        Ok(Self {
            staff_id: row.id.into(),
            account_id: row.account_id.into(),
            username,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = student_profiles)]
pub(crate) struct NewStudentProfileRow {
    pub account_id: i64,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = staff_profiles)]
pub(crate) struct NewStaffProfileRow {
    pub account_id: i64,
}

// ---------------------------------------------------------------------------
// Confirmation requests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = confirmation_requests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ConfirmationRequestRow {
    pub id: i64,
    pub student_id: i64,
    pub staff_id: Option<i64>,
    pub hours: f64,
    pub description: String,
    pub status: String,
    pub requested_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
    pub reason: Option<String>,
}

impl TryFrom<ConfirmationRequestRow> for ConfirmationRequest {
    type Error = RowDecodeError;

    fn try_from(row: ConfirmationRequestRow) -> Result<Self, Self::Error> {
        let decode =
            |err: &dyn std::fmt::Display| RowDecodeError::new("confirmation_requests", row.id, err);
        let draft = ConfirmationRequestDraft {
            id: row.id.into(),
            student_id: row.student_id.into(),
            staff_id: row.staff_id.map(Into::into),
            hours: ServiceHours::new(row.hours).map_err(|err| decode(&err))?,
            description: Description::new(&row.description).map_err(|err| decode(&err))?,
            status: row
                .status
                .parse::<RequestStatus>()
                .map_err(|err| decode(&err))?,
            requested_at: row.requested_at,
            responded_at: row.responded_at,
            reason: RejectionReason::from_optional(row.reason.as_deref())
                .map_err(|err| decode(&err))?,
        };
        Self::try_from(draft).map_err(|err| decode(&err))
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = confirmation_requests)]
pub(crate) struct NewConfirmationRequestRow<'a> {
    pub student_id: i64,
    pub hours: f64,
    pub description: &'a str,
    pub status: &'a str,
    pub requested_at: DateTime<Utc>,
}

/// Columns written when a pending request is resolved.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = confirmation_requests)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct ResolutionChangeset<'a> {
    pub status: &'a str,
    pub staff_id: Option<i64>,
    pub responded_at: Option<DateTime<Utc>>,
    pub reason: Option<&'a str>,
}

// ---------------------------------------------------------------------------
// Service log
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = service_log_entries)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ServiceLogEntryRow {
    pub id: i64,
    pub request_id: i64,
    pub student_id: i64,
    pub staff_id: i64,
    pub hours: f64,
    pub description: String,
    pub logged_at: DateTime<Utc>,
}

impl TryFrom<ServiceLogEntryRow> for ServiceLogEntry {
    type Error = RowDecodeError;

    fn try_from(row: ServiceLogEntryRow) -> Result<Self, Self::Error> {
        let decode =
            |err: &dyn std::fmt::Display| RowDecodeError::new("service_log_entries", row.id, err);
        Ok(Self {
            id: row.id.into(),
            request_id: row.request_id.into(),
            student_id: row.student_id.into(),
            staff_id: row.staff_id.into(),
            hours: ServiceHours::new(row.hours).map_err(|err| decode(&err))?,
            description: Description::new(&row.description).map_err(|err| decode(&err))?,
            logged_at: row.logged_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = service_log_entries)]
pub(crate) struct NewServiceLogEntryRow<'a> {
    pub request_id: i64,
    pub student_id: i64,
    pub staff_id: i64,
    pub hours: f64,
    pub description: &'a str,
    pub logged_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Accolades
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = accolades)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AccoladeRow {
    pub id: i64,
    pub student_id: i64,
    pub accolade_type: String,
    pub awarded_at: DateTime<Utc>,
}

impl TryFrom<AccoladeRow> for Accolade {
    type Error = RowDecodeError;

    fn try_from(row: AccoladeRow) -> Result<Self, Self::Error> {
        let accolade_type: AccoladeKind = row
            .accolade_type
            .parse()
            .map_err(|err| RowDecodeError::new("accolades", row.id, err))?;
        Ok(Self {
            id: row.id.into(),
            student_id: row.student_id.into(),
            accolade_type,
            awarded_at: row.awarded_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = accolades)]
pub(crate) struct NewAccoladeRow<'a> {
    pub student_id: i64,
    pub accolade_type: &'a str,
    pub awarded_at: DateTime<Utc>,
}

/// Decode a batch of rows, failing on the first invalid one.
pub(crate) fn decode_rows<R, T>(rows: Vec<R>) -> Result<Vec<T>, RowDecodeError>
where
    T: TryFrom<R, Error = RowDecodeError>,
{
    rows.into_iter().map(T::try_from).collect()
}
