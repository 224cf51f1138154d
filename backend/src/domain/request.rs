//! Confirmation requests and their lifecycle.
//!
//! A request starts `pending` and is resolved exactly once, by a staff member,
//! into `approved` or `rejected`. Terminal states never change.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Description, RejectionReason, RequestId, ServiceHours, StaffId, StudentId};

/// Lifecycle state of a confirmation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    /// Awaiting a staff decision.
    Pending,
    /// Hours were confirmed and logged.
    Approved,
    /// Hours were declined.
    Rejected,
}

impl RequestStatus {
    /// Storage and wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Whether no further transition is allowed.
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a stored status string is unknown.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown request status: {0}")]
pub struct UnknownStatusError(pub String);

impl FromStr for RequestStatus {
    type Err = UnknownStatusError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(UnknownStatusError(other.to_owned())),
        }
    }
}

/// Errors raised when a request's fields contradict its status.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestValidationError {
    #[error("pending request must not carry a reviewer, response time or reason")]
    PendingWithResolution,
    #[error("{status} request must record the reviewer and response time")]
    ResolvedWithoutReviewer { status: RequestStatus },
    #[error("only rejected requests may carry a reason")]
    ReasonOnApproval,
}

/// Raised when a transition is attempted from a terminal state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("request {request_id} is already {status}")]
pub struct NotPendingError {
    pub request_id: RequestId,
    pub status: RequestStatus,
}

/// Unvalidated request fields, typically read back from storage.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmationRequestDraft {
    pub id: RequestId,
    pub student_id: StudentId,
    pub staff_id: Option<StaffId>,
    pub hours: ServiceHours,
    pub description: Description,
    pub status: RequestStatus,
    pub requested_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
    pub reason: Option<RejectionReason>,
}

/// A student's claim of service hours.
///
/// ## Invariants
/// - `pending` requests have no reviewer, response time or reason.
/// - Resolved requests always record the reviewer and response time.
/// - Only `rejected` requests may carry a reason.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationRequest {
    id: RequestId,
    student_id: StudentId,
    #[serde(skip_serializing_if = "Option::is_none")]
    staff_id: Option<StaffId>,
    hours: ServiceHours,
    description: Description,
    status: RequestStatus,
    requested_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    responded_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<RejectionReason>,
}

impl TryFrom<ConfirmationRequestDraft> for ConfirmationRequest {
    type Error = RequestValidationError;

    fn try_from(draft: ConfirmationRequestDraft) -> Result<Self, Self::Error> {
        match draft.status {
            RequestStatus::Pending => {
                if draft.staff_id.is_some() || draft.responded_at.is_some() || draft.reason.is_some()
                {
                    return Err(RequestValidationError::PendingWithResolution);
                }
            }
            status => {
                if draft.staff_id.is_none() || draft.responded_at.is_none() {
                    return Err(RequestValidationError::ResolvedWithoutReviewer { status });
                }
                if status == RequestStatus::Approved && draft.reason.is_some() {
                    return Err(RequestValidationError::ReasonOnApproval);
                }
            }
        }
        Ok(Self {
            id: draft.id,
            student_id: draft.student_id,
            staff_id: draft.staff_id,
            hours: draft.hours,
            description: draft.description,
            status: draft.status,
            requested_at: draft.requested_at,
            responded_at: draft.responded_at,
            reason: draft.reason,
        })
    }
}

impl ConfirmationRequest {
    /// A freshly submitted request.
    pub fn pending(
        id: RequestId,
        student_id: StudentId,
        hours: ServiceHours,
        description: Description,
        requested_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            student_id,
            staff_id: None,
            hours,
            description,
            status: RequestStatus::Pending,
            requested_at,
            responded_at: None,
            reason: None,
        }
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn student_id(&self) -> StudentId {
        self.student_id
    }

    pub fn staff_id(&self) -> Option<StaffId> {
        self.staff_id
    }

    pub fn hours(&self) -> ServiceHours {
        self.hours
    }

    pub fn description(&self) -> &Description {
        &self.description
    }

    pub fn status(&self) -> RequestStatus {
        self.status
    }

    pub fn requested_at(&self) -> DateTime<Utc> {
        self.requested_at
    }

    pub fn responded_at(&self) -> Option<DateTime<Utc>> {
        self.responded_at
    }

    pub fn reason(&self) -> Option<&RejectionReason> {
        self.reason.as_ref()
    }

    /// Resolve a pending request as approved by `staff_id`.
    pub fn approve(&self, staff_id: StaffId, at: DateTime<Utc>) -> Result<Self, NotPendingError> {
        self.resolve(RequestStatus::Approved, staff_id, at, None)
    }

    /// Resolve a pending request as rejected by `staff_id`.
    pub fn reject(
        &self,
        staff_id: StaffId,
        at: DateTime<Utc>,
        reason: Option<RejectionReason>,
    ) -> Result<Self, NotPendingError> {
        self.resolve(RequestStatus::Rejected, staff_id, at, reason)
    }

    fn resolve(
        &self,
        status: RequestStatus,
        staff_id: StaffId,
        at: DateTime<Utc>,
        reason: Option<RejectionReason>,
    ) -> Result<Self, NotPendingError> {
        if self.status.is_terminal() {
            return Err(NotPendingError {
                request_id: self.id,
                status: self.status,
            });
        }
        Ok(Self {
            staff_id: Some(staff_id),
            status,
            responded_at: Some(at),
            reason,
            ..self.clone()
        })
    }
}

/// Fields for inserting a new pending request.
#[derive(Debug, Clone, PartialEq)]
pub struct NewConfirmationRequest {
    pub student_id: StudentId,
    pub hours: ServiceHours,
    pub description: Description,
    pub requested_at: DateTime<Utc>,
}

/// Approval decision handed to the store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApprovalDraft {
    pub request_id: RequestId,
    pub staff_id: StaffId,
    pub responded_at: DateTime<Utc>,
}

/// Rejection decision handed to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectionDraft {
    pub request_id: RequestId,
    pub staff_id: StaffId,
    pub responded_at: DateTime<Utc>,
    pub reason: Option<RejectionReason>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn pending() -> ConfirmationRequest {
        ConfirmationRequest::pending(
            RequestId::new(1),
            StudentId::new(2),
            ServiceHours::new(5.0).expect("valid hours"),
            Description::new("Food Drive").expect("valid description"),
            Utc::now(),
        )
    }

    #[rstest]
    fn approve_records_reviewer(pending: ConfirmationRequest) {
        let at = Utc::now();
        let approved = pending.approve(StaffId::new(3), at).expect("pending");
        assert_eq!(approved.status(), RequestStatus::Approved);
        assert_eq!(approved.staff_id(), Some(StaffId::new(3)));
        assert_eq!(approved.responded_at(), Some(at));
        assert!(approved.reason().is_none());
    }

    #[rstest]
    fn terminal_requests_refuse_transitions(pending: ConfirmationRequest) {
        let rejected = pending
            .reject(StaffId::new(3), Utc::now(), None)
            .expect("pending");
        let err = rejected
            .approve(StaffId::new(4), Utc::now())
            .expect_err("terminal");
        assert_eq!(err.status, RequestStatus::Rejected);
        assert_eq!(err.request_id, RequestId::new(1));
    }

    #[rstest]
    fn draft_validation_rejects_pending_with_reviewer(pending: ConfirmationRequest) {
        let draft = ConfirmationRequestDraft {
            id: pending.id(),
            student_id: pending.student_id(),
            staff_id: Some(StaffId::new(9)),
            hours: pending.hours(),
            description: pending.description().clone(),
            status: RequestStatus::Pending,
            requested_at: pending.requested_at(),
            responded_at: None,
            reason: None,
        };
        assert_eq!(
            ConfirmationRequest::try_from(draft),
            Err(RequestValidationError::PendingWithResolution)
        );
    }

    #[rstest]
    #[case(RequestStatus::Approved)]
    #[case(RequestStatus::Rejected)]
    fn draft_validation_requires_reviewer_when_resolved(
        pending: ConfirmationRequest,
        #[case] status: RequestStatus,
    ) {
        let draft = ConfirmationRequestDraft {
            id: pending.id(),
            student_id: pending.student_id(),
            staff_id: None,
            hours: pending.hours(),
            description: pending.description().clone(),
            status,
            requested_at: pending.requested_at(),
            responded_at: Some(Utc::now()),
            reason: None,
        };
        assert_eq!(
            ConfirmationRequest::try_from(draft),
            Err(RequestValidationError::ResolvedWithoutReviewer { status })
        );
    }

    #[test]
    fn status_strings_round_trip() {
        for status in [
            RequestStatus::Pending,
            RequestStatus::Approved,
            RequestStatus::Rejected,
        ] {
            assert_eq!(status.as_str().parse::<RequestStatus>(), Ok(status));
        }
        assert!("cancelled".parse::<RequestStatus>().is_err());
    }
}
