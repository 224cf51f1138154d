//! Driving port for submitting and resolving hours claims.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    AccoladeKind, ConfirmationRequest, Error, Principal, RequestId, ServiceLogEntry, StudentId,
};

/// Raw claim submitted by a student; validated by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitHoursRequest {
    #[schema(example = 5.0)]
    pub hours: f64,
    #[serde(default)]
    #[schema(example = "Community Outreach")]
    pub description: String,
}

/// Outcome of an approval.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalReceipt {
    pub request: ConfirmationRequest,
    pub log_entry: ServiceLogEntry,
    pub student_id: StudentId,
    pub new_total_hours: f64,
    /// Accolades newly awarded by this approval.
    pub awarded: Vec<AccoladeKind>,
}

/// Request lifecycle use-cases.
///
/// Each operation checks the principal's role before touching the store and
/// fails with `Forbidden` on mismatch.
#[async_trait]
pub trait RequestLifecycleCommand: Send + Sync {
    /// Create a pending request for the calling student.
    async fn submit(
        &self,
        principal: Principal,
        request: SubmitHoursRequest,
    ) -> Result<ConfirmationRequest, Error>;

    /// Approve a pending request as the calling staff member.
    async fn approve(
        &self,
        principal: Principal,
        request_id: RequestId,
    ) -> Result<ApprovalReceipt, Error>;

    /// Reject a pending request as the calling staff member.
    async fn reject(
        &self,
        principal: Principal,
        request_id: RequestId,
        reason: Option<String>,
    ) -> Result<ConfirmationRequest, Error>;
}
