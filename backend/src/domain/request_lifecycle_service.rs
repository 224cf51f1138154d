//! Request lifecycle engine.
//!
//! Implements the [`RequestLifecycleCommand`] driving port: students submit
//! claims, staff resolve them. Resolution is delegated to the ledger store as
//! one atomic unit; a store-reported conflict is retried once.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::ports::{
    ApprovalReceipt, LedgerRepository, LedgerRepositoryError, RequestLifecycleCommand,
    SubmitHoursRequest,
};
use crate::domain::{
    AccoladeEngine, ApprovalDraft, ConfirmationRequest, Description, Error, NewConfirmationRequest,
    Principal, RejectionDraft, RejectionReason, RequestId, Role, ServiceHours, StaffSummary,
    StudentSummary,
};

pub(crate) fn map_repository_error(error: LedgerRepositoryError) -> Error {
    match error {
        LedgerRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("ledger store unavailable: {message}"))
        }
        LedgerRepositoryError::Query { message } => {
            Error::internal(format!("ledger store error: {message}"))
        }
        LedgerRepositoryError::Conflict { .. } => {
            Error::conflict("concurrent modification detected; retry the request")
        }
        LedgerRepositoryError::RequestNotFound { request_id } => {
            Error::not_found(format!("confirmation request {request_id} not found"))
        }
        LedgerRepositoryError::RequestNotPending { request_id, status } => Error::conflict(
            format!("confirmation request {request_id} is already {status}"),
        )
        .with_details(json!({ "requestId": request_id, "status": status })),
        LedgerRepositoryError::StudentNotFound { student_id } => {
            Error::not_found(format!("student {student_id} not found"))
        }
    }
}

/// Run `attempt`, running it a second time if the store reports a conflict.
async fn retry_on_conflict<T, F, Fut>(
    operation: &'static str,
    mut attempt: F,
) -> Result<T, LedgerRepositoryError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, LedgerRepositoryError>>,
{
    match attempt().await {
        Err(LedgerRepositoryError::Conflict { message }) => {
            warn!(operation, %message, "ledger conflict, retrying once");
            attempt().await
        }
        other => other,
    }
}

/// Request lifecycle service implementing the command driving port.
#[derive(Clone)]
pub struct RequestLifecycleService<L> {
    ledger: Arc<L>,
    engine: AccoladeEngine,
    clock: Arc<dyn Clock>,
}

impl<L> RequestLifecycleService<L> {
    /// Create a service using the standard accolade ladder.
    pub fn new(ledger: Arc<L>, clock: Arc<dyn Clock>) -> Self {
        let engine = AccoladeEngine::new(Arc::clone(&clock));
        Self::with_engine(ledger, engine, clock)
    }

    pub fn with_engine(ledger: Arc<L>, engine: AccoladeEngine, clock: Arc<dyn Clock>) -> Self {
        Self {
            ledger,
            engine,
            clock,
        }
    }
}

impl<L> RequestLifecycleService<L>
where
    L: LedgerRepository,
{
    async fn student_for(&self, principal: Principal) -> Result<StudentSummary, Error> {
        self.ledger
            .find_student_by_account(principal.account_id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| {
                Error::not_found(format!(
                    "no student profile for account {}",
                    principal.account_id
                ))
            })
    }

    async fn staff_for(&self, principal: Principal) -> Result<StaffSummary, Error> {
        self.ledger
            .find_staff_by_account(principal.account_id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| {
                Error::not_found(format!(
                    "no staff profile for account {}",
                    principal.account_id
                ))
            })
    }
}

#[async_trait]
impl<L> RequestLifecycleCommand for RequestLifecycleService<L>
where
    L: LedgerRepository,
{
    async fn submit(
        &self,
        principal: Principal,
        request: SubmitHoursRequest,
    ) -> Result<ConfirmationRequest, Error> {
        principal.require_role(Role::Student)?;
        let hours = ServiceHours::new(request.hours).map_err(|err| {
            Error::invalid_request(err.to_string())
                .with_details(json!({ "field": "hours", "value": request.hours }))
        })?;
        let description = Description::new(&request.description).map_err(|err| {
            Error::invalid_request(err.to_string()).with_details(json!({ "field": "description" }))
        })?;
        let student = self.student_for(principal).await?;

        let new_request = NewConfirmationRequest {
            student_id: student.student_id,
            hours,
            description,
            requested_at: self.clock.utc(),
        };
        let created = retry_on_conflict("submit", || {
            self.ledger.insert_request(new_request.clone())
        })
        .await
        .map_err(map_repository_error)?;

        info!(
            request_id = created.id().get(),
            student_id = student.student_id.get(),
            hours = hours.get(),
            "hours submitted"
        );
        Ok(created)
    }

    async fn approve(
        &self,
        principal: Principal,
        request_id: RequestId,
    ) -> Result<ApprovalReceipt, Error> {
        principal.require_role(Role::Staff)?;
        let staff = self.staff_for(principal).await?;
        let draft = ApprovalDraft {
            request_id,
            staff_id: staff.staff_id,
            responded_at: self.clock.utc(),
        };

        let commit = retry_on_conflict("approve", || {
            self.ledger.commit_approval(draft, &self.engine)
        })
        .await
        .map_err(map_repository_error)?;

        let student_id = commit.request.student_id();
        info!(
            request_id = request_id.get(),
            staff_id = staff.staff_id.get(),
            student_id = student_id.get(),
            new_total_hours = commit.credit.new_total,
            "request approved"
        );
        Ok(ApprovalReceipt {
            request: commit.request,
            log_entry: commit.log_entry,
            student_id,
            new_total_hours: commit.credit.new_total,
            awarded: commit.credit.awarded,
        })
    }

    async fn reject(
        &self,
        principal: Principal,
        request_id: RequestId,
        reason: Option<String>,
    ) -> Result<ConfirmationRequest, Error> {
        principal.require_role(Role::Staff)?;
        let reason = RejectionReason::from_optional(reason.as_deref()).map_err(|err| {
            Error::invalid_request(err.to_string()).with_details(json!({ "field": "reason" }))
        })?;
        let staff = self.staff_for(principal).await?;
        let draft = RejectionDraft {
            request_id,
            staff_id: staff.staff_id,
            responded_at: self.clock.utc(),
            reason,
        };

        let rejected = retry_on_conflict("reject", || {
            self.ledger.commit_rejection(draft.clone())
        })
        .await
        .map_err(map_repository_error)?;

        info!(
            request_id = request_id.get(),
            staff_id = staff.staff_id.get(),
            "request rejected"
        );
        Ok(rejected)
    }
}

#[cfg(test)]
#[path = "request_lifecycle_service_tests.rs"]
mod tests;
