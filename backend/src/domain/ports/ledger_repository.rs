//! Port for the transactional ledger store.
//!
//! The store owns requests, service log entries, student totals, and
//! accolades. Approval is a single atomic unit: adapters perform the status
//! compare-and-set, append the log entry, and route the credit through the
//! [`AccoladeEngine`] within one transaction.

use async_trait::async_trait;

use crate::domain::{
    AccoladeEngine, Accolade, AccountId, ApprovalDraft, ConfirmationRequest, CreditOutcome,
    NewConfirmationRequest, RejectionDraft, RequestId, RequestStatus, ServiceLogEntry,
    StaffSummary, StudentId, StudentSummary,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by ledger store adapters.
    pub enum LedgerRepositoryError {
        /// The store could not be reached.
        Connection { message: String } =>
            "ledger store connection failed: {message}",
        /// A query or mutation failed during execution.
        Query { message: String } =>
            "ledger store query failed: {message}",
        /// A concurrent transaction invalidated this one; safe to retry.
        Conflict { message: String } =>
            "ledger store detected a concurrent modification: {message}",
        RequestNotFound { request_id: RequestId } =>
            "confirmation request {request_id} not found",
        RequestNotPending { request_id: RequestId, status: RequestStatus } =>
            "confirmation request {request_id} is already {status}",
        StudentNotFound { student_id: StudentId } =>
            "student {student_id} not found",
    }
}

/// Everything written by a successful approval.
#[derive(Debug, Clone, PartialEq)]
pub struct ApprovalCommit {
    pub request: ConfirmationRequest,
    pub log_entry: ServiceLogEntry,
    pub credit: CreditOutcome,
}

/// A student's cached total alongside their log entries, read together.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentLogs {
    pub student: StudentSummary,
    /// Most recent first.
    pub entries: Vec<ServiceLogEntry>,
}

/// Port for reading and mutating the ledger.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerRepository: Send + Sync {
    /// Persist a new pending request.
    async fn insert_request(
        &self,
        request: NewConfirmationRequest,
    ) -> Result<ConfirmationRequest, LedgerRepositoryError>;

    /// Find a request by id.
    async fn find_request(
        &self,
        request_id: RequestId,
    ) -> Result<Option<ConfirmationRequest>, LedgerRepositoryError>;

    /// Approve a pending request, append its log entry, and credit the
    /// student through `engine`, all or nothing.
    ///
    /// Fails with `RequestNotFound` or `RequestNotPending` when the
    /// compare-and-set matches no row.
    async fn commit_approval(
        &self,
        draft: ApprovalDraft,
        engine: &AccoladeEngine,
    ) -> Result<ApprovalCommit, LedgerRepositoryError>;

    /// Reject a pending request with the same compare-and-set semantics.
    async fn commit_rejection(
        &self,
        draft: RejectionDraft,
    ) -> Result<ConfirmationRequest, LedgerRepositoryError>;

    async fn find_student_by_account(
        &self,
        account_id: AccountId,
    ) -> Result<Option<StudentSummary>, LedgerRepositoryError>;

    async fn find_staff_by_account(
        &self,
        account_id: AccountId,
    ) -> Result<Option<StaffSummary>, LedgerRepositoryError>;

    async fn find_student(
        &self,
        student_id: StudentId,
    ) -> Result<Option<StudentSummary>, LedgerRepositoryError>;

    /// Students matching `student_ids`, ordered by id.
    async fn find_students(
        &self,
        student_ids: &[StudentId],
    ) -> Result<Vec<StudentSummary>, LedgerRepositoryError>;

    /// All requests for a student, most recent first.
    async fn list_requests_for_student(
        &self,
        student_id: StudentId,
    ) -> Result<Vec<ConfirmationRequest>, LedgerRepositoryError>;

    /// All log entries for a student, most recent first.
    async fn list_logs_for_student(
        &self,
        student_id: StudentId,
    ) -> Result<Vec<ServiceLogEntry>, LedgerRepositoryError>;

    /// The student and their log entries from one consistent snapshot, so
    /// the entries sum to `student.total_hours`.
    async fn find_student_logs(
        &self,
        student_id: StudentId,
    ) -> Result<Option<StudentLogs>, LedgerRepositoryError>;

    /// Pending requests ordered by student id, then submission time.
    async fn list_pending_requests(&self)
    -> Result<Vec<ConfirmationRequest>, LedgerRepositoryError>;

    /// Top students by total hours, ties broken by ascending student id.
    async fn list_leaderboard(
        &self,
        limit: usize,
    ) -> Result<Vec<StudentSummary>, LedgerRepositoryError>;

    /// Accolades held by the given students, lowest threshold first.
    async fn list_accolades_for_students(
        &self,
        student_ids: &[StudentId],
    ) -> Result<Vec<Accolade>, LedgerRepositoryError>;
}
