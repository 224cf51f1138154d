//! PostgreSQL-backed `LedgerRepository` implementation using Diesel ORM.
//!
//! Approval and rejection resolve a request with a single conditional
//! `UPDATE ... WHERE status = 'pending'`. Postgres row locking makes exactly
//! one concurrent reviewer match; the rest see zero rows and re-read the
//! status to report why. The credit runs through [`DieselCreditLedger`]
//! inside the same transaction, with the total incremented in SQL and
//! accolades inserted with `ON CONFLICT DO NOTHING`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use tracing::debug;

use crate::domain::ports::{
    ApprovalCommit, CreditLedger, LedgerRepository, LedgerRepositoryError, StudentLogs,
};
use crate::domain::{
    Accolade, AccoladeEngine, AccoladeKind, AccountId, ApprovalDraft, ConfirmationRequest,
    NewConfirmationRequest, RejectionDraft, RequestId, RequestStatus, ServiceHours,
    ServiceLogEntry, StaffSummary, StudentId, StudentSummary,
};

use super::models::{
    AccoladeRow, ConfirmationRequestRow, NewAccoladeRow, NewConfirmationRequestRow,
    NewServiceLogEntryRow, ResolutionChangeset, ServiceLogEntryRow, StaffSummaryRow,
    StudentSummaryRow, decode_rows,
};
use super::pool::DbPool;
use super::schema::{
    accolades, accounts, confirmation_requests, service_log_entries, staff_profiles,
    student_profiles,
};

type StudentSummaryColumns = (
    student_profiles::id,
    student_profiles::account_id,
    accounts::username,
    student_profiles::total_hours,
);

const STUDENT_SUMMARY_COLUMNS: StudentSummaryColumns = (
    student_profiles::id,
    student_profiles::account_id,
    accounts::username,
    student_profiles::total_hours,
);

fn student_ids(ids: &[StudentId]) -> Vec<i64> {
    ids.iter().map(|id| id.get()).collect()
}

/// A student's log entries, most recent first.
async fn load_logs(
    conn: &mut AsyncPgConnection,
    student_id: StudentId,
) -> Result<Vec<ServiceLogEntry>, LedgerRepositoryError> {
    let rows = service_log_entries::table
        .filter(service_log_entries::student_id.eq(student_id.get()))
        .order((
            service_log_entries::logged_at.desc(),
            service_log_entries::id.desc(),
        ))
        .select(ServiceLogEntryRow::as_select())
        .load::<ServiceLogEntryRow>(conn)
        .await?;
    Ok(decode_rows(rows)?)
}

/// Why a conditional update matched nothing.
async fn explain_unmatched(
    conn: &mut AsyncPgConnection,
    request_id: RequestId,
) -> LedgerRepositoryError {
    let status = confirmation_requests::table
        .find(request_id.get())
        .select(confirmation_requests::status)
        .first::<String>(conn)
        .await
        .optional();
    match status {
        Ok(None) => LedgerRepositoryError::request_not_found(request_id),
        Ok(Some(raw)) => match raw.parse::<RequestStatus>() {
            Ok(status) => LedgerRepositoryError::request_not_pending(request_id, status),
            Err(err) => LedgerRepositoryError::query(err.to_string()),
        },
        Err(err) => err.into(),
    }
}

/// Resolve `request_id` if it is still pending.
async fn resolve_pending(
    conn: &mut AsyncPgConnection,
    request_id: RequestId,
    changes: ResolutionChangeset<'_>,
) -> Result<ConfirmationRequest, LedgerRepositoryError> {
    let updated = diesel::update(
        confirmation_requests::table.filter(
            confirmation_requests::id
                .eq(request_id.get())
                .and(confirmation_requests::status.eq(RequestStatus::Pending.as_str())),
        ),
    )
    .set(&changes)
    .returning(ConfirmationRequestRow::as_returning())
    .get_result::<ConfirmationRequestRow>(conn)
    .await
    .optional()?;

    match updated {
        Some(row) => Ok(ConfirmationRequest::try_from(row)?),
        None => Err(explain_unmatched(conn, request_id).await),
    }
}

/// [`CreditLedger`] bound to an open approval transaction.
pub(crate) struct DieselCreditLedger<'a> {
    conn: &'a mut AsyncPgConnection,
}

#[async_trait]
impl CreditLedger for DieselCreditLedger<'_> {
    async fn increment_total_hours(
        &mut self,
        student_id: StudentId,
        hours: ServiceHours,
    ) -> Result<f64, LedgerRepositoryError> {
        diesel::update(student_profiles::table.find(student_id.get()))
            .set(student_profiles::total_hours.eq(student_profiles::total_hours + hours.get()))
            .returning(student_profiles::total_hours)
            .get_result::<f64>(&mut *self.conn)
            .await
            .optional()?
            .ok_or_else(|| LedgerRepositoryError::student_not_found(student_id))
    }

    async fn insert_accolade_if_absent(
        &mut self,
        student_id: StudentId,
        kind: AccoladeKind,
        awarded_at: DateTime<Utc>,
    ) -> Result<bool, LedgerRepositoryError> {
        let inserted = diesel::insert_into(accolades::table)
            .values(&NewAccoladeRow {
                student_id: student_id.get(),
                accolade_type: kind.as_str(),
                awarded_at,
            })
            .on_conflict((accolades::student_id, accolades::accolade_type))
            .do_nothing()
            .execute(&mut *self.conn)
            .await?;
        Ok(inserted == 1)
    }
}

/// Diesel-backed implementation of the [`LedgerRepository`] port.
#[derive(Clone)]
pub struct DieselLedgerRepository {
    pool: DbPool,
}

impl DieselLedgerRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LedgerRepository for DieselLedgerRepository {
    async fn insert_request(
        &self,
        request: NewConfirmationRequest,
    ) -> Result<ConfirmationRequest, LedgerRepositoryError> {
        let mut conn = self.pool.get().await?;
        let row = diesel::insert_into(confirmation_requests::table)
            .values(&NewConfirmationRequestRow {
                student_id: request.student_id.get(),
                hours: request.hours.get(),
                description: request.description.as_ref(),
                status: RequestStatus::Pending.as_str(),
                requested_at: request.requested_at,
            })
            .returning(ConfirmationRequestRow::as_returning())
            .get_result::<ConfirmationRequestRow>(&mut conn)
            .await
            .map_err(|err| match err {
                DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                    LedgerRepositoryError::student_not_found(request.student_id)
                }
                other => other.into(),
            })?;
        Ok(ConfirmationRequest::try_from(row)?)
    }

    async fn find_request(
        &self,
        request_id: RequestId,
    ) -> Result<Option<ConfirmationRequest>, LedgerRepositoryError> {
        let mut conn = self.pool.get().await?;
        let row = confirmation_requests::table
            .find(request_id.get())
            .select(ConfirmationRequestRow::as_select())
            .first::<ConfirmationRequestRow>(&mut conn)
            .await
            .optional()?;
        Ok(row.map(ConfirmationRequest::try_from).transpose()?)
    }

    async fn commit_approval(
        &self,
        draft: ApprovalDraft,
        engine: &AccoladeEngine,
    ) -> Result<ApprovalCommit, LedgerRepositoryError> {
        let mut pooled = self.pool.get().await?;
        let conn: &mut AsyncPgConnection = &mut pooled;
        let commit = conn
            .transaction::<_, LedgerRepositoryError, _>(|conn| {
                async move {
                    let request = resolve_pending(
                        conn,
                        draft.request_id,
                        ResolutionChangeset {
                            status: RequestStatus::Approved.as_str(),
                            staff_id: Some(draft.staff_id.get()),
                            responded_at: Some(draft.responded_at),
                            reason: None,
                        },
                    )
                    .await?;

                    let log_row = diesel::insert_into(service_log_entries::table)
                        .values(&NewServiceLogEntryRow {
                            request_id: request.id().get(),
                            student_id: request.student_id().get(),
                            staff_id: draft.staff_id.get(),
                            hours: request.hours().get(),
                            description: request.description().as_ref(),
                            logged_at: draft.responded_at,
                        })
                        .returning(ServiceLogEntryRow::as_returning())
                        .get_result::<ServiceLogEntryRow>(conn)
                        .await?;
                    let log_entry = ServiceLogEntry::try_from(log_row)?;

                    let mut ledger = DieselCreditLedger { conn };
                    let credit = engine
                        .apply_credit(&mut ledger, request.student_id(), request.hours())
                        .await?;

                    Ok(ApprovalCommit {
                        request,
                        log_entry,
                        credit,
                    })
                }
                .scope_boxed()
            })
            .await?;

        debug!(
            request_id = draft.request_id.get(),
            new_total = commit.credit.new_total,
            "approval committed"
        );
        Ok(commit)
    }

    async fn commit_rejection(
        &self,
        draft: RejectionDraft,
    ) -> Result<ConfirmationRequest, LedgerRepositoryError> {
        let mut conn = self.pool.get().await?;
        let reason = draft.reason.as_ref().map(AsRef::as_ref);
        resolve_pending(
            &mut conn,
            draft.request_id,
            ResolutionChangeset {
                status: RequestStatus::Rejected.as_str(),
                staff_id: Some(draft.staff_id.get()),
                responded_at: Some(draft.responded_at),
                reason,
            },
        )
        .await
    }

    async fn find_student_by_account(
        &self,
        account_id: AccountId,
    ) -> Result<Option<StudentSummary>, LedgerRepositoryError> {
        let mut conn = self.pool.get().await?;
        let row = student_profiles::table
            .inner_join(accounts::table)
            .filter(student_profiles::account_id.eq(account_id.get()))
            .select(STUDENT_SUMMARY_COLUMNS)
            .first::<StudentSummaryRow>(&mut conn)
            .await
            .optional()?;
        Ok(row.map(StudentSummary::try_from).transpose()?)
    }

    async fn find_staff_by_account(
        &self,
        account_id: AccountId,
    ) -> Result<Option<StaffSummary>, LedgerRepositoryError> {
        let mut conn = self.pool.get().await?;
        let row = staff_profiles::table
            .inner_join(accounts::table)
            .filter(staff_profiles::account_id.eq(account_id.get()))
            .select((
                staff_profiles::id,
                staff_profiles::account_id,
                accounts::username,
            ))
            .first::<StaffSummaryRow>(&mut conn)
            .await
            .optional()?;
        Ok(row.map(StaffSummary::try_from).transpose()?)
    }

    async fn find_student(
        &self,
        student_id: StudentId,
    ) -> Result<Option<StudentSummary>, LedgerRepositoryError> {
        let mut conn = self.pool.get().await?;
        let row = student_profiles::table
            .inner_join(accounts::table)
            .filter(student_profiles::id.eq(student_id.get()))
            .select(STUDENT_SUMMARY_COLUMNS)
            .first::<StudentSummaryRow>(&mut conn)
            .await
            .optional()?;
        Ok(row.map(StudentSummary::try_from).transpose()?)
    }

    async fn find_students(
        &self,
        ids: &[StudentId],
    ) -> Result<Vec<StudentSummary>, LedgerRepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await?;
        let rows = student_profiles::table
            .inner_join(accounts::table)
            .filter(student_profiles::id.eq_any(student_ids(ids)))
            .order(student_profiles::id.asc())
            .select(STUDENT_SUMMARY_COLUMNS)
            .load::<StudentSummaryRow>(&mut conn)
            .await?;
        Ok(decode_rows(rows)?)
    }

    async fn list_requests_for_student(
        &self,
        student_id: StudentId,
    ) -> Result<Vec<ConfirmationRequest>, LedgerRepositoryError> {
        let mut conn = self.pool.get().await?;
        let rows = confirmation_requests::table
            .filter(confirmation_requests::student_id.eq(student_id.get()))
            .order((
                confirmation_requests::requested_at.desc(),
                confirmation_requests::id.desc(),
            ))
            .select(ConfirmationRequestRow::as_select())
            .load::<ConfirmationRequestRow>(&mut conn)
            .await?;
        Ok(decode_rows(rows)?)
    }

    async fn list_logs_for_student(
        &self,
        student_id: StudentId,
    ) -> Result<Vec<ServiceLogEntry>, LedgerRepositoryError> {
        let mut conn = self.pool.get().await?;
        load_logs(&mut conn, student_id).await
    }

    async fn find_student_logs(
        &self,
        student_id: StudentId,
    ) -> Result<Option<StudentLogs>, LedgerRepositoryError> {
        let mut pooled = self.pool.get().await?;
        let conn: &mut AsyncPgConnection = &mut pooled;
        conn.build_transaction()
            .read_only()
            .repeatable_read()
            .run::<_, LedgerRepositoryError, _>(|conn| {
                async move {
                    let row = student_profiles::table
                        .inner_join(accounts::table)
                        .filter(student_profiles::id.eq(student_id.get()))
                        .select(STUDENT_SUMMARY_COLUMNS)
                        .first::<StudentSummaryRow>(conn)
                        .await
                        .optional()?;
                    let Some(row) = row else {
                        return Ok(None);
                    };
                    let student = StudentSummary::try_from(row)?;
                    let entries = load_logs(conn, student_id).await?;
                    Ok(Some(StudentLogs { student, entries }))
                }
                .scope_boxed()
            })
            .await
    }

    async fn list_pending_requests(
        &self,
    ) -> Result<Vec<ConfirmationRequest>, LedgerRepositoryError> {
        let mut conn = self.pool.get().await?;
        let rows = confirmation_requests::table
            .filter(confirmation_requests::status.eq(RequestStatus::Pending.as_str()))
            .order((
                confirmation_requests::student_id.asc(),
                confirmation_requests::requested_at.asc(),
                confirmation_requests::id.asc(),
            ))
            .select(ConfirmationRequestRow::as_select())
            .load::<ConfirmationRequestRow>(&mut conn)
            .await?;
        Ok(decode_rows(rows)?)
    }

    async fn list_leaderboard(
        &self,
        limit: usize,
    ) -> Result<Vec<StudentSummary>, LedgerRepositoryError> {
        let mut conn = self.pool.get().await?;
        let rows = student_profiles::table
            .inner_join(accounts::table)
            .order((
                student_profiles::total_hours.desc(),
                student_profiles::id.asc(),
            ))
            .limit(i64::try_from(limit).unwrap_or(i64::MAX))
            .select(STUDENT_SUMMARY_COLUMNS)
            .load::<StudentSummaryRow>(&mut conn)
            .await?;
        Ok(decode_rows(rows)?)
    }

    async fn list_accolades_for_students(
        &self,
        ids: &[StudentId],
    ) -> Result<Vec<Accolade>, LedgerRepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await?;
        let rows = accolades::table
            .filter(accolades::student_id.eq_any(student_ids(ids)))
            .select(AccoladeRow::as_select())
            .load::<AccoladeRow>(&mut conn)
            .await?;
        let mut held: Vec<Accolade> = decode_rows(rows)?;
        held.sort_by(|a, b| {
            a.student_id
                .cmp(&b.student_id)
                .then_with(|| a.accolade_type.cmp(&b.accolade_type))
        });
        Ok(held)
    }
}
