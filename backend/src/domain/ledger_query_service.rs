//! Read-only ledger views: history, confirmed logs, pending work, the
//! leaderboard, and per-student accolades.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::ports::{
    ConfirmedLogs, LeaderboardEntry, LedgerQuery, LedgerRepository, PendingStudentSummary,
    StudentAccolades,
};
use crate::domain::request_lifecycle_service::map_repository_error;
use crate::domain::{
    AccoladeKind, ConfirmationRequest, Error, LeaderboardLimit, Principal, Role, StudentId,
    StudentSummary, render_badges,
};

/// Ledger query service implementing the [`LedgerQuery`] driving port.
#[derive(Clone)]
pub struct LedgerQueryService<L> {
    ledger: Arc<L>,
}

impl<L> LedgerQueryService<L> {
    pub fn new(ledger: Arc<L>) -> Self {
        Self { ledger }
    }
}

impl<L> LedgerQueryService<L>
where
    L: LedgerRepository,
{
    async fn require_student(&self, student_id: StudentId) -> Result<StudentSummary, Error> {
        self.ledger
            .find_student(student_id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(format!("student {student_id} not found")))
    }

    /// Staff and admins see every student; a student sees only themself.
    async fn authorise_student_view(
        &self,
        principal: Principal,
        student_id: StudentId,
    ) -> Result<StudentSummary, Error> {
        if principal.is_staff_or_admin() {
            return self.require_student(student_id).await;
        }
        principal.require_role(Role::Student)?;
        let own = self
            .ledger
            .find_student_by_account(principal.account_id)
            .await
            .map_err(map_repository_error)?;
        match own {
            Some(student) if student.student_id == student_id => Ok(student),
            _ => Err(Error::forbidden(
                "students may only view their own records",
            )),
        }
    }
}

#[async_trait]
impl<L> LedgerQuery for LedgerQueryService<L>
where
    L: LedgerRepository,
{
    async fn student_history(
        &self,
        principal: Principal,
        student_id: StudentId,
    ) -> Result<Vec<ConfirmationRequest>, Error> {
        self.authorise_student_view(principal, student_id).await?;
        self.ledger
            .list_requests_for_student(student_id)
            .await
            .map_err(map_repository_error)
    }

    async fn confirmed_logs(
        &self,
        principal: Principal,
        student_id: StudentId,
    ) -> Result<ConfirmedLogs, Error> {
        self.authorise_student_view(principal, student_id).await?;
        let snapshot = self
            .ledger
            .find_student_logs(student_id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(format!("student {student_id} not found")))?;
        Ok(ConfirmedLogs {
            student_id,
            entries: snapshot.entries,
            total_hours: snapshot.student.total_hours,
        })
    }

    async fn pending_by_student(
        &self,
        principal: Principal,
    ) -> Result<Vec<PendingStudentSummary>, Error> {
        principal.require_any_role(&[Role::Staff, Role::Admin])?;
        let pending = self
            .ledger
            .list_pending_requests()
            .await
            .map_err(map_repository_error)?;

        let mut grouped: BTreeMap<StudentId, (usize, f64)> = BTreeMap::new();
        for request in &pending {
            let slot = grouped.entry(request.student_id()).or_insert((0, 0.0));
            slot.0 += 1;
            slot.1 += request.hours().get();
        }
        let ids: Vec<StudentId> = grouped.keys().copied().collect();
        let students = self
            .ledger
            .find_students(&ids)
            .await
            .map_err(map_repository_error)?;

        Ok(students
            .into_iter()
            .filter_map(|student| {
                grouped
                    .get(&student.student_id)
                    .map(|(count, hours)| PendingStudentSummary {
                        student_id: student.student_id,
                        username: student.username,
                        current_hours: student.total_hours,
                        pending_requests: *count,
                        pending_hours: *hours,
                    })
            })
            .collect())
    }

    async fn leaderboard(&self, limit: LeaderboardLimit) -> Result<Vec<LeaderboardEntry>, Error> {
        let leaders = self
            .ledger
            .list_leaderboard(limit.get())
            .await
            .map_err(map_repository_error)?;
        let ids: Vec<StudentId> = leaders.iter().map(|student| student.student_id).collect();
        let accolades = self
            .ledger
            .list_accolades_for_students(&ids)
            .await
            .map_err(map_repository_error)?;

        let mut held: BTreeMap<StudentId, Vec<AccoladeKind>> = BTreeMap::new();
        for accolade in accolades {
            held.entry(accolade.student_id)
                .or_default()
                .push(accolade.accolade_type);
        }

        Ok(leaders
            .into_iter()
            .enumerate()
            .map(|(index, student)| {
                let kinds = held.remove(&student.student_id).unwrap_or_default();
                LeaderboardEntry {
                    rank: index + 1,
                    student_id: student.student_id,
                    username: student.username,
                    total_hours: student.total_hours,
                    accolades: render_badges(&kinds),
                }
            })
            .collect())
    }

    async fn student_accolades(&self, student_id: StudentId) -> Result<StudentAccolades, Error> {
        let student = self.require_student(student_id).await?;
        let accolades = self
            .ledger
            .list_accolades_for_students(&[student_id])
            .await
            .map_err(map_repository_error)?;
        Ok(StudentAccolades {
            student_id,
            username: student.username,
            accolades,
        })
    }
}

#[cfg(test)]
#[path = "ledger_query_service_tests.rs"]
mod tests;
