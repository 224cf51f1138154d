//! Process-local ledger store.
//!
//! Serves deployments without a database URL and the domain-level behaviour
//! tests. Every mutation runs against a copy of the state under one async
//! mutex; the copy replaces the live state only when the whole unit succeeds,
//! so a failure part-way through an approval leaves nothing behind.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::domain::ports::{
    AccountRepository, AccountRepositoryError, ApprovalCommit, CreditLedger, LedgerRepository,
    LedgerRepositoryError, StudentLogs,
};
use crate::domain::{
    Accolade, AccoladeEngine, AccoladeId, AccoladeKind, Account, AccountId, ApprovalDraft,
    ConfirmationRequest, LogEntryId, NewAccount, NewConfirmationRequest, RejectionDraft, RequestId,
    Role, ServiceHours, ServiceLogEntry, StaffId, StaffSummary, StoredAccount, StudentId,
    StudentSummary,
};

#[derive(Debug, Clone, Default)]
struct Sequences {
    account: i64,
    student: i64,
    staff: i64,
    request: i64,
    log: i64,
    accolade: i64,
}

fn next(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

#[derive(Debug, Clone)]
struct StudentRow {
    account_id: AccountId,
    total_hours: f64,
}

#[derive(Debug, Clone, Default)]
struct LedgerState {
    sequences: Sequences,
    accounts: BTreeMap<AccountId, StoredAccount>,
    students: BTreeMap<StudentId, StudentRow>,
    staff: BTreeMap<StaffId, AccountId>,
    requests: BTreeMap<RequestId, ConfirmationRequest>,
    logs: BTreeMap<LogEntryId, ServiceLogEntry>,
    accolades: BTreeMap<AccoladeId, Accolade>,
}

impl LedgerState {
    fn logs_for(&self, student_id: StudentId) -> Vec<ServiceLogEntry> {
        let mut logs: Vec<_> = self
            .logs
            .values()
            .filter(|entry| entry.student_id == student_id)
            .cloned()
            .collect();
        logs.sort_by(|a, b| b.logged_at.cmp(&a.logged_at).then_with(|| b.id.cmp(&a.id)));
        logs
    }

    fn student_summary(&self, student_id: StudentId) -> Option<StudentSummary> {
        let row = self.students.get(&student_id)?;
        let account = self.accounts.get(&row.account_id)?;
        Some(StudentSummary {
            student_id,
            account_id: row.account_id,
            username: account.account.username.clone(),
            total_hours: row.total_hours,
        })
    }

    fn resolve_pending(
        &self,
        request_id: RequestId,
    ) -> Result<&ConfirmationRequest, LedgerRepositoryError> {
        let request = self
            .requests
            .get(&request_id)
            .ok_or_else(|| LedgerRepositoryError::request_not_found(request_id))?;
        if request.status().is_terminal() {
            return Err(LedgerRepositoryError::request_not_pending(
                request_id,
                request.status(),
            ));
        }
        Ok(request)
    }
}

/// [`CreditLedger`] over the working copy of an approval.
struct WorkingCopyLedger<'a> {
    state: &'a mut LedgerState,
}

#[async_trait]
impl CreditLedger for WorkingCopyLedger<'_> {
    async fn increment_total_hours(
        &mut self,
        student_id: StudentId,
        hours: ServiceHours,
    ) -> Result<f64, LedgerRepositoryError> {
        let row = self
            .state
            .students
            .get_mut(&student_id)
            .ok_or_else(|| LedgerRepositoryError::student_not_found(student_id))?;
        row.total_hours += hours.get();
        Ok(row.total_hours)
    }

    async fn insert_accolade_if_absent(
        &mut self,
        student_id: StudentId,
        kind: AccoladeKind,
        awarded_at: DateTime<Utc>,
    ) -> Result<bool, LedgerRepositoryError> {
        let held = self
            .state
            .accolades
            .values()
            .any(|accolade| accolade.student_id == student_id && accolade.accolade_type == kind);
        if held {
            return Ok(false);
        }
        let id = AccoladeId::new(next(&mut self.state.sequences.accolade));
        self.state.accolades.insert(
            id,
            Accolade {
                id,
                student_id,
                accolade_type: kind,
                awarded_at,
            },
        );
        Ok(true)
    }
}

/// In-memory implementation of the ledger and account ports.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    state: Mutex<LedgerState>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerRepository for InMemoryLedger {
    async fn insert_request(
        &self,
        request: NewConfirmationRequest,
    ) -> Result<ConfirmationRequest, LedgerRepositoryError> {
        let mut state = self.state.lock().await;
        if !state.students.contains_key(&request.student_id) {
            return Err(LedgerRepositoryError::student_not_found(request.student_id));
        }
        let id = RequestId::new(next(&mut state.sequences.request));
        let created = ConfirmationRequest::pending(
            id,
            request.student_id,
            request.hours,
            request.description,
            request.requested_at,
        );
        state.requests.insert(id, created.clone());
        Ok(created)
    }

    async fn find_request(
        &self,
        request_id: RequestId,
    ) -> Result<Option<ConfirmationRequest>, LedgerRepositoryError> {
        Ok(self.state.lock().await.requests.get(&request_id).cloned())
    }

    async fn commit_approval(
        &self,
        draft: ApprovalDraft,
        engine: &AccoladeEngine,
    ) -> Result<ApprovalCommit, LedgerRepositoryError> {
        let mut state = self.state.lock().await;
        let mut working = state.clone();

        let approved = working
            .resolve_pending(draft.request_id)?
            .approve(draft.staff_id, draft.responded_at)
            .map_err(|err| LedgerRepositoryError::request_not_pending(err.request_id, err.status))?;
        working.requests.insert(draft.request_id, approved.clone());

        let log_id = LogEntryId::new(next(&mut working.sequences.log));
        let log_entry = ServiceLogEntry {
            id: log_id,
            request_id: draft.request_id,
            student_id: approved.student_id(),
            staff_id: draft.staff_id,
            hours: approved.hours(),
            description: approved.description().clone(),
            logged_at: draft.responded_at,
        };
        working.logs.insert(log_id, log_entry.clone());

        let credit = {
            let mut ledger = WorkingCopyLedger {
                state: &mut working,
            };
            engine
                .apply_credit(&mut ledger, approved.student_id(), approved.hours())
                .await?
        };

        *state = working;
        Ok(ApprovalCommit {
            request: approved,
            log_entry,
            credit,
        })
    }

    async fn commit_rejection(
        &self,
        draft: RejectionDraft,
    ) -> Result<ConfirmationRequest, LedgerRepositoryError> {
        let mut state = self.state.lock().await;
        let rejected = state
            .resolve_pending(draft.request_id)?
            .reject(draft.staff_id, draft.responded_at, draft.reason)
            .map_err(|err| LedgerRepositoryError::request_not_pending(err.request_id, err.status))?;
        state.requests.insert(draft.request_id, rejected.clone());
        Ok(rejected)
    }

    async fn find_student_by_account(
        &self,
        account_id: AccountId,
    ) -> Result<Option<StudentSummary>, LedgerRepositoryError> {
        let state = self.state.lock().await;
        let student_id = state
            .students
            .iter()
            .find(|(_, row)| row.account_id == account_id)
            .map(|(id, _)| *id);
        Ok(student_id.and_then(|id| state.student_summary(id)))
    }

    async fn find_staff_by_account(
        &self,
        account_id: AccountId,
    ) -> Result<Option<StaffSummary>, LedgerRepositoryError> {
        let state = self.state.lock().await;
        let found = state
            .staff
            .iter()
            .find(|(_, owner)| **owner == account_id)
            .and_then(|(staff_id, owner)| {
                state.accounts.get(owner).map(|stored| StaffSummary {
                    staff_id: *staff_id,
                    account_id: *owner,
                    username: stored.account.username.clone(),
                })
            });
        Ok(found)
    }

    async fn find_student(
        &self,
        student_id: StudentId,
    ) -> Result<Option<StudentSummary>, LedgerRepositoryError> {
        Ok(self.state.lock().await.student_summary(student_id))
    }

    async fn find_students(
        &self,
        student_ids: &[StudentId],
    ) -> Result<Vec<StudentSummary>, LedgerRepositoryError> {
        let state = self.state.lock().await;
        let mut ids = student_ids.to_vec();
        ids.sort();
        ids.dedup();
        Ok(ids
            .into_iter()
            .filter_map(|id| state.student_summary(id))
            .collect())
    }

    async fn list_requests_for_student(
        &self,
        student_id: StudentId,
    ) -> Result<Vec<ConfirmationRequest>, LedgerRepositoryError> {
        let state = self.state.lock().await;
        let mut requests: Vec<_> = state
            .requests
            .values()
            .filter(|request| request.student_id() == student_id)
            .cloned()
            .collect();
        requests.sort_by(|a, b| {
            b.requested_at()
                .cmp(&a.requested_at())
                .then_with(|| b.id().cmp(&a.id()))
        });
        Ok(requests)
    }

    async fn list_logs_for_student(
        &self,
        student_id: StudentId,
    ) -> Result<Vec<ServiceLogEntry>, LedgerRepositoryError> {
        Ok(self.state.lock().await.logs_for(student_id))
    }

    async fn find_student_logs(
        &self,
        student_id: StudentId,
    ) -> Result<Option<StudentLogs>, LedgerRepositoryError> {
        let state = self.state.lock().await;
        Ok(state.student_summary(student_id).map(|student| StudentLogs {
            student,
            entries: state.logs_for(student_id),
        }))
    }

    async fn list_pending_requests(
        &self,
    ) -> Result<Vec<ConfirmationRequest>, LedgerRepositoryError> {
        let state = self.state.lock().await;
        let mut pending: Vec<_> = state
            .requests
            .values()
            .filter(|request| !request.status().is_terminal())
            .cloned()
            .collect();
        pending.sort_by(|a, b| {
            a.student_id()
                .cmp(&b.student_id())
                .then_with(|| a.requested_at().cmp(&b.requested_at()))
                .then_with(|| a.id().cmp(&b.id()))
        });
        Ok(pending)
    }

    async fn list_leaderboard(
        &self,
        limit: usize,
    ) -> Result<Vec<StudentSummary>, LedgerRepositoryError> {
        let state = self.state.lock().await;
        let mut students: Vec<_> = state
            .students
            .keys()
            .filter_map(|id| state.student_summary(*id))
            .collect();
        students.sort_by(|a, b| {
            b.total_hours
                .total_cmp(&a.total_hours)
                .then_with(|| a.student_id.cmp(&b.student_id))
        });
        students.truncate(limit);
        Ok(students)
    }

    async fn list_accolades_for_students(
        &self,
        student_ids: &[StudentId],
    ) -> Result<Vec<Accolade>, LedgerRepositoryError> {
        let state = self.state.lock().await;
        let mut accolades: Vec<_> = state
            .accolades
            .values()
            .filter(|accolade| student_ids.contains(&accolade.student_id))
            .cloned()
            .collect();
        accolades.sort_by(|a, b| {
            a.student_id
                .cmp(&b.student_id)
                .then_with(|| a.accolade_type.cmp(&b.accolade_type))
        });
        Ok(accolades)
    }
}

#[async_trait]
impl AccountRepository for InMemoryLedger {
    async fn create(&self, new_account: NewAccount) -> Result<Account, AccountRepositoryError> {
        let mut state = self.state.lock().await;
        let taken = state
            .accounts
            .values()
            .any(|stored| stored.account.username == new_account.username);
        if taken {
            return Err(AccountRepositoryError::duplicate_username(
                new_account.username.to_string(),
            ));
        }

        let id = AccountId::new(next(&mut state.sequences.account));
        let account = Account {
            id,
            username: new_account.username,
            role: new_account.role,
            created_at: new_account.created_at,
        };
        match account.role {
            Role::Student => {
                let student_id = StudentId::new(next(&mut state.sequences.student));
                state.students.insert(
                    student_id,
                    StudentRow {
                        account_id: id,
                        total_hours: 0.0,
                    },
                );
            }
            Role::Staff => {
                let staff_id = StaffId::new(next(&mut state.sequences.staff));
                state.staff.insert(staff_id, id);
            }
            Role::Admin => {}
        }
        state.accounts.insert(
            id,
            StoredAccount {
                account: account.clone(),
                password_hash: new_account.password_hash,
            },
        );
        Ok(account)
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<StoredAccount>, AccountRepositoryError> {
        let state = self.state.lock().await;
        Ok(state
            .accounts
            .values()
            .find(|stored| stored.account.username.as_ref() == username)
            .cloned())
    }

    async fn find_by_id(
        &self,
        account_id: AccountId,
    ) -> Result<Option<Account>, AccountRepositoryError> {
        let state = self.state.lock().await;
        Ok(state
            .accounts
            .get(&account_id)
            .map(|stored| stored.account.clone()))
    }
}
