//! Transactional write surface used by the accolade engine.
//!
//! Store adapters hand the engine an implementation bound to the approval
//! transaction that is already open, so crediting hours and awarding
//! accolades commit or roll back together with the request transition.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{AccoladeKind, ServiceHours, StudentId};

use super::LedgerRepositoryError;

#[async_trait]
pub trait CreditLedger: Send {
    /// Atomically add `hours` to the student's total and return the new
    /// total. Implementations must not read-modify-write in memory.
    async fn increment_total_hours(
        &mut self,
        student_id: StudentId,
        hours: ServiceHours,
    ) -> Result<f64, LedgerRepositoryError>;

    /// Insert the accolade unless the student already holds it. Returns
    /// whether a row was written.
    async fn insert_accolade_if_absent(
        &mut self,
        student_id: StudentId,
        kind: AccoladeKind,
        awarded_at: DateTime<Utc>,
    ) -> Result<bool, LedgerRepositoryError>;
}
