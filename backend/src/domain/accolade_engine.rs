//! Aggregation and accolade engine.
//!
//! The single path through which hours reach a student's total. Store
//! adapters call [`AccoladeEngine::apply_credit`] from inside their approval
//! transaction, passing a [`CreditLedger`] bound to that transaction.

use std::sync::Arc;

use mockable::Clock;
use tracing::info;

use crate::domain::ports::{CreditLedger, LedgerRepositoryError};
use crate::domain::{AccoladeKind, AccoladeLadder, ServiceHours, StudentId};

/// Result of crediting hours to a student.
#[derive(Debug, Clone, PartialEq)]
pub struct CreditOutcome {
    pub new_total: f64,
    /// Kinds awarded by this credit, lowest first.
    pub awarded: Vec<AccoladeKind>,
}

/// Credits hours and awards milestone accolades.
#[derive(Clone)]
pub struct AccoladeEngine {
    ladder: AccoladeLadder,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for AccoladeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccoladeEngine")
            .field("ladder", &self.ladder)
            .finish_non_exhaustive()
    }
}

impl AccoladeEngine {
    /// Engine using the standard 10/25/50 hour ladder.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_ladder(AccoladeLadder::default(), clock)
    }

    pub fn with_ladder(ladder: AccoladeLadder, clock: Arc<dyn Clock>) -> Self {
        Self { ladder, clock }
    }

    /// Atomically add `hours` to the student's total; returns the new total.
    pub async fn credit_hours<L>(
        &self,
        ledger: &mut L,
        student_id: StudentId,
        hours: ServiceHours,
    ) -> Result<f64, LedgerRepositoryError>
    where
        L: CreditLedger + ?Sized,
    {
        ledger.increment_total_hours(student_id, hours).await
    }

    /// Award every threshold `current_total` has reached that the student
    /// does not already hold. Re-running with the same total awards nothing.
    pub async fn evaluate_accolades<L>(
        &self,
        ledger: &mut L,
        student_id: StudentId,
        current_total: f64,
    ) -> Result<Vec<AccoladeKind>, LedgerRepositoryError>
    where
        L: CreditLedger + ?Sized,
    {
        let awarded_at = self.clock.utc();
        let mut awarded = Vec::new();
        for kind in self.ladder.qualifying(current_total) {
            if ledger
                .insert_accolade_if_absent(student_id, kind, awarded_at)
                .await?
            {
                info!(
                    student_id = student_id.get(),
                    accolade = kind.as_str(),
                    total_hours = current_total,
                    "accolade awarded"
                );
                awarded.push(kind);
            }
        }
        Ok(awarded)
    }

    /// Credit hours then evaluate accolades against the new total.
    pub async fn apply_credit<L>(
        &self,
        ledger: &mut L,
        student_id: StudentId,
        hours: ServiceHours,
    ) -> Result<CreditOutcome, LedgerRepositoryError>
    where
        L: CreditLedger + ?Sized,
    {
        let new_total = self.credit_hours(ledger, student_id, hours).await?;
        let awarded = self
            .evaluate_accolades(ledger, student_id, new_total)
            .await?;
        Ok(CreditOutcome { new_total, awarded })
    }
}
