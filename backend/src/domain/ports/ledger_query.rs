//! Driving port for read-only ledger views.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    Accolade, ConfirmationRequest, Error, LeaderboardLimit, Principal, ServiceLogEntry, StudentId,
    Username,
};

/// Confirmed log entries for a student, most recent first.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmedLogs {
    pub student_id: StudentId,
    pub entries: Vec<ServiceLogEntry>,
    pub total_hours: f64,
}

/// Pending work for one student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PendingStudentSummary {
    pub student_id: StudentId,
    pub username: Username,
    pub current_hours: f64,
    pub pending_requests: usize,
    pub pending_hours: f64,
}

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    /// 1-based position.
    pub rank: usize,
    pub student_id: StudentId,
    pub username: Username,
    pub total_hours: f64,
    /// Space-joined badges such as `"10h 25h"`, or `"No accolades"`.
    #[schema(example = "10h 25h")]
    pub accolades: String,
}

/// Accolades held by a student, lowest threshold first.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentAccolades {
    pub student_id: StudentId,
    pub username: Username,
    pub accolades: Vec<Accolade>,
}

/// Ledger read models.
#[async_trait]
pub trait LedgerQuery: Send + Sync {
    /// Every request a student submitted. Staff, admins, or the student.
    async fn student_history(
        &self,
        principal: Principal,
        student_id: StudentId,
    ) -> Result<Vec<ConfirmationRequest>, Error>;

    /// Confirmed log entries and current total. Staff, admins, or the student.
    async fn confirmed_logs(
        &self,
        principal: Principal,
        student_id: StudentId,
    ) -> Result<ConfirmedLogs, Error>;

    /// Pending requests grouped per student. Staff and admins only.
    async fn pending_by_student(
        &self,
        principal: Principal,
    ) -> Result<Vec<PendingStudentSummary>, Error>;

    /// Public ranking by total hours.
    async fn leaderboard(&self, limit: LeaderboardLimit) -> Result<Vec<LeaderboardEntry>, Error>;

    /// Public list of a student's accolades.
    async fn student_accolades(&self, student_id: StudentId) -> Result<StudentAccolades, Error>;
}
