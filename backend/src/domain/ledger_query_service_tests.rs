//! Tests for the ledger query service.

use std::sync::Arc;

use chrono::Utc;
use rstest::rstest;

use super::*;
use crate::domain::ports::{LedgerRepositoryError, MockLedgerRepository, StudentLogs};
use crate::domain::{
    Accolade, AccoladeId, AccountId, Description, ErrorCode, RequestId, ServiceHours, Username,
};

fn student(id: i64, total_hours: f64) -> StudentSummary {
    StudentSummary {
        student_id: StudentId::new(id),
        account_id: AccountId::new(100 + id),
        username: Username::new(format!("student{id}")).expect("valid username"),
        total_hours,
    }
}

fn accolade(student_id: i64, kind: AccoladeKind) -> Accolade {
    Accolade {
        id: AccoladeId::new(student_id * 10),
        student_id: StudentId::new(student_id),
        accolade_type: kind,
        awarded_at: Utc::now(),
    }
}

fn pending(id: i64, student_id: i64, hours: f64) -> ConfirmationRequest {
    ConfirmationRequest::pending(
        RequestId::new(id),
        StudentId::new(student_id),
        ServiceHours::new(hours).expect("valid hours"),
        Description::default(),
        Utc::now(),
    )
}

fn service(repo: MockLedgerRepository) -> LedgerQueryService<MockLedgerRepository> {
    LedgerQueryService::new(Arc::new(repo))
}

#[tokio::test]
async fn leaderboard_ranks_and_renders_badges() {
    let mut repo = MockLedgerRepository::new();
    repo.expect_list_leaderboard()
        .withf(|limit| *limit == 3)
        .returning(|_| Ok(vec![student(4, 50.0), student(2, 25.0), student(3, 25.0)]));
    repo.expect_list_accolades_for_students().returning(|_| {
        Ok(vec![
            accolade(4, AccoladeKind::TenHours),
            accolade(4, AccoladeKind::TwentyFiveHours),
            accolade(4, AccoladeKind::FiftyHours),
            accolade(2, AccoladeKind::TenHours),
            accolade(2, AccoladeKind::TwentyFiveHours),
        ])
    });

    let board = service(repo)
        .leaderboard(LeaderboardLimit::new(3).expect("valid limit"))
        .await
        .expect("leaderboard");

    let ranks: Vec<_> = board
        .iter()
        .map(|entry| (entry.rank, entry.student_id.get(), entry.accolades.as_str()))
        .collect();
    assert_eq!(
        ranks,
        vec![
            (1, 4, "10h 25h 50h"),
            (2, 2, "10h 25h"),
            (3, 3, "No accolades"),
        ]
    );
}

#[rstest]
#[case(Role::Staff)]
#[case(Role::Admin)]
#[tokio::test]
async fn staff_and_admin_may_view_any_history(#[case] role: Role) {
    let mut repo = MockLedgerRepository::new();
    repo.expect_find_student()
        .returning(|id| Ok(Some(student(id.get(), 3.0))));
    repo.expect_find_student_by_account().times(0);
    repo.expect_list_requests_for_student()
        .returning(|id| Ok(vec![pending(1, id.get(), 3.0)]));

    let history = service(repo)
        .student_history(Principal::new(AccountId::new(1), role), StudentId::new(5))
        .await
        .expect("history visible");

    assert_eq!(history.len(), 1);
}

#[tokio::test]
async fn students_may_not_view_other_students() {
    let mut repo = MockLedgerRepository::new();
    repo.expect_find_student_by_account()
        .returning(|_| Ok(Some(student(1, 0.0))));
    repo.expect_find_student_logs().times(0);

    let error = service(repo)
        .confirmed_logs(
            Principal::new(AccountId::new(101), Role::Student),
            StudentId::new(2),
        )
        .await
        .expect_err("other student's logs");

    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn confirmed_logs_include_current_total() {
    let mut repo = MockLedgerRepository::new();
    repo.expect_find_student_by_account()
        .returning(|_| Ok(Some(student(1, 12.5))));
    repo.expect_find_student_logs().returning(|_| {
        Ok(Some(StudentLogs {
            student: student(1, 12.5),
            entries: Vec::new(),
        }))
    });

    let logs = service(repo)
        .confirmed_logs(
            Principal::new(AccountId::new(101), Role::Student),
            StudentId::new(1),
        )
        .await
        .expect("own logs");

    assert_eq!(logs.total_hours, 12.5);
    assert!(logs.entries.is_empty());
}

#[tokio::test]
async fn confirmed_logs_total_comes_from_the_same_read_as_entries() {
    let mut repo = MockLedgerRepository::new();
    repo.expect_find_student()
        .returning(|_| Ok(Some(student(1, 3.0))));
    repo.expect_list_logs_for_student().times(0);
    repo.expect_find_student_logs()
        .withf(|id| *id == StudentId::new(1))
        .times(1)
        .returning(|_| {
            Ok(Some(StudentLogs {
                student: student(1, 8.0),
                entries: Vec::new(),
            }))
        });

    let logs = service(repo)
        .confirmed_logs(Principal::new(AccountId::new(1), Role::Staff), StudentId::new(1))
        .await
        .expect("staff may view logs");

    assert_eq!(logs.total_hours, 8.0);
}

#[tokio::test]
async fn student_removed_between_reads_is_not_found() {
    let mut repo = MockLedgerRepository::new();
    repo.expect_find_student()
        .returning(|_| Ok(Some(student(1, 3.0))));
    repo.expect_find_student_logs().returning(|_| Ok(None));

    let error = service(repo)
        .confirmed_logs(Principal::new(AccountId::new(1), Role::Staff), StudentId::new(1))
        .await
        .expect_err("vanished student");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn unknown_student_history_is_not_found() {
    let mut repo = MockLedgerRepository::new();
    repo.expect_find_student().returning(|_| Ok(None));

    let error = service(repo)
        .student_history(
            Principal::new(AccountId::new(1), Role::Staff),
            StudentId::new(99),
        )
        .await
        .expect_err("missing student");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn pending_by_student_groups_counts_and_hours() {
    let mut repo = MockLedgerRepository::new();
    repo.expect_list_pending_requests().returning(|| {
        Ok(vec![
            pending(1, 2, 3.0),
            pending(2, 2, 4.5),
            pending(3, 5, 2.0),
        ])
    });
    repo.expect_find_students()
        .withf(|ids| ids.to_vec() == vec![StudentId::new(2), StudentId::new(5)])
        .returning(|_| Ok(vec![student(2, 10.0), student(5, 0.0)]));

    let summaries = service(repo)
        .pending_by_student(Principal::new(AccountId::new(1), Role::Staff))
        .await
        .expect("pending summaries");

    assert_eq!(summaries.len(), 2);
    let first = summaries.first().expect("first summary");
    assert_eq!(first.student_id, StudentId::new(2));
    assert_eq!(first.pending_requests, 2);
    assert_eq!(first.pending_hours, 7.5);
    assert_eq!(first.current_hours, 10.0);
}

#[tokio::test]
async fn pending_by_student_is_closed_to_students() {
    let mut repo = MockLedgerRepository::new();
    repo.expect_list_pending_requests().times(0);

    let error = service(repo)
        .pending_by_student(Principal::new(AccountId::new(1), Role::Student))
        .await
        .expect_err("students cannot list pending work");

    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn store_outage_maps_to_service_unavailable() {
    let mut repo = MockLedgerRepository::new();
    repo.expect_list_leaderboard()
        .returning(|_| Err(LedgerRepositoryError::connection("pool timed out")));

    let error = service(repo)
        .leaderboard(LeaderboardLimit::default())
        .await
        .expect_err("store down");

    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}

#[tokio::test]
async fn student_accolades_lists_holdings() {
    let mut repo = MockLedgerRepository::new();
    repo.expect_find_student()
        .returning(|id| Ok(Some(student(id.get(), 26.0))));
    repo.expect_list_accolades_for_students().returning(|_| {
        Ok(vec![
            accolade(3, AccoladeKind::TenHours),
            accolade(3, AccoladeKind::TwentyFiveHours),
        ])
    });

    let held = service(repo)
        .student_accolades(StudentId::new(3))
        .await
        .expect("accolades");

    assert_eq!(held.username.as_ref(), "student3");
    assert_eq!(held.accolades.len(), 2);
}
