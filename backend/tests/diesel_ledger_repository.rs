//! Ledger services over the Diesel adapters against embedded PostgreSQL.
//!
//! Each test gets its own database cloned from the migrated template. Set
//! `SKIP_TEST_CLUSTER=1` where the cluster cannot be bootstrapped.

use std::sync::Arc;

use diesel_async::RunQueryDsl;
use mockable::DefaultClock;
use pg_embedded_setup_unpriv::TemporaryDatabase;
use rstest::{fixture, rstest};
use tokio::runtime::Runtime;

use volunteer_ledger::domain::ports::{
    AccountRepository, AccountRepositoryError, LedgerQuery, LedgerRepository,
    RequestLifecycleCommand, SubmitHoursRequest,
};
use volunteer_ledger::domain::{
    AccountService, ErrorCode, LeaderboardLimit, LedgerQueryService, NewAccount, PasswordHash,
    Principal, RequestId, RequestLifecycleService, RequestStatus, Role, StudentId, Username,
};
use volunteer_ledger::outbound::persistence::{
    DbPool, DieselAccountRepository, DieselLedgerRepository, PoolConfig,
};

mod support;

use support::embedded_postgres::shared_cluster;
use support::{handle_cluster_setup_failure, provision_template_database};

struct TestContext {
    runtime: Runtime,
    pool: DbPool,
    ledger: Arc<DieselLedgerRepository>,
    accounts: Arc<AccountService<DieselAccountRepository>>,
    lifecycle: Arc<RequestLifecycleService<DieselLedgerRepository>>,
    queries: LedgerQueryService<DieselLedgerRepository>,
    _database: TemporaryDatabase,
}

impl TestContext {
    fn provision(&self, username: &str, role: Role) -> Principal {
        let account = self
            .runtime
            .block_on(self.accounts.provision(username, "secret", role))
            .expect("account provisioned");
        Principal::new(account.id, role)
    }

    fn student_id(&self, principal: Principal) -> StudentId {
        self.runtime
            .block_on(self.ledger.find_student_by_account(principal.account_id))
            .expect("lookup")
            .expect("student profile")
            .student_id
    }

    fn submit(&self, student: Principal, hours: f64) -> RequestId {
        self.runtime
            .block_on(self.lifecycle.submit(
                student,
                SubmitHoursRequest {
                    hours,
                    description: "Park Cleanup".into(),
                },
            ))
            .expect("submitted")
            .id()
    }

    fn approve(&self, staff: Principal, student: Principal, hours: f64) {
        let request_id = self.submit(student, hours);
        self.runtime
            .block_on(self.lifecycle.approve(staff, request_id))
            .expect("approved");
    }

    fn total_hours(&self, student_id: StudentId) -> f64 {
        self.runtime
            .block_on(self.ledger.find_student(student_id))
            .expect("lookup")
            .expect("student")
            .total_hours
    }
}

fn setup_context() -> Result<TestContext, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let cluster = shared_cluster()?;
    let temp_db = provision_template_database(cluster)?;

    let config = PoolConfig::new(temp_db.url())
        .with_max_size(8)
        .with_min_idle(Some(1));
    let pool = runtime
        .block_on(DbPool::new(config))
        .map_err(|err| err.to_string())?;

    let clock = Arc::new(DefaultClock);
    let ledger = Arc::new(DieselLedgerRepository::new(pool.clone()));
    let accounts = Arc::new(
        AccountService::new(Arc::new(DieselAccountRepository::new(pool.clone())), clock.clone())
            .with_hash_rounds(1_000),
    );
    let lifecycle = Arc::new(RequestLifecycleService::new(ledger.clone(), clock));
    let queries = LedgerQueryService::new(ledger.clone());

    Ok(TestContext {
        runtime,
        pool,
        ledger,
        accounts,
        lifecycle,
        queries,
        _database: temp_db,
    })
}

#[fixture]
fn ledger_db() -> Option<TestContext> {
    match setup_context() {
        Ok(ctx) => Some(ctx),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

#[rstest]
fn approval_credits_logs_and_awards_once(ledger_db: Option<TestContext>) {
    let Some(ctx) = ledger_db else {
        eprintln!("SKIP-TEST-CLUSTER: approval_credits_logs_and_awards_once skipped");
        return;
    };
    let staff = ctx.provision("staff1", Role::Staff);
    let student = ctx.provision("student1", Role::Student);
    let student_id = ctx.student_id(student);

    let first = ctx.submit(student, 10.0);
    let receipt = ctx
        .runtime
        .block_on(ctx.lifecycle.approve(staff, first))
        .expect("approved");
    assert_eq!(receipt.new_total_hours, 10.0);
    assert_eq!(receipt.request.status(), RequestStatus::Approved);
    assert_eq!(receipt.awarded.len(), 1);

    ctx.approve(staff, student, 15.0);
    assert_eq!(ctx.total_hours(student_id), 25.0);

    let logs = ctx
        .runtime
        .block_on(ctx.queries.confirmed_logs(staff, student_id))
        .expect("logs");
    assert_eq!(logs.entries.len(), 2);
    let logged: f64 = logs.entries.iter().map(|entry| entry.hours.get()).sum();
    assert_eq!(logged, logs.total_hours);

    let accolades = ctx
        .runtime
        .block_on(ctx.queries.student_accolades(student_id))
        .expect("accolades");
    assert_eq!(accolades.accolades.len(), 2);

    let again = ctx
        .runtime
        .block_on(ctx.lifecycle.approve(staff, first))
        .expect_err("already approved");
    assert_eq!(again.code(), ErrorCode::Conflict);
    assert_eq!(ctx.total_hours(student_id), 25.0);
}

#[rstest]
fn concurrent_approvals_credit_once(ledger_db: Option<TestContext>) {
    let Some(ctx) = ledger_db else {
        eprintln!("SKIP-TEST-CLUSTER: concurrent_approvals_credit_once skipped");
        return;
    };
    let staff = ctx.provision("staff1", Role::Staff);
    let student = ctx.provision("student1", Role::Student);
    let student_id = ctx.student_id(student);
    let request_id = ctx.submit(student, 7.0);

    let outcomes = ctx.runtime.block_on(async {
        let handles: Vec<_> = (0..6)
            .map(|_| {
                let lifecycle = ctx.lifecycle.clone();
                tokio::spawn(async move { lifecycle.approve(staff, request_id).await })
            })
            .collect();
        let mut outcomes = Vec::new();
        for handle in handles {
            outcomes.push(handle.await.expect("task joined"));
        }
        outcomes
    });

    let successes = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
    assert_eq!(successes, 1);
    assert!(
        outcomes
            .iter()
            .filter_map(|outcome| outcome.as_ref().err())
            .all(|err| err.code() == ErrorCode::Conflict)
    );
    assert_eq!(ctx.total_hours(student_id), 7.0);
    let logs = ctx
        .runtime
        .block_on(ctx.ledger.list_logs_for_student(student_id))
        .expect("logs");
    assert_eq!(logs.len(), 1);
}

#[rstest]
fn rejection_records_reason_without_credit(ledger_db: Option<TestContext>) {
    let Some(ctx) = ledger_db else {
        eprintln!("SKIP-TEST-CLUSTER: rejection_records_reason_without_credit skipped");
        return;
    };
    let staff = ctx.provision("staff2", Role::Staff);
    let student = ctx.provision("student2", Role::Student);
    let student_id = ctx.student_id(student);
    let request_id = ctx.submit(student, 8.0);

    let rejected = ctx
        .runtime
        .block_on(
            ctx.lifecycle
                .reject(staff, request_id, Some("Not eligible".into())),
        )
        .expect("rejected");
    assert_eq!(rejected.status(), RequestStatus::Rejected);
    assert_eq!(
        rejected.reason().map(|reason| reason.as_ref()),
        Some("Not eligible")
    );
    assert_eq!(ctx.total_hours(student_id), 0.0);

    let approve = ctx
        .runtime
        .block_on(ctx.lifecycle.approve(staff, request_id))
        .expect_err("rejected requests stay rejected");
    assert_eq!(approve.code(), ErrorCode::Conflict);
}

#[rstest]
fn leaderboard_breaks_ties_by_student_id(ledger_db: Option<TestContext>) {
    let Some(ctx) = ledger_db else {
        eprintln!("SKIP-TEST-CLUSTER: leaderboard_breaks_ties_by_student_id skipped");
        return;
    };
    let staff = ctx.provision("staff1", Role::Staff);
    let students: Vec<Principal> = ["s_a", "s_b", "s_c", "s_d"]
        .into_iter()
        .map(|name| ctx.provision(name, Role::Student))
        .collect();
    for _ in 0..3 {
        ctx.approve(staff, students[0], 16.0);
    }
    ctx.approve(staff, students[0], 2.0);
    ctx.approve(staff, students[2], 20.0);
    ctx.approve(staff, students[2], 5.0);
    ctx.approve(staff, students[1], 20.0);
    ctx.approve(staff, students[1], 5.0);

    let limit = LeaderboardLimit::new(3).expect("valid limit");
    let board = ctx
        .runtime
        .block_on(ctx.queries.leaderboard(limit))
        .expect("leaderboard");
    let rows: Vec<(&str, f64, &str)> = board
        .iter()
        .map(|row| (row.username.as_ref(), row.total_hours, row.accolades.as_str()))
        .collect();
    assert_eq!(
        rows,
        [
            ("s_a", 50.0, "10h 25h 50h"),
            ("s_b", 25.0, "10h 25h"),
            ("s_c", 25.0, "10h 25h"),
        ]
    );
}

#[rstest]
fn confirmed_logs_read_total_and_entries_together(ledger_db: Option<TestContext>) {
    let Some(ctx) = ledger_db else {
        eprintln!("SKIP-TEST-CLUSTER: confirmed_logs_read_total_and_entries_together skipped");
        return;
    };
    let staff = ctx.provision("staff1", Role::Staff);
    let student = ctx.provision("student1", Role::Student);
    let student_id = ctx.student_id(student);
    ctx.approve(staff, student, 4.0);
    ctx.approve(staff, student, 1.5);

    let logs = ctx
        .runtime
        .block_on(ctx.queries.confirmed_logs(student, student_id))
        .expect("own logs");
    let logged: f64 = logs.entries.iter().map(|entry| entry.hours.get()).sum();
    assert_eq!(logs.total_hours, 5.5);
    assert_eq!(logged, logs.total_hours);
    assert_eq!(logs.entries[0].hours.get(), 1.5);

    let missing = ctx
        .runtime
        .block_on(ctx.ledger.find_student_logs(StudentId::new(i64::MAX)))
        .expect("lookup");
    assert!(missing.is_none());
}

#[rstest]
fn duplicate_usernames_are_reported(ledger_db: Option<TestContext>) {
    let Some(ctx) = ledger_db else {
        eprintln!("SKIP-TEST-CLUSTER: duplicate_usernames_are_reported skipped");
        return;
    };
    let repo = DieselAccountRepository::new(ctx.pool.clone());
    let new_account = NewAccount {
        username: Username::new("student1").expect("valid username"),
        password_hash: PasswordHash::derive_with_rounds("secret", 1_000),
        role: Role::Student,
        created_at: chrono::Utc::now(),
    };
    ctx.runtime
        .block_on(repo.create(new_account.clone()))
        .expect("first insert");
    let err = ctx
        .runtime
        .block_on(repo.create(new_account))
        .expect_err("duplicate");
    assert!(matches!(err, AccountRepositoryError::DuplicateUsername { .. }));
}

#[rstest]
fn service_log_rejects_updates(ledger_db: Option<TestContext>) {
    let Some(ctx) = ledger_db else {
        eprintln!("SKIP-TEST-CLUSTER: service_log_rejects_updates skipped");
        return;
    };
    let staff = ctx.provision("staff1", Role::Staff);
    let student = ctx.provision("student1", Role::Student);
    ctx.approve(staff, student, 4.0);

    let result = ctx.runtime.block_on(async {
        let mut conn = ctx.pool.get().await.expect("connection");
        diesel::sql_query("UPDATE service_log_entries SET hours = 1")
            .execute(&mut conn)
            .await
    });
    assert!(result.is_err(), "append-only trigger should refuse updates");
}
