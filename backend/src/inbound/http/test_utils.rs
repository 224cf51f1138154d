//! Test helpers for inbound HTTP components.
//!
//! Handler tests run against the real services over an [`InMemoryLedger`],
//! so each request exercises the same role checks and credit path as
//! production.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, test, web};
use mockable::DefaultClock;
use serde_json::json;

use crate::domain::ports::LedgerRepository;
use crate::domain::{
    AccountService, LedgerQueryService, Principal, RequestLifecycleService, Role, StaffId,
    StudentId,
};
use crate::inbound::http::configure_api;
use crate::inbound::http::state::HttpState;
use crate::outbound::memory::InMemoryLedger;

pub const STAFF_PASSWORD: &str = "staffpass";
pub const STUDENT_PASSWORD: &str = "studentpass";
pub const ADMIN_PASSWORD: &str = "adminpass";

/// Build a session middleware configured for tests.
///
/// Generates a fresh key per invocation and disables the `Secure` flag for
/// plain-HTTP test requests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// The `session` cookie set on `res`.
pub fn session_cookie<B>(res: &ServiceResponse<B>) -> Cookie<'static> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie set")
        .into_owned()
}

/// An in-memory ledger with one admin, one staff member and two students.
pub struct LedgerFixture {
    pub ledger: Arc<InMemoryLedger>,
    pub state: HttpState,
    pub staff: StaffId,
    pub staff_principal: Principal,
    pub student1: StudentId,
    pub student1_principal: Principal,
    pub student2: StudentId,
}

pub async fn ledger_fixture() -> LedgerFixture {
    let ledger = Arc::new(InMemoryLedger::new());
    let clock = Arc::new(DefaultClock);
    let accounts = Arc::new(AccountService::new(ledger.clone(), clock.clone()).with_hash_rounds(1_000));

    accounts
        .provision("admin", ADMIN_PASSWORD, Role::Admin)
        .await
        .expect("admin provisioned");
    let staff_account = accounts
        .provision("staff1", STAFF_PASSWORD, Role::Staff)
        .await
        .expect("staff provisioned");
    let mut students = Vec::new();
    let mut student_principals = Vec::new();
    for name in ["student1", "student2"] {
        let account = accounts
            .provision(name, STUDENT_PASSWORD, Role::Student)
            .await
            .expect("student provisioned");
        let profile = ledger
            .find_student_by_account(account.id)
            .await
            .expect("lookup")
            .expect("student profile");
        students.push(profile.student_id);
        student_principals.push(Principal::new(account.id, Role::Student));
    }
    let staff = ledger
        .find_staff_by_account(staff_account.id)
        .await
        .expect("lookup")
        .expect("staff profile")
        .staff_id;

    let state = HttpState::new(
        accounts.clone(),
        accounts,
        Arc::new(RequestLifecycleService::new(ledger.clone(), clock)),
        Arc::new(LedgerQueryService::new(ledger.clone())),
    );

    LedgerFixture {
        ledger,
        state,
        staff,
        staff_principal: Principal::new(staff_account.id, Role::Staff),
        student1: students[0],
        student1_principal: student_principals[0],
        student2: students[1],
    }
}

/// The API routes over `state` behind a test session layer.
pub fn api_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new().app_data(web::Data::new(state)).service(
        web::scope("/api/v1")
            .wrap(test_session_middleware())
            .configure(configure_api),
    )
}

/// `POST /api/v1/login` for `username`.
pub fn login_request(username: &str, password: &str) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/api/v1/login")
        .set_json(json!({ "username": username, "password": password }))
}
