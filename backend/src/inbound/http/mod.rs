//! HTTP inbound adapter exposing the ledger under `/api/v1`.

pub mod accounts;
pub mod auth;
pub mod error;
pub mod health;
pub mod leaderboard;
pub mod requests;
pub mod session;
pub mod state;
pub mod students;
#[cfg(test)]
pub mod test_utils;

pub use error::ApiResult;

use actix_web::web;

/// Register every `/api/v1` handler on the enclosing scope.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(auth::login)
        .service(auth::logout)
        .service(auth::current_principal)
        .service(accounts::create_account)
        .service(requests::submit_request)
        .service(requests::list_pending)
        .service(requests::approve_request)
        .service(requests::reject_request)
        .service(students::student_history)
        .service(students::confirmed_logs)
        .service(students::student_accolades)
        .service(leaderboard::leaderboard);
}
