//! Per-student ledger views.
//!
//! ```text
//! GET /api/v1/students/{id}/requests
//! GET /api/v1/students/{id}/logs
//! GET /api/v1/students/{id}/accolades
//! ```

use actix_web::{get, web};

use crate::domain::ports::{ConfirmedLogs, StudentAccolades};
use crate::domain::{ConfirmationRequest, Error, StudentId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Every request a student submitted, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/students/{id}/requests",
    params(("id" = i64, Path, description = "Student identifier")),
    responses(
        (status = 200, description = "Request history", body = [ConfirmationRequest]),
        (status = 401, description = "Not logged in", body = Error),
        (status = 403, description = "Another student's history", body = Error),
        (status = 404, description = "Unknown student", body = Error)
    ),
    tags = ["students"],
    operation_id = "studentHistory"
)]
#[get("/students/{id}/requests")]
pub async fn student_history(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<web::Json<Vec<ConfirmationRequest>>> {
    let principal = session.require_principal()?;
    let history = state
        .queries
        .student_history(principal, StudentId::new(path.into_inner()))
        .await?;
    Ok(web::Json(history))
}

/// Confirmed log entries and the running total.
#[utoipa::path(
    get,
    path = "/api/v1/students/{id}/logs",
    params(("id" = i64, Path, description = "Student identifier")),
    responses(
        (status = 200, description = "Confirmed logs", body = ConfirmedLogs),
        (status = 401, description = "Not logged in", body = Error),
        (status = 403, description = "Another student's logs", body = Error),
        (status = 404, description = "Unknown student", body = Error)
    ),
    tags = ["students"],
    operation_id = "confirmedLogs"
)]
#[get("/students/{id}/logs")]
pub async fn confirmed_logs(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<web::Json<ConfirmedLogs>> {
    let principal = session.require_principal()?;
    let logs = state
        .queries
        .confirmed_logs(principal, StudentId::new(path.into_inner()))
        .await?;
    Ok(web::Json(logs))
}

/// Accolades held by a student. Public.
#[utoipa::path(
    get,
    path = "/api/v1/students/{id}/accolades",
    params(("id" = i64, Path, description = "Student identifier")),
    responses(
        (status = 200, description = "Accolades", body = StudentAccolades),
        (status = 404, description = "Unknown student", body = Error)
    ),
    tags = ["students"],
    operation_id = "studentAccolades",
    security([])
)]
#[get("/students/{id}/accolades")]
pub async fn student_accolades(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<web::Json<StudentAccolades>> {
    let accolades = state
        .queries
        .student_accolades(StudentId::new(path.into_inner()))
        .await?;
    Ok(web::Json(accolades))
}
