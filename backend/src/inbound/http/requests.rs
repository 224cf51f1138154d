//! Confirmation request endpoints.
//!
//! ```text
//! POST /api/v1/requests {"hours":5.0,"description":"Food Drive"}
//! GET  /api/v1/requests/pending
//! POST /api/v1/requests/{id}/approve
//! POST /api/v1/requests/{id}/reject {"reason":"not eligible"}
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::ports::{ApprovalReceipt, PendingStudentSummary, SubmitHoursRequest};
use crate::domain::{ConfirmationRequest, Error, RequestId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Optional rejection body.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RejectRequest {
    #[schema(example = "Not an eligible activity")]
    pub reason: Option<String>,
}

/// An empty body means no reason; anything else must be a valid
/// [`RejectRequest`].
fn parse_reject_body(body: &[u8]) -> Result<RejectRequest, Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(RejectRequest::default());
    }
    serde_json::from_slice(body).map_err(|err| {
        Error::invalid_request(format!("malformed rejection body: {err}"))
            .with_details(json!({ "field": "body", "code": "malformed_json" }))
    })
}

/// Submit hours for review. Students only.
#[utoipa::path(
    post,
    path = "/api/v1/requests",
    request_body = SubmitHoursRequest,
    responses(
        (status = 201, description = "Request created", body = ConfirmationRequest),
        (status = 400, description = "Invalid hours or description", body = Error),
        (status = 401, description = "Not logged in", body = Error),
        (status = 403, description = "Not a student", body = Error)
    ),
    tags = ["requests"],
    operation_id = "submitRequest"
)]
#[post("/requests")]
pub async fn submit_request(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<SubmitHoursRequest>,
) -> ApiResult<HttpResponse> {
    let principal = session.require_principal()?;
    let request = state
        .lifecycle
        .submit(principal, payload.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(request))
}

/// Pending requests grouped per student. Staff and admins only.
#[utoipa::path(
    get,
    path = "/api/v1/requests/pending",
    responses(
        (status = 200, description = "Pending work", body = [PendingStudentSummary]),
        (status = 401, description = "Not logged in", body = Error),
        (status = 403, description = "Students may not list pending work", body = Error)
    ),
    tags = ["requests"],
    operation_id = "listPending"
)]
#[get("/requests/pending")]
pub async fn list_pending(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<PendingStudentSummary>>> {
    let principal = session.require_principal()?;
    let pending = state.queries.pending_by_student(principal).await?;
    Ok(web::Json(pending))
}

/// Approve a pending request, crediting hours and awarding accolades.
#[utoipa::path(
    post,
    path = "/api/v1/requests/{id}/approve",
    params(("id" = i64, Path, description = "Request identifier")),
    responses(
        (status = 200, description = "Request approved", body = ApprovalReceipt),
        (status = 401, description = "Not logged in", body = Error),
        (status = 403, description = "Not staff", body = Error),
        (status = 404, description = "Unknown request", body = Error),
        (status = 409, description = "Request already resolved", body = Error)
    ),
    tags = ["requests"],
    operation_id = "approveRequest"
)]
#[post("/requests/{id}/approve")]
pub async fn approve_request(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<web::Json<ApprovalReceipt>> {
    let principal = session.require_principal()?;
    let request_id = RequestId::new(path.into_inner());
    let receipt = state.lifecycle.approve(principal, request_id).await?;
    Ok(web::Json(receipt))
}

/// Reject a pending request with an optional reason.
#[utoipa::path(
    post,
    path = "/api/v1/requests/{id}/reject",
    params(("id" = i64, Path, description = "Request identifier")),
    request_body(content = RejectRequest, description = "Optional reason"),
    responses(
        (status = 200, description = "Request rejected", body = ConfirmationRequest),
        (status = 400, description = "Malformed body or reason too long", body = Error),
        (status = 401, description = "Not logged in", body = Error),
        (status = 403, description = "Not staff", body = Error),
        (status = 404, description = "Unknown request", body = Error),
        (status = 409, description = "Request already resolved", body = Error)
    ),
    tags = ["requests"],
    operation_id = "rejectRequest"
)]
#[post("/requests/{id}/reject")]
pub async fn reject_request(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
    body: web::Bytes,
) -> ApiResult<web::Json<ConfirmationRequest>> {
    let principal = session.require_principal()?;
    let request_id = RequestId::new(path.into_inner());
    let reason = parse_reject_body(&body)?.reason;
    let rejected = state.lifecycle.reject(principal, request_id, reason).await?;
    Ok(web::Json(rejected))
}
