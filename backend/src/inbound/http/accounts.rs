//! Account administration endpoint.
//!
//! ```text
//! POST /api/v1/accounts {"username":"student8","password":"studentpass","role":"student"}
//! ```

use actix_web::{HttpResponse, post, web};

use crate::domain::ports::NewAccountRequest;
use crate::domain::{Account, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Create an account and its role profile. Admins only.
#[utoipa::path(
    post,
    path = "/api/v1/accounts",
    request_body = NewAccountRequest,
    responses(
        (status = 201, description = "Account created", body = Account),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Not logged in", body = Error),
        (status = 403, description = "Not an admin", body = Error),
        (status = 409, description = "Username taken", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "createAccount"
)]
#[post("/accounts")]
pub async fn create_account(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<NewAccountRequest>,
) -> ApiResult<HttpResponse> {
    let principal = session.require_principal()?;
    let account = state
        .accounts
        .create_account(principal, payload.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(account))
}
