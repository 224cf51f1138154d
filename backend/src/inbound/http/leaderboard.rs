//! Public leaderboard.
//!
//! ```text
//! GET /api/v1/leaderboard?limit=3
//! ```

use actix_web::{get, web};
use serde::Deserialize;
use serde_json::json;
use utoipa::IntoParams;

use crate::domain::ports::LeaderboardEntry;
use crate::domain::{Error, LeaderboardLimit, LeaderboardLimitError};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Query parameters for the leaderboard.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LeaderboardQuery {
    /// Rows to return, 1 to 100. Defaults to 10.
    pub limit: Option<usize>,
}

fn map_limit_error(err: LeaderboardLimitError) -> Error {
    Error::invalid_request(err.to_string()).with_details(json!({
        "field": "limit",
        "code": "out_of_range",
        "max": err.max,
    }))
}

/// Students ranked by total hours, ties broken by id.
#[utoipa::path(
    get,
    path = "/api/v1/leaderboard",
    params(LeaderboardQuery),
    responses(
        (status = 200, description = "Leaderboard", body = [LeaderboardEntry]),
        (status = 400, description = "Limit out of range", body = Error)
    ),
    tags = ["leaderboard"],
    operation_id = "leaderboard",
    security([])
)]
#[get("/leaderboard")]
pub async fn leaderboard(
    state: web::Data<HttpState>,
    query: web::Query<LeaderboardQuery>,
) -> ApiResult<web::Json<Vec<LeaderboardEntry>>> {
    let limit = LeaderboardLimit::from_optional(query.into_inner().limit).map_err(map_limit_error)?;
    let rows = state.queries.leaderboard(limit).await?;
    Ok(web::Json(rows))
}
