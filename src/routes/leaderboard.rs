use axum::{
    extract::{Query, State},
    response::{IntoResponse, Json},
};

use crate::dto::leaderboard_dto::{LeaderboardQuery, LeaderboardResponse};
use crate::error::Result;
use crate::AppState;

#[utoipa::path(
    get,
    path = "/api/leaderboard",
    params(
        ("courseUrl" = Option<String>, Query, description = "Restrict rankings to one course"),
    ),
    responses(
        (status = 200, description = "Students ranked by total points", body = Json<LeaderboardResponse>),
        (status = 401, description = "Not authenticated"),
    ),
)]
#[axum::debug_handler]
pub async fn get_leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<impl IntoResponse> {
    let rankings = state
        .leaderboard_service
        .rankings(query.course_url)
        .await?;
    Ok(Json(LeaderboardResponse { rankings }))
}
