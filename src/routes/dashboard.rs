use axum::{
    extract::State,
    response::{IntoResponse, Json},
};

use crate::error::Result;
use crate::AppState;

#[axum::debug_handler]
pub async fn get_stats(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let stats = state.dashboard_service.stats().await?;
    Ok(Json(stats))
}
