use axum::{
    extract::State,
    response::{IntoResponse, Json},
};

use crate::dto::settings_dto::UpdateSettingsRequest;
use crate::error::Result;
use crate::AppState;

#[axum::debug_handler]
pub async fn get_settings(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let settings = state.settings_service.get().await?;
    Ok(Json(settings))
}

#[axum::debug_handler]
pub async fn update_settings(
    State(state): State<AppState>,
    Json(payload): Json<UpdateSettingsRequest>,
) -> Result<impl IntoResponse> {
    let settings = state.settings_service.update(payload).await?;
    Ok(Json(settings))
}
