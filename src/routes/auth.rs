use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use validator::Validate;

use crate::dto::auth_dto::{AuthResponse, LoginRequest, RegisterRequest, UserSummary};
use crate::error::Result;
use crate::middleware::auth::Claims;
use crate::utils::token::create_token;
use crate::AppState;

#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let user = state.user_service.register(payload).await?;
    let token = create_token(user.id, &user.role)?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: UserSummary::from(user),
        }),
    ))
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let user = state
        .user_service
        .authenticate(&payload.email, &payload.password)
        .await?;
    let token = create_token(user.id, &user.role)?;
    Ok(Json(AuthResponse {
        token,
        user: UserSummary::from(user),
    }))
}

#[axum::debug_handler]
pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let user = state.user_service.get_by_id(claims.user_id()?).await?;
    Ok(Json(UserSummary::from(user)))
}
