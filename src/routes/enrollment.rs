use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use validator::Validate;

use crate::dto::enrollment_dto::EnrollRequest;
use crate::error::Result;
use crate::middleware::auth::Claims;
use crate::AppState;

#[axum::debug_handler]
pub async fn enroll(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<EnrollRequest>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let enrollment = state
        .enrollment_service
        .enroll(claims.user_id()?, &payload.course_url)
        .await?;
    Ok((StatusCode::CREATED, Json(enrollment)))
}

#[axum::debug_handler]
pub async fn my_courses(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let enrollments = state
        .enrollment_service
        .my_courses(claims.user_id()?)
        .await?;
    Ok(Json(enrollments))
}

#[axum::debug_handler]
pub async fn complete_day(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((course_url, day_number)): Path<(String, i32)>,
) -> Result<impl IntoResponse> {
    let enrollment = state
        .enrollment_service
        .mark_day_completed(claims.user_id()?, &course_url, day_number)
        .await?;
    Ok(Json(enrollment))
}

#[axum::debug_handler]
pub async fn withdraw(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(course_url): Path<String>,
) -> Result<impl IntoResponse> {
    state
        .enrollment_service
        .withdraw(claims.user_id()?, &course_url)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
