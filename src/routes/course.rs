use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::dto::course_dto::{CreateCoursePayload, UpdateCoursePayload};
use crate::error::Result;
use crate::middleware::auth::Claims;
use crate::models::course::Course;
use crate::AppState;

#[axum::debug_handler]
pub async fn list_courses(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let courses: Vec<Course> = state.course_service.list_published().await?;
    Ok(Json(courses))
}

#[axum::debug_handler]
pub async fn get_course(
    State(state): State<AppState>,
    Path(course_url): Path<String>,
) -> Result<impl IntoResponse> {
    let course = state.course_service.get_by_url(&course_url).await?;
    Ok(Json(course))
}

#[utoipa::path(
    post,
    path = "/api/admin/courses",
    request_body = CreateCoursePayload,
    responses(
        (status = 201, description = "Course created", body = Json<Course>),
        (status = 400, description = "Invalid payload or duplicate slug"),
        (status = 403, description = "Not an instructor or admin"),
    ),
)]
#[axum::debug_handler]
pub async fn create_course(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateCoursePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let course = state
        .course_service
        .create(payload, claims.user_id()?)
        .await?;
    Ok((StatusCode::CREATED, Json(course)))
}

#[utoipa::path(
    patch,
    path = "/api/admin/courses/{id}",
    request_body = UpdateCoursePayload,
    params(
        ("id" = Uuid, Path, description = "Course ID")
    ),
    responses(
        (status = 200, description = "Course updated", body = Json<Course>),
        (status = 404, description = "Course not found"),
    ),
)]
#[axum::debug_handler]
pub async fn update_course(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCoursePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let course = state.course_service.update(id, payload).await?;
    Ok(Json(course))
}

#[axum::debug_handler]
pub async fn delete_course(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    // Instructors can unpublish but not delete.
    if !claims
        .role()
        .eq_ignore_ascii_case(crate::models::user::ROLE_ADMIN)
    {
        return Err(crate::error::Error::Forbidden(
            "course deletion requires the admin role".to_string(),
        ));
    }
    state.course_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
