use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json},
    Extension,
};
use validator::Validate;

use crate::dto::quiz_dto::{SubmitQuizRequest, SubmitQuizResponse, UpsertQuizPayload};
use crate::error::Result;
use crate::middleware::auth::Claims;
use crate::services::quiz_service::QuizService;
use crate::AppState;

#[utoipa::path(
    post,
    path = "/api/quizzes/submit",
    request_body = SubmitQuizRequest,
    responses(
        (status = 200, description = "Quiz submitted and scored", body = Json<SubmitQuizResponse>),
        (status = 400, description = "Missing fields or maximum attempts reached"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "No quiz exists for this course day"),
    ),
)]
#[axum::debug_handler]
pub async fn submit_quiz(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SubmitQuizRequest>,
) -> Result<impl IntoResponse> {
    let user_id = claims.user_id()?;
    let attempt = state.quiz_service.submit(user_id, &req).await?;

    tracing::info!(
        "Quiz attempt {} recorded: user={}, course={}, day={}, score={}",
        attempt.attempt_number,
        user_id,
        attempt.course_url,
        attempt.day_number,
        attempt.score
    );

    // Day-completion marker on the enrollment is best-effort; a missing
    // course or enrollment must not fail the submission.
    if let Err(e) = state
        .enrollment_service
        .mark_day_completed(user_id, &req.course_url, req.day_number)
        .await
    {
        tracing::warn!(
            "Progress update skipped for user={} course={}: {:?}",
            user_id,
            req.course_url,
            e
        );
    }

    Ok(Json(SubmitQuizResponse {
        message: "Quiz submitted successfully".to_string(),
        submission: attempt,
    }))
}

#[axum::debug_handler]
pub async fn get_quiz(
    State(state): State<AppState>,
    Path((course_url, day_number)): Path<(String, i32)>,
) -> Result<impl IntoResponse> {
    let quiz = state.quiz_service.get_quiz(&course_url, day_number).await?;
    Ok(Json(QuizService::public_view(&quiz)?))
}

#[axum::debug_handler]
pub async fn my_attempts(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((course_url, day_number)): Path<(String, i32)>,
) -> Result<impl IntoResponse> {
    let attempts = state
        .quiz_service
        .attempts_for_day(claims.user_id()?, &course_url, day_number)
        .await?;
    Ok(Json(attempts))
}

#[utoipa::path(
    put,
    path = "/api/admin/quizzes/{course_url}/days/{day_number}",
    request_body = UpsertQuizPayload,
    params(
        ("course_url" = String, Path, description = "Course slug"),
        ("day_number" = i32, Path, description = "Course day"),
    ),
    responses(
        (status = 200, description = "Quiz created or replaced"),
        (status = 400, description = "Invalid question set"),
        (status = 403, description = "Not an instructor or admin"),
    ),
)]
#[axum::debug_handler]
pub async fn upsert_quiz(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((course_url, day_number)): Path<(String, i32)>,
    Json(payload): Json<UpsertQuizPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let quiz = state
        .quiz_service
        .upsert_quiz(&course_url, day_number, payload, claims.user_id()?)
        .await?;
    Ok(Json(quiz))
}
