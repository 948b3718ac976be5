use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::dto::message_dto::{SendMessageRequest, UnreadCountResponse};
use crate::error::Result;
use crate::middleware::auth::Claims;
use crate::models::message::CreateMessage;
use crate::AppState;

#[axum::debug_handler]
pub async fn send_message(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<SendMessageRequest>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let message = state
        .message_service
        .send(CreateMessage {
            sender_id: claims.user_id()?,
            recipient_id: payload.recipient_id,
            text: payload.text,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(message)))
}

#[axum::debug_handler]
pub async fn get_conversation(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let messages = state
        .message_service
        .conversation(claims.user_id()?, user_id)
        .await?;
    Ok(Json(messages))
}

#[axum::debug_handler]
pub async fn unread_count(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let unread = state
        .message_service
        .unread_count(claims.user_id()?)
        .await?;
    Ok(Json(UnreadCountResponse { unread }))
}

#[axum::debug_handler]
pub async fn mark_read(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let updated = state
        .message_service
        .mark_as_read(claims.user_id()?, user_id)
        .await?;
    Ok(Json(serde_json::json!({ "updated": updated })))
}
