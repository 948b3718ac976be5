use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

/// One scored submission of a course-day quiz by a student.
///
/// At most two attempts exist per (user, course, day); attempt numbers are
/// dense from 1 in submission order and immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct QuizAttempt {
    pub id: Uuid,
    pub user_id: Uuid,
    pub course_url: String,
    pub day_number: i32,
    pub title: String,
    pub questions: JsonValue,
    pub selected_answers: JsonValue,
    pub score: i32,
    pub submitted_date: DateTime<Utc>,
    pub attempt_number: i32,
    pub is_completed: bool,
    pub needs_leaderboard_update: bool,
    pub created_at: DateTime<Utc>,
}
