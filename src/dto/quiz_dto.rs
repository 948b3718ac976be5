use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use validator::Validate;

use crate::models::quiz::{QuestionKind, SubmittedAnswer};
use crate::models::quiz_attempt::QuizAttempt;

/// Quiz submission body. `questions` is the client's snapshot of what it
/// displayed, persisted for audit only; scoring uses the server-held quiz.
/// `score` is likewise accepted but ignored.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitQuizRequest {
    #[serde(default)]
    pub course_url: String,
    #[serde(default)]
    pub day_number: i32,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub questions: Vec<JsonValue>,
    #[serde(default)]
    pub selected_answers: Vec<SubmittedAnswer>,
    #[serde(default)]
    pub score: Option<i32>,
    #[serde(default)]
    pub submitted_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitQuizResponse {
    pub message: String,
    pub submission: QuizAttempt,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpsertQuizPayload {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    #[validate(length(min = 1, message = "a quiz needs at least one question"))]
    pub questions: Vec<JsonValue>,
}

/// Question as shown to a student: option correctness stripped.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicQuizQuestion {
    pub id: i32,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub prompt: String,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicQuizResponse {
    pub course_url: String,
    pub day_number: i32,
    pub title: String,
    pub total_questions: usize,
    pub questions: Vec<PublicQuizQuestion>,
}
