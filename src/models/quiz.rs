use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

/// Server-held quiz for one course day. `questions` is the authoritative
/// question set, including option correctness; never sent to students as-is.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub id: Uuid,
    pub course_url: String,
    pub day_number: i32,
    pub title: String,
    pub questions: JsonValue,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    #[serde(default)]
    pub id: i32,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub prompt: String,
    #[serde(flatten)]
    pub details: QuestionDetails,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    SingleChoice,
    MultiSelect,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuestionDetails {
    SingleChoice(SingleChoiceDetails),
    MultiSelect(MultiSelectDetails),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleChoiceDetails {
    pub options: Vec<String>,
    pub correct_answer: i32,
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiSelectDetails {
    pub options: Vec<String>,
    pub correct_answers: Vec<i32>,
}

/// One submitted answer, discriminated by question type and validated at the
/// boundary against the server-held question it answers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SubmittedAnswer {
    SingleChoice { selected: i32 },
    MultiSelect { selected: Vec<i32> },
}
