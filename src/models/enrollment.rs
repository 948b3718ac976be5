use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_PENDING: &str = "pending";
pub const STATUS_REJECTED: &str = "rejected";
pub const STATUS_WITHDRAWN: &str = "withdrawn";

/// Links a student to a course. One row per (user, course); never deleted
/// while the enrollment is active (rejected/withdrawn are status values).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub progress: f64,
    pub score: f64,
    pub status: String,
    pub completed_days: JsonValue,
    pub days_completed_per_duration: String,
    pub enrolled_at: DateTime<Utc>,
    pub last_accessed_at: Option<DateTime<Utc>>,
}

/// Enrollment joined with the course it belongs to, for "my courses" listings.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentWithCourse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub course_url: String,
    pub course_title: String,
    pub progress: f64,
    pub score: f64,
    pub status: String,
    pub completed_days: JsonValue,
    pub days_completed_per_duration: String,
    pub enrolled_at: DateTime<Utc>,
    pub last_accessed_at: Option<DateTime<Utc>>,
}
