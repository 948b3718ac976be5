use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::validation::validate_course_url;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCoursePayload {
    #[validate(custom(function = validate_course_url))]
    pub course_url: String,
    #[validate(length(min = 1, max = 200, message = "title must not be empty"))]
    pub title: String,
    pub description: Option<String>,
    #[validate(range(min = 1, max = 365, message = "durationDays must be between 1 and 365"))]
    pub duration_days: i32,
    pub is_published: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCoursePayload {
    #[validate(length(min = 1, max = 200, message = "title must not be empty"))]
    pub title: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 1, max = 365, message = "durationDays must be between 1 and 365"))]
    pub duration_days: Option<i32>,
    pub is_published: Option<bool>,
}
