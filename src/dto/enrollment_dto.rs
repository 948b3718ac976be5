use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EnrollRequest {
    #[validate(length(min = 1, message = "courseUrl must not be empty"))]
    pub course_url: String,
}
