use std::collections::HashMap;

use serde::Serialize;
use sqlx::{PgPool, Row};

use crate::error::Result;
use crate::models::user::ROLE_STUDENT;

#[derive(Clone)]
pub struct DashboardService {
    pool: PgPool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_students: i64,
    pub total_courses: i64,
    pub total_enrollments: i64,
    pub total_quiz_attempts: i64,
    pub average_quiz_score: Option<f64>,
    pub attempts_by_course: HashMap<String, i64>,
}

impl DashboardService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn stats(&self) -> Result<DashboardStats> {
        let total_students: i64 =
            sqlx::query_scalar(r#"SELECT COUNT(*) FROM users WHERE role = $1 AND is_active"#)
                .bind(ROLE_STUDENT)
                .fetch_one(&self.pool)
                .await?;

        let total_courses: i64 =
            sqlx::query_scalar(r#"SELECT COUNT(*) FROM courses WHERE is_published"#)
                .fetch_one(&self.pool)
                .await?;

        let total_enrollments: i64 =
            sqlx::query_scalar(r#"SELECT COUNT(*) FROM enrollments WHERE status = 'active'"#)
                .fetch_one(&self.pool)
                .await?;

        let total_quiz_attempts: i64 =
            sqlx::query_scalar(r#"SELECT COUNT(*) FROM quiz_attempts"#)
                .fetch_one(&self.pool)
                .await?;

        let average_quiz_score: Option<f64> =
            sqlx::query_scalar(r#"SELECT AVG(score)::float8 FROM quiz_attempts"#)
                .fetch_one(&self.pool)
                .await?;

        let rows = sqlx::query(
            r#"SELECT course_url, COUNT(*) AS attempts FROM quiz_attempts GROUP BY course_url"#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut attempts_by_course = HashMap::new();
        for row in rows {
            let course_url: String = row.try_get("course_url")?;
            let attempts: i64 = row.try_get("attempts")?;
            attempts_by_course.insert(course_url, attempts);
        }

        Ok(DashboardStats {
            total_students,
            total_courses,
            total_enrollments,
            total_quiz_attempts,
            average_quiz_score,
            attempts_by_course,
        })
    }
}
