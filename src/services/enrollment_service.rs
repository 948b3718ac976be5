use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::course::Course;
use crate::models::enrollment::{Enrollment, EnrollmentWithCourse, STATUS_ACTIVE, STATUS_WITHDRAWN};

#[derive(Clone)]
pub struct EnrollmentService {
    pool: PgPool,
}

impl EnrollmentService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn enroll(&self, user_id: Uuid, course_url: &str) -> Result<Enrollment> {
        let course = self.course_by_url(course_url).await?;
        if !course.is_published {
            return Err(Error::BadRequest(
                "This course is not open for enrollment".to_string(),
            ));
        }

        let existing = sqlx::query_as::<_, Enrollment>(
            r#"SELECT * FROM enrollments WHERE user_id = $1 AND course_id = $2"#,
        )
        .bind(user_id)
        .bind(course.id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(enrollment) = existing {
            if enrollment.status == STATUS_WITHDRAWN {
                let reactivated = sqlx::query_as::<_, Enrollment>(
                    r#"
                    UPDATE enrollments SET status = $1, last_accessed_at = NOW()
                    WHERE id = $2
                    RETURNING *
                    "#,
                )
                .bind(STATUS_ACTIVE)
                .bind(enrollment.id)
                .fetch_one(&self.pool)
                .await?;
                return Ok(reactivated);
            }
            return Err(Error::BadRequest(
                "Already enrolled in this course".to_string(),
            ));
        }

        let enrollment = sqlx::query_as::<_, Enrollment>(
            r#"
            INSERT INTO enrollments (user_id, course_id, days_completed_per_duration)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(course.id)
        .bind(format!("0/{}", course.duration_days))
        .fetch_one(&self.pool)
        .await?;

        Ok(enrollment)
    }

    pub async fn my_courses(&self, user_id: Uuid) -> Result<Vec<EnrollmentWithCourse>> {
        let enrollments = sqlx::query_as::<_, EnrollmentWithCourse>(
            r#"
            SELECT
                e.id, e.user_id, e.course_id, c.course_url, c.title AS course_title,
                e.progress, e.score, e.status, e.completed_days,
                e.days_completed_per_duration, e.enrolled_at, e.last_accessed_at
            FROM enrollments e
            JOIN courses c ON c.id = e.course_id
            WHERE e.user_id = $1 AND e.status = $2
            ORDER BY e.enrolled_at ASC
            "#,
        )
        .bind(user_id)
        .bind(STATUS_ACTIVE)
        .fetch_all(&self.pool)
        .await?;

        Ok(enrollments)
    }

    /// Records a completed course day and recomputes the progress percentage.
    /// Shared by video completion and the quiz-submission side effect.
    pub async fn mark_day_completed(
        &self,
        user_id: Uuid,
        course_url: &str,
        day_number: i32,
    ) -> Result<Enrollment> {
        let course = self.course_by_url(course_url).await?;
        if day_number < 1 || day_number > course.duration_days {
            return Err(Error::BadRequest(format!(
                "Day {} is outside this course's {}-day schedule",
                day_number, course.duration_days
            )));
        }

        let enrollment = sqlx::query_as::<_, Enrollment>(
            r#"SELECT * FROM enrollments WHERE user_id = $1 AND course_id = $2 AND status = $3"#,
        )
        .bind(user_id)
        .bind(course.id)
        .bind(STATUS_ACTIVE)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("No active enrollment for this course".to_string()))?;

        let mut completed: Vec<i32> =
            serde_json::from_value(enrollment.completed_days.clone()).unwrap_or_default();
        if !completed.contains(&day_number) {
            completed.push(day_number);
            completed.sort_unstable();
        }

        let progress =
            (completed.len() as f64 / course.duration_days as f64 * 100.0).min(100.0);
        let days_completed = format!("{}/{}", completed.len(), course.duration_days);

        let updated = sqlx::query_as::<_, Enrollment>(
            r#"
            UPDATE enrollments
            SET completed_days = $1, progress = $2, days_completed_per_duration = $3,
                last_accessed_at = NOW()
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(serde_json::to_value(&completed)?)
        .bind(progress)
        .bind(days_completed)
        .bind(enrollment.id)
        .fetch_one(&self.pool)
        .await?;

        Ok(updated)
    }

    pub async fn withdraw(&self, user_id: Uuid, course_url: &str) -> Result<()> {
        let course = self.course_by_url(course_url).await?;
        let result = sqlx::query(
            r#"
            UPDATE enrollments SET status = $1, last_accessed_at = NOW()
            WHERE user_id = $2 AND course_id = $3 AND status = $4
            "#,
        )
        .bind(STATUS_WITHDRAWN)
        .bind(user_id)
        .bind(course.id)
        .bind(STATUS_ACTIVE)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(
                "No active enrollment for this course".to_string(),
            ));
        }
        Ok(())
    }

    async fn course_by_url(&self, course_url: &str) -> Result<Course> {
        let course =
            sqlx::query_as::<_, Course>(r#"SELECT * FROM courses WHERE course_url = $1"#)
                .bind(course_url)
                .fetch_optional(&self.pool)
                .await?;
        course.ok_or_else(|| Error::NotFound("Course not found".to_string()))
    }
}
