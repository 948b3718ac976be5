use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::course_dto::{CreateCoursePayload, UpdateCoursePayload};
use crate::error::{Error, Result};
use crate::models::course::Course;

#[derive(Clone)]
pub struct CourseService {
    pool: PgPool,
}

impl CourseService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, payload: CreateCoursePayload, instructor_id: Uuid) -> Result<Course> {
        let exists = sqlx::query(r#"SELECT id FROM courses WHERE course_url = $1"#)
            .bind(&payload.course_url)
            .fetch_optional(&self.pool)
            .await?;
        if exists.is_some() {
            return Err(Error::BadRequest(
                "A course with this URL already exists".to_string(),
            ));
        }

        let course = sqlx::query_as::<_, Course>(
            r#"
            INSERT INTO courses (course_url, title, description, instructor_id, duration_days, is_published)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&payload.course_url)
        .bind(&payload.title)
        .bind(&payload.description)
        .bind(instructor_id)
        .bind(payload.duration_days)
        .bind(payload.is_published.unwrap_or(false))
        .fetch_one(&self.pool)
        .await?;

        Ok(course)
    }

    pub async fn update(&self, id: Uuid, payload: UpdateCoursePayload) -> Result<Course> {
        let current = self.get_by_id(id).await?;

        let title = payload.title.unwrap_or(current.title);
        let description = payload.description.or(current.description);
        let duration_days = payload.duration_days.unwrap_or(current.duration_days);
        let is_published = payload.is_published.unwrap_or(current.is_published);

        let course = sqlx::query_as::<_, Course>(
            r#"
            UPDATE courses
            SET title = $1, description = $2, duration_days = $3, is_published = $4,
                updated_at = NOW()
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(&title)
        .bind(&description)
        .bind(duration_days)
        .bind(is_published)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(course)
    }

    pub async fn list_published(&self) -> Result<Vec<Course>> {
        let courses = sqlx::query_as::<_, Course>(
            r#"SELECT * FROM courses WHERE is_published ORDER BY created_at DESC"#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(courses)
    }

    pub async fn get_by_url(&self, course_url: &str) -> Result<Course> {
        let course = sqlx::query_as::<_, Course>(
            r#"SELECT * FROM courses WHERE course_url = $1"#,
        )
        .bind(course_url)
        .fetch_optional(&self.pool)
        .await?;
        course.ok_or_else(|| Error::NotFound("Course not found".to_string()))
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Course> {
        let course = sqlx::query_as::<_, Course>(r#"SELECT * FROM courses WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        course.ok_or_else(|| Error::NotFound("Course not found".to_string()))
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query(r#"DELETE FROM courses WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Course not found".to_string()));
        }
        Ok(())
    }
}
