use std::collections::BTreeMap;
use std::sync::Arc;

use sqlx::PgPool;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use uuid::Uuid;

use crate::config::get_config;
use crate::dto::leaderboard_dto::{LeaderboardEntry, LeaderboardMetrics};
use crate::error::{Error, Result};
use crate::models::user::ROLE_STUDENT;

#[derive(Clone)]
pub struct LeaderboardService {
    pool: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct StudentRow {
    id: Uuid,
    name: String,
    avatar_url: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct ProgressRow {
    progress: f64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct ScoredAttempt {
    pub(crate) course_url: String,
    pub(crate) day_number: i32,
    pub(crate) score: i32,
}

impl LeaderboardService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Recomputes the full ranking from enrollment and attempt data.
    ///
    /// Students are aggregated independently with a bounded fan-out; the
    /// result order is a function of the data alone (students are fetched in
    /// a fixed order and ties keep that order). Any per-student failure
    /// aborts the whole request.
    pub async fn rankings(&self, course_scope: Option<String>) -> Result<Vec<LeaderboardEntry>> {
        let students = sqlx::query_as::<_, StudentRow>(
            r#"
            SELECT id, name, avatar_url FROM users
            WHERE role = $1 AND is_active
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(ROLE_STUDENT)
        .fetch_all(&self.pool)
        .await?;

        let limit = get_config().leaderboard_concurrency.max(1);
        let semaphore = Arc::new(Semaphore::new(limit));
        let mut workers: JoinSet<Result<(usize, LeaderboardMetrics)>> = JoinSet::new();

        for (idx, student) in students.iter().enumerate() {
            let svc = self.clone();
            let permits = semaphore.clone();
            let scope = course_scope.clone();
            let user_id = student.id;
            workers.spawn(async move {
                let _permit = permits
                    .acquire_owned()
                    .await
                    .map_err(|_| Error::Internal("aggregation semaphore closed".to_string()))?;
                let metrics = svc.student_metrics(user_id, scope.as_deref()).await?;
                Ok((idx, metrics))
            });
        }

        let mut collected: Vec<Option<LeaderboardMetrics>> = vec![None; students.len()];
        while let Some(joined) = workers.join_next().await {
            let (idx, metrics) = joined
                .map_err(|e| Error::Internal(format!("aggregation worker failed: {}", e)))??;
            collected[idx] = Some(metrics);
        }

        let mut entries = Vec::with_capacity(students.len());
        for (student, metrics) in students.into_iter().zip(collected) {
            let metrics = metrics
                .ok_or_else(|| Error::Internal("missing metrics for student".to_string()))?;
            entries.push(LeaderboardEntry {
                user_id: student.id,
                name: student.name,
                avatar_url: student.avatar_url,
                rank: 0,
                metrics,
            });
        }
        rank_entries(&mut entries);

        if let Some(course_url) = course_scope.as_deref() {
            if let Err(e) = self.clear_refresh_flags(course_url).await {
                tracing::warn!(
                    "Failed to clear leaderboard refresh flags for {}: {:?}",
                    course_url,
                    e
                );
            }
        }

        Ok(entries)
    }

    async fn student_metrics(
        &self,
        user_id: Uuid,
        course_scope: Option<&str>,
    ) -> Result<LeaderboardMetrics> {
        let enrollments = sqlx::query_as::<_, ProgressRow>(
            r#"
            SELECT e.progress
            FROM enrollments e
            JOIN courses c ON c.id = e.course_id
            WHERE e.user_id = $1
              AND e.status = 'active'
              AND ($2::text IS NULL OR c.course_url = $2)
            "#,
        )
        .bind(user_id)
        .bind(course_scope)
        .fetch_all(&self.pool)
        .await?;

        let course_count = enrollments.len() as i64;
        let course_points: f64 = enrollments.iter().map(|row| row.progress).sum();

        let attempts = sqlx::query_as::<_, ScoredAttempt>(
            r#"
            SELECT course_url, day_number, score FROM quiz_attempts
            WHERE user_id = $1 AND ($2::text IS NULL OR course_url = $2)
            "#,
        )
        .bind(user_id)
        .bind(course_scope)
        .fetch_all(&self.pool)
        .await?;

        let quiz_points = quiz_points(&attempts);

        Ok(LeaderboardMetrics {
            course_count,
            course_points,
            quiz_points,
            total_points: course_points + quiz_points,
        })
    }

    async fn clear_refresh_flags(&self, course_url: &str) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE quiz_attempts SET needs_leaderboard_update = FALSE
            WHERE course_url = $1 AND needs_leaderboard_update
            "#,
        )
        .bind(course_url)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

/// Repeated attempts for the same (course, day) are averaged, the per-day
/// averages are averaged per course, and the per-course means are summed.
pub(crate) fn quiz_points(attempts: &[ScoredAttempt]) -> f64 {
    let mut by_day: BTreeMap<(String, i32), Vec<i32>> = BTreeMap::new();
    for attempt in attempts {
        by_day
            .entry((attempt.course_url.clone(), attempt.day_number))
            .or_default()
            .push(attempt.score);
    }

    let mut by_course: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for ((course_url, _), scores) in by_day {
        let day_average = scores.iter().map(|s| f64::from(*s)).sum::<f64>() / scores.len() as f64;
        by_course.entry(course_url).or_default().push(day_average);
    }

    by_course
        .values()
        .map(|day_averages| day_averages.iter().sum::<f64>() / day_averages.len() as f64)
        .sum()
}

/// Stable descending sort by total points, then 1-based positional ranks.
/// Equal totals keep their input order.
pub(crate) fn rank_entries(entries: &mut [LeaderboardEntry]) {
    entries.sort_by(|a, b| {
        b.metrics
            .total_points
            .partial_cmp(&a.metrics.total_points)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    for (idx, entry) in entries.iter_mut().enumerate() {
        entry.rank = idx as u32 + 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attempt(course_url: &str, day_number: i32, score: i32) -> ScoredAttempt {
        ScoredAttempt {
            course_url: course_url.to_string(),
            day_number,
            score,
        }
    }

    fn entry(name: &str, total_points: f64) -> LeaderboardEntry {
        LeaderboardEntry {
            user_id: Uuid::new_v4(),
            name: name.to_string(),
            avatar_url: None,
            rank: 0,
            metrics: LeaderboardMetrics {
                course_count: 1,
                course_points: 0.0,
                quiz_points: 0.0,
                total_points,
            },
        }
    }

    #[test]
    fn repeated_attempts_on_one_day_are_averaged() {
        // 60 and 80 on the same day contribute 70, not best-of or latest.
        let attempts = vec![attempt("rust-basics", 1, 60), attempt("rust-basics", 1, 80)];
        assert_eq!(quiz_points(&attempts), 70.0);
    }

    #[test]
    fn per_course_points_are_the_mean_of_day_averages() {
        let attempts = vec![
            attempt("rust-basics", 1, 60),
            attempt("rust-basics", 1, 80), // day 1 -> 70
            attempt("rust-basics", 2, 90), // day 2 -> 90
        ];
        assert_eq!(quiz_points(&attempts), 80.0);
    }

    #[test]
    fn courses_are_summed_after_averaging() {
        let attempts = vec![
            attempt("rust-basics", 1, 70),
            attempt("web-dev", 1, 50),
            attempt("web-dev", 2, 100), // web-dev -> 75
        ];
        assert_eq!(quiz_points(&attempts), 145.0);
    }

    #[test]
    fn no_attempts_means_zero_quiz_points() {
        assert_eq!(quiz_points(&[]), 0.0);
    }

    #[test]
    fn aggregation_is_deterministic() {
        let attempts = vec![
            attempt("a", 1, 33),
            attempt("a", 2, 67),
            attempt("b", 1, 50),
        ];
        assert_eq!(quiz_points(&attempts), quiz_points(&attempts));
    }

    #[test]
    fn ranking_sorts_descending_with_positional_ranks() {
        let mut entries = vec![entry("low", 10.0), entry("high", 220.0), entry("mid", 70.0)];
        rank_entries(&mut entries);
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["high", "mid", "low"]);
        assert_eq!(
            entries.iter().map(|e| e.rank).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn ties_keep_input_order() {
        let mut entries = vec![
            entry("first-at-100", 100.0),
            entry("second-at-100", 100.0),
            entry("top", 150.0),
        ];
        rank_entries(&mut entries);
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["top", "first-at-100", "second-at-100"]);
        assert_eq!(
            entries.iter().map(|e| e.rank).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }
}
