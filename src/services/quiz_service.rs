use chrono::Utc;
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::quiz_dto::{PublicQuizQuestion, PublicQuizResponse, SubmitQuizRequest, UpsertQuizPayload};
use crate::error::{Error, Result};
use crate::models::quiz::{QuestionDetails, Quiz, QuizQuestion};
use crate::models::quiz_attempt::QuizAttempt;
use crate::services::scoring::ScoringService;

const MAX_ATTEMPTS_PER_DAY: i64 = 2;
const MAX_ATTEMPTS_MESSAGE: &str =
    "Maximum attempts reached for this quiz. You can attempt each quiz at most twice.";

#[derive(Clone)]
pub struct QuizService {
    pool: PgPool,
}

impl QuizService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_quiz(&self, course_url: &str, day_number: i32) -> Result<Quiz> {
        let quiz = sqlx::query_as::<_, Quiz>(
            r#"SELECT * FROM quizzes WHERE course_url = $1 AND day_number = $2"#,
        )
        .bind(course_url)
        .bind(day_number)
        .fetch_optional(&self.pool)
        .await?;

        quiz.ok_or_else(|| Error::NotFound("No quiz found for this course day".to_string()))
    }

    pub async fn upsert_quiz(
        &self,
        course_url: &str,
        day_number: i32,
        payload: UpsertQuizPayload,
        created_by: Uuid,
    ) -> Result<Quiz> {
        let questions = parse_questions(JsonValue::Array(payload.questions.clone()))?;
        for (idx, q) in questions.iter().enumerate() {
            validate_question(idx, q)?;
        }

        let quiz = sqlx::query_as::<_, Quiz>(
            r#"
            INSERT INTO quizzes (course_url, day_number, title, questions, created_by)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (course_url, day_number)
            DO UPDATE SET title = EXCLUDED.title, questions = EXCLUDED.questions, updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(course_url)
        .bind(day_number)
        .bind(&payload.title)
        .bind(JsonValue::Array(payload.questions))
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(quiz)
    }

    /// Quiz as served to students: correctness data never leaves the server.
    pub fn public_view(quiz: &Quiz) -> Result<PublicQuizResponse> {
        let questions = parse_questions(quiz.questions.clone())?;
        let public: Vec<PublicQuizQuestion> = questions
            .into_iter()
            .map(|q| {
                let options = match q.details {
                    QuestionDetails::SingleChoice(d) => d.options,
                    QuestionDetails::MultiSelect(d) => d.options,
                };
                PublicQuizQuestion {
                    id: q.id,
                    kind: q.kind,
                    prompt: q.prompt,
                    options,
                }
            })
            .collect();

        Ok(PublicQuizResponse {
            course_url: quiz.course_url.clone(),
            day_number: quiz.day_number,
            title: quiz.title.clone(),
            total_questions: public.len(),
            questions: public,
        })
    }

    /// Validates and persists one quiz submission.
    ///
    /// The attempt cap and the attempt number are enforced in a single
    /// conditional insert; the unique index on (user, course, day, attempt)
    /// catches the remaining concurrent-duplicate window. Scoring uses the
    /// server-held quiz only.
    pub async fn submit(&self, user_id: Uuid, req: &SubmitQuizRequest) -> Result<QuizAttempt> {
        if req.course_url.is_empty()
            || req.day_number < 1
            || req.questions.is_empty()
            || req.selected_answers.is_empty()
        {
            return Err(Error::BadRequest("Missing required fields".to_string()));
        }

        let quiz = self.get_quiz(&req.course_url, req.day_number).await?;
        let questions = parse_questions(quiz.questions.clone())?;
        let breakdown = ScoringService::score_submission(&questions, &req.selected_answers)?;

        let title = req.title.clone().unwrap_or_else(|| quiz.title.clone());
        let questions_snapshot = serde_json::to_value(&req.questions)?;
        let answers_json = serde_json::to_value(&req.selected_answers)?;
        let submitted_date = req.submitted_date.unwrap_or_else(Utc::now);
        let is_completed = breakdown.score >= 0;

        let inserted = sqlx::query_as::<_, QuizAttempt>(
            r#"
            INSERT INTO quiz_attempts
                (user_id, course_url, day_number, title, questions, selected_answers,
                 score, submitted_date, attempt_number, is_completed, needs_leaderboard_update)
            SELECT $1, $2, $3, $4, $5, $6, $7, $8, COUNT(*) + 1, $9, TRUE
            FROM quiz_attempts
            WHERE user_id = $1 AND course_url = $2 AND day_number = $3
            HAVING COUNT(*) < $10
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&req.course_url)
        .bind(req.day_number)
        .bind(&title)
        .bind(&questions_snapshot)
        .bind(&answers_json)
        .bind(breakdown.score)
        .bind(submitted_date)
        .bind(is_completed)
        .bind(MAX_ATTEMPTS_PER_DAY)
        .fetch_optional(&self.pool)
        .await;

        match inserted {
            Ok(Some(attempt)) => Ok(attempt),
            Ok(None) => Err(Error::BadRequest(MAX_ATTEMPTS_MESSAGE.to_string())),
            Err(sqlx::Error::Database(db)) if db.code().as_deref() == Some("23505") => {
                Err(Error::BadRequest(MAX_ATTEMPTS_MESSAGE.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Prior attempts for one course day, newest attempt first.
    pub async fn attempts_for_day(
        &self,
        user_id: Uuid,
        course_url: &str,
        day_number: i32,
    ) -> Result<Vec<QuizAttempt>> {
        let attempts = sqlx::query_as::<_, QuizAttempt>(
            r#"
            SELECT * FROM quiz_attempts
            WHERE user_id = $1 AND course_url = $2 AND day_number = $3
            ORDER BY attempt_number DESC
            "#,
        )
        .bind(user_id)
        .bind(course_url)
        .bind(day_number)
        .fetch_all(&self.pool)
        .await?;

        Ok(attempts)
    }
}

fn parse_questions(raw: JsonValue) -> Result<Vec<QuizQuestion>> {
    let questions: Vec<QuizQuestion> = serde_json::from_value(raw)
        .map_err(|e| Error::BadRequest(format!("Malformed quiz questions: {}", e)))?;
    Ok(questions)
}

fn validate_question(idx: usize, question: &QuizQuestion) -> Result<()> {
    let in_range = |selected: i32, len: usize| selected >= 0 && (selected as usize) < len;
    let ok = match &question.details {
        QuestionDetails::SingleChoice(d) => {
            !d.options.is_empty() && in_range(d.correct_answer, d.options.len())
        }
        QuestionDetails::MultiSelect(d) => {
            !d.options.is_empty()
                && !d.correct_answers.is_empty()
                && d.correct_answers.iter().all(|c| in_range(*c, d.options.len()))
        }
    };
    if !ok {
        return Err(Error::BadRequest(format!(
            "Question {} has no valid answer key",
            idx + 1
        )));
    }
    Ok(())
}
