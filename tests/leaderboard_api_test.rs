use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    routing::get,
    Router,
};
use serde_json::{json, Value as JsonValue};
use tower::ServiceExt;
use uuid::Uuid;

fn init_test_env() -> bool {
    dotenvy::dotenv().ok();
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("DATABASE_URL is not set; skipping database-backed test");
        return false;
    }
    std::env::set_var("SERVER_ADDRESS", "127.0.0.1:0");
    std::env::set_var("JWT_SECRET", "test_secret_key");
    std::env::set_var("PUBLIC_RPS", "100");
    std::env::set_var("API_RPS", "100");
    std::env::set_var("LEADERBOARD_CONCURRENCY", "4");
    let _ = learnhub_backend::config::init_config();
    true
}

async fn seed_attempt(
    pool: &sqlx::PgPool,
    user_id: Uuid,
    course_url: &str,
    day_number: i32,
    attempt_number: i32,
    score: i32,
) {
    sqlx::query(
        r#"
        INSERT INTO quiz_attempts
            (user_id, course_url, day_number, title, questions, selected_answers,
             score, attempt_number, is_completed, needs_leaderboard_update)
        VALUES ($1, $2, $3, 'seeded', '[]'::jsonb, '[]'::jsonb, $4, $5, TRUE, TRUE)
        "#,
    )
    .bind(user_id)
    .bind(course_url)
    .bind(day_number)
    .bind(score)
    .bind(attempt_number)
    .execute(pool)
    .await
    .expect("seed attempt");
}

fn find<'a>(rankings: &'a [JsonValue], user_id: Uuid) -> &'a JsonValue {
    rankings
        .iter()
        .find(|e| e["userId"] == json!(user_id.to_string()))
        .expect("student present in rankings")
}

fn position(rankings: &[JsonValue], user_id: Uuid) -> usize {
    rankings
        .iter()
        .position(|e| e["userId"] == json!(user_id.to_string()))
        .expect("student present in rankings")
}

#[tokio::test]
async fn leaderboard_aggregation_end_to_end() {
    if !init_test_env() {
        return;
    }

    let pool = learnhub_backend::database::pool::create_pool()
        .await
        .expect("pool");
    sqlx::migrate!("./migrations").run(&pool).await.expect("migrations");

    let suffix = Uuid::new_v4().simple().to_string();
    let course_a = format!("course-a-{}", suffix);
    let course_b = format!("course-b-{}", suffix);

    let user_service = learnhub_backend::services::user_service::UserService::new(pool.clone());
    let mut students = Vec::new();
    for name in ["Alice", "Bob", "Carol"] {
        let user = user_service
            .register(learnhub_backend::dto::auth_dto::RegisterRequest {
                name: name.into(),
                email: format!("{}_{}@example.com", name.to_lowercase(), suffix),
                password: "secret-password".into(),
                role: None,
            })
            .await
            .expect("register student");
        students.push(user);
    }
    let (alice, bob, carol) = (&students[0], &students[1], &students[2]);
    let instructor = user_service
        .register(learnhub_backend::dto::auth_dto::RegisterRequest {
            name: "Ines".into(),
            email: format!("ines_{}@example.com", suffix),
            password: "secret-password".into(),
            role: Some("instructor".into()),
        })
        .await
        .expect("register instructor");

    let course_service =
        learnhub_backend::services::course_service::CourseService::new(pool.clone());
    for url in [&course_a, &course_b] {
        course_service
            .create(
                learnhub_backend::dto::course_dto::CreateCoursePayload {
                    course_url: url.clone(),
                    title: format!("Course {}", url),
                    description: None,
                    duration_days: 10,
                    is_published: Some(true),
                },
                instructor.id,
            )
            .await
            .expect("create course");
    }

    let enrollment_service =
        learnhub_backend::services::enrollment_service::EnrollmentService::new(pool.clone());
    enrollment_service.enroll(alice.id, &course_a).await.unwrap();
    enrollment_service.enroll(alice.id, &course_b).await.unwrap();
    enrollment_service.enroll(bob.id, &course_a).await.unwrap();
    enrollment_service.enroll(carol.id, &course_a).await.unwrap();

    // Pin progress values: alice 100 + 50 = 150 course points, bob and carol 50 each.
    for (user_id, url, progress) in [
        (alice.id, &course_a, 100.0_f64),
        (alice.id, &course_b, 50.0),
        (bob.id, &course_a, 50.0),
        (carol.id, &course_a, 50.0),
    ] {
        sqlx::query(
            r#"
            UPDATE enrollments SET progress = $1
            WHERE user_id = $2 AND course_id = (SELECT id FROM courses WHERE course_url = $3)
            "#,
        )
        .bind(progress)
        .bind(user_id)
        .bind(url)
        .execute(&pool)
        .await
        .unwrap();
    }

    // Alice retried day 1: 60 and 80 average to 70 quiz points for course A.
    seed_attempt(&pool, alice.id, &course_a, 1, 1, 60).await;
    seed_attempt(&pool, alice.id, &course_a, 1, 2, 80).await;

    let token = learnhub_backend::utils::token::create_token(alice.id, &alice.role).expect("token");
    let app_state = learnhub_backend::AppState::new(pool.clone());
    let app = Router::new()
        .route(
            "/api/leaderboard",
            get(learnhub_backend::routes::leaderboard::get_leaderboard),
        )
        .layer(axum::middleware::from_fn(
            learnhub_backend::middleware::auth::require_bearer_auth,
        ))
        .with_state(app_state);

    let fetch = |uri: String| {
        let app = app.clone();
        let token = token.clone();
        async move {
            let req = Request::builder()
                .method("GET")
                .uri(uri)
                .header("authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap();
            let resp = app.oneshot(req).await.unwrap();
            assert_eq!(resp.status(), StatusCode::OK);
            let bytes = to_bytes(resp.into_body(), 4 * 1024 * 1024).await.unwrap();
            let body: JsonValue = serde_json::from_slice(&bytes).unwrap();
            body["rankings"].as_array().unwrap().clone()
        }
    };

    let rankings = fetch("/api/leaderboard".to_string()).await;

    // Total points = course points + quiz points (150 + 70 = 220 for alice).
    let alice_entry = find(&rankings, alice.id);
    assert_eq!(alice_entry["metrics"]["coursePoints"], json!(150.0));
    assert_eq!(alice_entry["metrics"]["quizPoints"], json!(70.0));
    assert_eq!(alice_entry["metrics"]["totalPoints"], json!(220.0));
    assert_eq!(alice_entry["metrics"]["courseCount"], json!(2));

    let bob_entry = find(&rankings, bob.id);
    assert_eq!(bob_entry["metrics"]["totalPoints"], json!(50.0));
    assert_eq!(bob_entry["metrics"]["quizPoints"], json!(0.0));

    // Descending by total; bob and carol are tied at 50 and keep
    // registration order.
    assert!(position(&rankings, alice.id) < position(&rankings, bob.id));
    assert!(position(&rankings, bob.id) < position(&rankings, carol.id));

    // Ranks are 1-based positions.
    for (idx, entry) in rankings.iter().enumerate() {
        assert_eq!(entry["rank"], json!(idx as u64 + 1));
    }

    // Calling again with no intervening writes yields identical results for
    // our students (other suites may write unrelated data concurrently).
    let again = fetch("/api/leaderboard".to_string()).await;
    for user in [alice, bob, carol] {
        assert_eq!(find(&rankings, user.id)["metrics"], find(&again, user.id)["metrics"]);
    }
    assert!(position(&again, alice.id) < position(&again, bob.id));
    assert!(position(&again, bob.id) < position(&again, carol.id));

    // Scoping by course B excludes course A progress and attempts entirely.
    let scoped = fetch(format!("/api/leaderboard?courseUrl={}", course_b)).await;
    let alice_scoped = find(&scoped, alice.id);
    assert_eq!(alice_scoped["metrics"]["coursePoints"], json!(50.0));
    assert_eq!(alice_scoped["metrics"]["quizPoints"], json!(0.0));
    assert_eq!(alice_scoped["metrics"]["totalPoints"], json!(50.0));
    assert_eq!(alice_scoped["metrics"]["courseCount"], json!(1));
    let bob_scoped = find(&scoped, bob.id);
    assert_eq!(bob_scoped["metrics"]["totalPoints"], json!(0.0));

    // The scoped read clears the refresh flags for that course only.
    let scoped_a = fetch(format!("/api/leaderboard?courseUrl={}", course_a)).await;
    let alice_a = find(&scoped_a, alice.id);
    assert_eq!(alice_a["metrics"]["coursePoints"], json!(100.0));
    assert_eq!(alice_a["metrics"]["quizPoints"], json!(70.0));
    let pending: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM quiz_attempts WHERE course_url = $1 AND needs_leaderboard_update",
    )
    .bind(&course_a)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(pending, 0);
}
