use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, patch, post, put},
    Router,
};
use learnhub_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    middleware::{auth, cors, rate_limit},
    routes, AppState,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let app_state = AppState::new(pool);

    let base_routes = Router::new().route("/health", get(routes::health::health));

    let public_api = Router::new()
        .route("/api/auth/register", post(routes::auth::register))
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/courses", get(routes::course::list_courses))
        .route("/api/courses/:course_url", get(routes::course::get_course))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit::new_rps_state(config.public_rps),
            rate_limit::rps_middleware,
        ));

    let student_api = Router::new()
        .route("/api/auth/me", get(routes::auth::me))
        .route("/api/quizzes/submit", post(routes::quiz::submit_quiz))
        .route(
            "/api/quizzes/:course_url/days/:day_number",
            get(routes::quiz::get_quiz),
        )
        .route(
            "/api/quizzes/:course_url/days/:day_number/attempts",
            get(routes::quiz::my_attempts),
        )
        .route("/api/leaderboard", get(routes::leaderboard::get_leaderboard))
        .route("/api/enrollments", post(routes::enrollment::enroll))
        .route("/api/enrollments/my", get(routes::enrollment::my_courses))
        .route(
            "/api/enrollments/:course_url",
            delete(routes::enrollment::withdraw),
        )
        .route(
            "/api/enrollments/:course_url/days/:day_number/complete",
            post(routes::enrollment::complete_day),
        )
        .route("/api/messages", post(routes::message::send_message))
        .route("/api/messages/unread", get(routes::message::unread_count))
        .route(
            "/api/messages/:user_id",
            get(routes::message::get_conversation),
        )
        .route("/api/messages/:user_id/read", post(routes::message::mark_read))
        .route("/api/settings", get(routes::settings::get_settings))
        .layer(axum::middleware::from_fn(auth::require_bearer_auth))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit::new_rps_state(config.api_rps),
            rate_limit::rps_middleware,
        ));

    let staff_api = Router::new()
        .route("/api/admin/courses", post(routes::course::create_course))
        .route(
            "/api/admin/courses/:id",
            patch(routes::course::update_course).delete(routes::course::delete_course),
        )
        .route(
            "/api/admin/quizzes/:course_url/days/:day_number",
            put(routes::quiz::upsert_quiz),
        )
        .route(
            "/api/admin/dashboard/stats",
            get(routes::dashboard::get_stats),
        )
        .layer(axum::middleware::from_fn(auth::require_staff))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit::new_rps_state(config.api_rps),
            rate_limit::rps_middleware,
        ));

    let admin_api = Router::new()
        .route("/api/admin/settings", put(routes::settings::update_settings))
        .layer(axum::middleware::from_fn(auth::require_admin))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit::new_rps_state(config.api_rps),
            rate_limit::rps_middleware,
        ));

    let app = base_routes
        .merge(public_api)
        .merge(student_api)
        .merge(staff_api)
        .merge(admin_api)
        .with_state(app_state)
        .layer(cors::permissive_cors())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(2 * 1024 * 1024));

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
