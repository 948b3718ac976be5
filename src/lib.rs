pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::services::{
    course_service::CourseService, dashboard_service::DashboardService,
    enrollment_service::EnrollmentService, leaderboard_service::LeaderboardService,
    message_service::MessageService, quiz_service::QuizService,
    settings_service::SettingsService, user_service::UserService,
};
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub user_service: UserService,
    pub course_service: CourseService,
    pub quiz_service: QuizService,
    pub enrollment_service: EnrollmentService,
    pub leaderboard_service: LeaderboardService,
    pub message_service: MessageService,
    pub dashboard_service: DashboardService,
    pub settings_service: SettingsService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let user_service = UserService::new(pool.clone());
        let course_service = CourseService::new(pool.clone());
        let quiz_service = QuizService::new(pool.clone());
        let enrollment_service = EnrollmentService::new(pool.clone());
        let leaderboard_service = LeaderboardService::new(pool.clone());
        let message_service = MessageService::new(pool.clone());
        let dashboard_service = DashboardService::new(pool.clone());
        let settings_service = SettingsService::postgres(pool.clone());

        Self {
            pool,
            user_service,
            course_service,
            quiz_service,
            enrollment_service,
            leaderboard_service,
            message_service,
            dashboard_service,
            settings_service,
        }
    }
}
