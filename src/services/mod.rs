pub mod course_service;
pub mod dashboard_service;
pub mod enrollment_service;
pub mod leaderboard_service;
pub mod message_service;
pub mod quiz_service;
pub mod scoring;
pub mod settings_service;
pub mod user_service;
