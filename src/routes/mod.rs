pub mod auth;
pub mod course;
pub mod dashboard;
pub mod enrollment;
pub mod health;
pub mod leaderboard;
pub mod message;
pub mod quiz;
pub mod settings;
