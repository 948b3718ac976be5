use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardQuery {
    pub course_url: Option<String>,
}

/// Read-time projection; recomputed on every call, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub user_id: Uuid,
    pub name: String,
    pub avatar_url: Option<String>,
    pub rank: u32,
    pub metrics: LeaderboardMetrics,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardMetrics {
    pub course_count: i64,
    pub course_points: f64,
    pub quiz_points: f64,
    pub total_points: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardResponse {
    pub rankings: Vec<LeaderboardEntry>,
}
