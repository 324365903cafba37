use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub id: Uuid,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: String, // email stands in for a username
    pub profile_image_url: Option<String>,
    pub xp: i32,
    pub level: i32,
    pub is_admin: bool,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_quizzes: i64,
    #[serde(rename = "totalXP")]
    pub total_xp: i32,
    pub rank: i64,
    pub level: i32,
}
