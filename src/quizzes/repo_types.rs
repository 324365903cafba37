use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub difficulty: String,
    pub xp_reward: i32,
    pub time_limit: Option<i32>, // seconds
    pub image_url: Option<String>,
    pub questions: serde_json::Value,
    pub created_by: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub id: i32,
    pub user_id: Uuid,
    pub quiz_id: i32,
    pub score: i32,
    pub total_questions: i32,
    pub xp_earned: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub completed_at: OffsetDateTime,
}

pub(crate) const QUIZ_COLUMNS: &str = "id, title, description, category, difficulty, xp_reward, \
     time_limit, image_url, questions, created_by, created_at";
