use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuizRequest {
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    #[serde(default = "default_difficulty")]
    pub difficulty: String,
    #[serde(default)]
    pub xp_reward: i32,
    pub time_limit: Option<i32>,
    pub image_url: Option<String>,
    #[serde(default = "empty_questions")]
    pub questions: serde_json::Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuizRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub difficulty: Option<String>,
    pub xp_reward: Option<i32>,
    pub time_limit: Option<i32>,
    pub image_url: Option<String>,
    pub questions: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResultRequest {
    pub quiz_id: i32,
    pub score: i32,
    pub total_questions: i32,
    #[serde(default)]
    pub xp_earned: i32,
}

fn default_difficulty() -> String {
    "medium".into()
}

fn empty_questions() -> serde_json::Value {
    serde_json::Value::Array(Vec::new())
}
