use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub profile_image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
}

impl LeaderboardQuery {
    pub fn clamped_limit(&self) -> i64 {
        self.limit.clamp(1, 100)
    }
}

fn default_limit() -> i64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaderboard_limit_defaults_and_clamps() {
        let q: LeaderboardQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(q.clamped_limit(), 10);
        assert_eq!(LeaderboardQuery { limit: 0 }.clamped_limit(), 1);
        assert_eq!(LeaderboardQuery { limit: 5000 }.clamped_limit(), 100);
    }
}
