use serde::{Deserialize, Serialize};

const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 100;
const MAX_PAGE: i64 = 100_000;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PageQuery {
    pub page: i64,
    pub limit: i64,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageQuery {
    /// `(limit, offset)` with both clamped to sane values.
    pub fn bounds(&self) -> (i64, i64) {
        let limit = self.limit.clamp(1, MAX_PAGE_SIZE);
        let page = self.page.clamp(1, MAX_PAGE);
        (limit, (page - 1).saturating_mul(limit))
    }
}

#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub total_users: i64,
    pub total_quizzes: i64,
    pub total_messages: i64,
    pub total_posts: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupReport {
    pub expired_sessions: u64,
    pub orphaned_results: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_defaults_and_clamping() {
        let q: PageQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(q.bounds(), (50, 0));

        let q = PageQuery { page: 3, limit: 20 };
        assert_eq!(q.bounds(), (20, 40));

        let q = PageQuery { page: 0, limit: 1000 };
        assert_eq!(q.bounds(), (100, 0));

        let q = PageQuery { page: -2, limit: 0 };
        assert_eq!(q.bounds(), (1, 0));
    }

    #[test]
    fn huge_page_numbers_do_not_overflow() {
        let q = PageQuery {
            page: i64::MAX,
            limit: 50,
        };
        let (limit, offset) = q.bounds();
        assert_eq!(limit, 50);
        assert_eq!(offset, (MAX_PAGE - 1) * 50);

        let q = PageQuery {
            page: i64::MAX,
            limit: i64::MAX,
        };
        assert!(q.bounds().1 >= 0);
    }
}
