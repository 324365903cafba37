use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// The single shared room every message goes to.
pub const DEFAULT_ROOM_ID: i32 = 1;

const FALLBACK_USERNAME: &str = "Utilisateur";

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: i32,
    pub room_id: i32,
    pub user_id: Option<Uuid>,
    pub message: String,
    pub message_type: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, FromRow)]
pub struct ChatMessageRow {
    pub id: i32,
    pub content: String,
    pub user_id: Option<Uuid>,
    pub user_first_name: Option<String>,
    pub user_last_name: Option<String>,
    pub user_profile_image_url: Option<String>,
    pub is_admin: Option<bool>,
    pub created_at: OffsetDateTime,
}

/// Message with its author, as shown in the room.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageView {
    pub id: i32,
    pub content: String,
    pub user_id: Option<Uuid>,
    pub user_first_name: Option<String>,
    pub user_last_name: Option<String>,
    pub user_profile_image_url: Option<String>,
    pub is_admin: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub username: String,
}

impl From<ChatMessageRow> for ChatMessageView {
    fn from(r: ChatMessageRow) -> Self {
        let username = r
            .user_first_name
            .clone()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| FALLBACK_USERNAME.to_string());
        Self {
            id: r.id,
            content: r.content,
            user_id: r.user_id,
            user_first_name: r.user_first_name,
            user_last_name: r.user_last_name,
            user_profile_image_url: r.user_profile_image_url,
            is_admin: r.is_admin.unwrap_or(false),
            created_at: r.created_at,
            timestamp: r.created_at,
            username,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(first_name: Option<&str>) -> ChatMessageRow {
        ChatMessageRow {
            id: 1,
            content: "hello".into(),
            user_id: None,
            user_first_name: first_name.map(Into::into),
            user_last_name: None,
            user_profile_image_url: None,
            is_admin: None,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn username_falls_back_for_deleted_or_unnamed_authors() {
        assert_eq!(ChatMessageView::from(row(None)).username, FALLBACK_USERNAME);
        assert_eq!(ChatMessageView::from(row(Some(""))).username, FALLBACK_USERNAME);
        assert_eq!(ChatMessageView::from(row(Some("Luffy"))).username, "Luffy");
    }

    #[test]
    fn view_serializes_camel_case_with_timestamp() {
        let json = serde_json::to_value(ChatMessageView::from(row(Some("Zoro")))).unwrap();
        assert_eq!(json["userFirstName"], "Zoro");
        assert_eq!(json["isAdmin"], false);
        assert_eq!(json["timestamp"], json["createdAt"]);
    }
}
