//! Server-side sessions referenced by an opaque id in a signed cookie.

use anyhow::Context;
use async_trait::async_trait;
use axum::extract::FromRef;
use axum_extra::extract::cookie::{Cookie, Key, SameSite, SignedCookieJar};
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};
use sqlx::{FromRow, PgPool};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::{config::SessionConfig, state::AppState};

pub const SESSION_COOKIE: &str = "quizhub.sid";
const SESSION_ID_LEN: usize = 48;

/// Identity reference embedded in a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub email: String,
}

#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub id: String,
    pub user: SessionUser,
    pub expires_at: OffsetDateTime,
}

impl SessionRecord {
    pub fn is_live(&self, now: OffsetDateTime) -> bool {
        self.expires_at > now
    }
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create(&self, user: SessionUser, ttl: Duration) -> anyhow::Result<SessionRecord>;
    /// Returns `None` for unknown or expired ids.
    async fn load(&self, id: &str) -> anyhow::Result<Option<SessionRecord>>;
    async fn touch(&self, id: &str, expires_at: OffsetDateTime) -> anyhow::Result<()>;
    async fn destroy(&self, id: &str) -> anyhow::Result<()>;
    async fn purge_expired(&self) -> anyhow::Result<u64>;
}

pub fn new_session_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SESSION_ID_LEN)
        .map(char::from)
        .collect()
}

#[derive(Debug, FromRow)]
struct SessionRow {
    sid: String,
    user_id: Uuid,
    email: String,
    expires_at: OffsetDateTime,
}

impl From<SessionRow> for SessionRecord {
    fn from(r: SessionRow) -> Self {
        Self {
            id: r.sid,
            user: SessionUser {
                id: r.user_id,
                email: r.email,
            },
            expires_at: r.expires_at,
        }
    }
}

/// Sessions kept in the `sessions` table.
#[derive(Clone)]
pub struct PgSessionStore {
    db: PgPool,
}

impl PgSessionStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn create(&self, user: SessionUser, ttl: Duration) -> anyhow::Result<SessionRecord> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            INSERT INTO sessions (sid, user_id, email, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING sid, user_id, email, expires_at
            "#,
        )
        .bind(new_session_id())
        .bind(user.id)
        .bind(&user.email)
        .bind(OffsetDateTime::now_utc() + ttl)
        .fetch_one(&self.db)
        .await
        .context("insert session")?;
        Ok(row.into())
    }

    async fn load(&self, id: &str) -> anyhow::Result<Option<SessionRecord>> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT sid, user_id, email, expires_at
            FROM sessions
            WHERE sid = $1 AND expires_at > NOW()
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("load session")?;
        Ok(row.map(Into::into))
    }

    async fn touch(&self, id: &str, expires_at: OffsetDateTime) -> anyhow::Result<()> {
        sqlx::query("UPDATE sessions SET expires_at = $2 WHERE sid = $1")
            .bind(id)
            .bind(expires_at)
            .execute(&self.db)
            .await
            .context("touch session")?;
        Ok(())
    }

    async fn destroy(&self, id: &str) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM sessions WHERE sid = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .context("destroy session")?;
        Ok(())
    }

    async fn purge_expired(&self) -> anyhow::Result<u64> {
        let res = sqlx::query("DELETE FROM sessions WHERE expires_at <= NOW()")
            .execute(&self.db)
            .await
            .context("purge expired sessions")?;
        Ok(res.rows_affected())
    }
}

/// Derives a 64-byte cookie signing key from a secret of any length.
pub fn cookie_key(secret: &str) -> Key {
    let digest = Sha512::digest(secret.as_bytes());
    Key::from(digest.as_slice())
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

pub fn session_cookie(id: String, cfg: &SessionConfig) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, id))
        .path("/")
        .http_only(true)
        .secure(cfg.secure_cookie)
        .same_site(SameSite::Lax)
        .max_age(Duration::days(cfg.ttl_days))
        .build()
}

pub fn with_session(jar: SignedCookieJar, id: String, cfg: &SessionConfig) -> SignedCookieJar {
    jar.add(session_cookie(id, cfg))
}

pub fn without_session(jar: SignedCookieJar) -> SignedCookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}

#[cfg(test)]
pub mod memory {
    use std::{collections::HashMap, sync::Mutex};

    use super::*;

    /// In-process store for tests.
    #[derive(Default)]
    pub struct MemorySessionStore {
        sessions: Mutex<HashMap<String, SessionRecord>>,
    }

    impl MemorySessionStore {
        pub fn len(&self) -> usize {
            self.sessions.lock().unwrap().len()
        }

        pub fn records(&self) -> Vec<SessionRecord> {
            self.sessions.lock().unwrap().values().cloned().collect()
        }

        pub fn insert(&self, record: SessionRecord) {
            self.sessions
                .lock()
                .unwrap()
                .insert(record.id.clone(), record);
        }
    }

    #[async_trait]
    impl SessionStore for MemorySessionStore {
        async fn create(&self, user: SessionUser, ttl: Duration) -> anyhow::Result<SessionRecord> {
            let record = SessionRecord {
                id: new_session_id(),
                user,
                expires_at: OffsetDateTime::now_utc() + ttl,
            };
            self.insert(record.clone());
            Ok(record)
        }

        async fn load(&self, id: &str) -> anyhow::Result<Option<SessionRecord>> {
            let now = OffsetDateTime::now_utc();
            Ok(self
                .sessions
                .lock()
                .unwrap()
                .get(id)
                .filter(|s| s.is_live(now))
                .cloned())
        }

        async fn touch(&self, id: &str, expires_at: OffsetDateTime) -> anyhow::Result<()> {
            if let Some(s) = self.sessions.lock().unwrap().get_mut(id) {
                s.expires_at = expires_at;
            }
            Ok(())
        }

        async fn destroy(&self, id: &str) -> anyhow::Result<()> {
            self.sessions.lock().unwrap().remove(id);
            Ok(())
        }

        async fn purge_expired(&self) -> anyhow::Result<u64> {
            let now = OffsetDateTime::now_utc();
            let mut map = self.sessions.lock().unwrap();
            let before = map.len();
            map.retain(|_, s| s.is_live(now));
            Ok((before - map.len()) as u64)
        }
    }
}
