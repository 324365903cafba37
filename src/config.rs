use serde::Deserialize;
use tracing::warn;

const DEV_JWT_SECRET: &str = "development-jwt-secret-change-in-production";
const DEV_SESSION_SECRET: &str = "development-session-secret-change-in-production";
const DEFAULT_ADMIN_EMAIL: &str = "admin@quizhub.local";
const DEFAULT_SESSION_TTL_DAYS: i64 = 7;
const MAX_SESSION_TTL_DAYS: i64 = 365;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub secret: String,
    pub ttl_days: i64,
    /// Sets the `Secure` attribute on the session cookie.
    pub secure_cookie: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub environment: String,
    pub admin_email: String,
    pub jwt: JwtConfig,
    pub session: SessionConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let environment = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());

        let jwt = JwtConfig {
            secret: secret_or_fallback("JWT_SECRET", DEV_JWT_SECRET),
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "quizhub".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "quizhub-users".into()),
        };
        let session = SessionConfig {
            secret: secret_or_fallback("SESSION_SECRET", DEV_SESSION_SECRET),
            ttl_days: session_ttl_days(std::env::var("SESSION_TTL_DAYS").ok().as_deref()),
            secure_cookie: environment == "production",
        };

        Ok(Self {
            database_url,
            max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(10),
            admin_email: std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| DEFAULT_ADMIN_EMAIL.into()),
            environment,
            jwt,
            session,
        })
    }
}

/// Session lifetime in days, kept within `1..=365`.
fn session_ttl_days(raw: Option<&str>) -> i64 {
    match raw.map(|v| v.trim().parse::<i64>()) {
        None => DEFAULT_SESSION_TTL_DAYS,
        Some(Ok(days)) if (1..=MAX_SESSION_TTL_DAYS).contains(&days) => days,
        Some(Ok(days)) => {
            let clamped = days.clamp(1, MAX_SESSION_TTL_DAYS);
            warn!(days, clamped, "SESSION_TTL_DAYS out of range");
            clamped
        }
        Some(Err(_)) => {
            warn!("SESSION_TTL_DAYS is not a number; using the default");
            DEFAULT_SESSION_TTL_DAYS
        }
    }
}

/// Falls back to a fixed development secret. Deployments must set the variable.
fn secret_or_fallback(var: &str, fallback: &str) -> String {
    match std::env::var(var) {
        Ok(v) if !v.is_empty() => v,
        _ => {
            warn!(var, "secret not set; using the development fallback");
            fallback.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_secret_uses_development_fallback() {
        let secret = secret_or_fallback("QUIZHUB_TEST_UNSET_SECRET", DEV_JWT_SECRET);
        assert_eq!(secret, DEV_JWT_SECRET);
    }

    #[test]
    fn session_ttl_is_bounded() {
        assert_eq!(session_ttl_days(None), 7);
        assert_eq!(session_ttl_days(Some("30")), 30);
        assert_eq!(session_ttl_days(Some("0")), 1);
        assert_eq!(session_ttl_days(Some("-5")), 1);
        assert_eq!(session_ttl_days(Some("9223372036854775807")), 365);
        assert_eq!(session_ttl_days(Some("soon")), 7);
    }
}
