use std::net::SocketAddr;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use time::OffsetDateTime;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use crate::{admin, auth, chat, posts, quizzes, users};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .nest(
            "/api",
            Router::new()
                .merge(auth::router())
                .merge(users::router())
                .merge(quizzes::router())
                .merge(chat::router())
                .merge(posts::router())
                .merge(admin::router())
                .route("/health", get(health)),
        )
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| request_span(req))
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
}

/// `status` is filled in once the response is known.
fn request_span<B>(req: &axum::http::Request<B>) -> tracing::Span {
    let method = req.method().clone();
    let uri = req.uri().clone();
    tracing::info_span!(
        "http_request",
        %method,
        uri = %uri,
        status = tracing::field::Empty
    )
}

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub uptime: u64,
    pub environment: String,
}

async fn health(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        status: "healthy",
        timestamp: OffsetDateTime::now_utc(),
        uptime: state.started_at.elapsed().as_secs(),
        environment: state.config.environment.clone(),
    })
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "8080".into())
    )
    .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{repo::memory::MemoryUserDirectory, session::memory::MemorySessionStore};
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;
    use uuid::Uuid;

    struct Harness {
        app: Router,
        users: Arc<MemoryUserDirectory>,
        sessions: Arc<MemorySessionStore>,
    }

    fn harness() -> Harness {
        let users = Arc::new(MemoryUserDirectory::default());
        let sessions = Arc::new(MemorySessionStore::default());
        let state = AppState::fake_with(users.clone(), sessions.clone());
        Harness {
            app: build_app(state),
            users,
            sessions,
        }
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_with(uri: &str, name: header::HeaderName, value: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(name, value)
            .body(Body::empty())
            .unwrap()
    }

    async fn body_json(res: Response) -> Value {
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn session_cookie(res: &Response) -> String {
        let raw = res
            .headers()
            .get(header::SET_COOKIE)
            .expect("session cookie set")
            .to_str()
            .unwrap();
        raw.split(';').next().unwrap().to_string()
    }

    struct Registered {
        id: Uuid,
        token: String,
        cookie: String,
    }

    async fn register(app: &Router, email: &str) -> Registered {
        let res = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/auth/register",
                json!({
                    "email": email,
                    "password": "hunter22",
                    "firstName": "Monkey",
                    "lastName": "Luffy"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let cookie = session_cookie(&res);
        let body = body_json(res).await;
        Registered {
            id: body["user"]["id"].as_str().unwrap().parse().unwrap(),
            token: body["token"].as_str().unwrap().to_string(),
            cookie,
        }
    }

    #[test]
    fn request_span_has_a_status_slot() {
        let subscriber = tracing_subscriber::fmt().with_test_writer().finish();
        tracing::subscriber::with_default(subscriber, || {
            let req = Request::get("/api/health").body(()).unwrap();
            let span = request_span(&req);
            assert!(span.field("status").is_some());
        });
    }

    #[tokio::test]
    async fn health_reports_environment() {
        let h = harness();
        let res = h
            .app
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = body_json(res).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["environment"], "test");
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn register_then_fetch_user_with_bearer_and_cookie() {
        let h = harness();
        let reg = register(&h.app, "luffy@example.com").await;
        assert_eq!(h.sessions.len(), 1);

        let bearer = format!("Bearer {}", reg.token);
        let res = h
            .app
            .clone()
            .oneshot(get_with("/api/auth/user", header::AUTHORIZATION, &bearer))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = body_json(res).await;
        assert_eq!(body["email"], "luffy@example.com");
        assert_eq!(body["firstName"], "Monkey");
        assert!(body.get("passwordHash").is_none());

        let res = h
            .app
            .oneshot(get_with("/api/auth/user", header::COOKIE, &reg.cookie))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    fn only_session(sessions: &MemorySessionStore) -> crate::auth::session::SessionRecord {
        let mut records = sessions.records();
        assert_eq!(records.len(), 1);
        records.remove(0)
    }

    /// Moves the only stored session to expire in one minute.
    async fn nearly_expire(sessions: &MemorySessionStore) -> (String, OffsetDateTime) {
        use crate::auth::session::SessionStore;

        let record = only_session(sessions);
        let soon = OffsetDateTime::now_utc() + time::Duration::minutes(1);
        sessions.touch(&record.id, soon).await.unwrap();
        (record.id, soon)
    }

    #[tokio::test]
    async fn cookie_requests_slide_the_session_expiry() {
        let h = harness();
        let reg = register(&h.app, "brook@example.com").await;
        let (_, soon) = nearly_expire(&h.sessions).await;

        let res = h
            .app
            .oneshot(get_with("/api/auth/user", header::COOKIE, &reg.cookie))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let record = only_session(&h.sessions);
        assert!(record.expires_at > soon);
        assert!(record.expires_at > OffsetDateTime::now_utc() + time::Duration::days(6));
    }

    #[tokio::test]
    async fn bearer_requests_leave_the_session_alone() {
        let h = harness();
        let reg = register(&h.app, "jinbe@example.com").await;
        let (_, soon) = nearly_expire(&h.sessions).await;

        let bearer = format!("Bearer {}", reg.token);
        let res = h
            .app
            .oneshot(get_with("/api/auth/user", header::AUTHORIZATION, &bearer))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let record = only_session(&h.sessions);
        assert_eq!(record.expires_at, soon);
    }

    #[tokio::test]
    async fn logout_ends_session_but_token_survives() {
        let h = harness();
        let reg = register(&h.app, "zoro@example.com").await;

        let logout = Request::post("/api/auth/logout")
            .header(header::COOKIE, &reg.cookie)
            .body(Body::empty())
            .unwrap();
        let res = h.app.clone().oneshot(logout).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_json(res).await["message"], "Logged out");
        assert_eq!(h.sessions.len(), 0);

        let res = h
            .app
            .clone()
            .oneshot(get_with("/api/auth/user", header::COOKIE, &reg.cookie))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let bearer = format!("Bearer {}", reg.token);
        let res = h
            .app
            .oneshot(get_with("/api/auth/user", header::AUTHORIZATION, &bearer))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn duplicate_registration_is_rejected() {
        let h = harness();
        register(&h.app, "nami@example.com").await;

        let res = h
            .app
            .oneshot(json_request(
                "POST",
                "/api/auth/register",
                json!({
                    "email": "nami@example.com",
                    "password": "another1",
                    "firstName": "Nami",
                    "lastName": "Cat"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(res).await["message"],
            "An account with this email already exists"
        );
        assert_eq!(h.users.len(), 1);
    }

    #[tokio::test]
    async fn login_failures_are_indistinguishable() {
        let h = harness();
        register(&h.app, "usopp@example.com").await;

        let wrong_password = h
            .app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/auth/login",
                json!({ "email": "usopp@example.com", "password": "nope-nope" }),
            ))
            .await
            .unwrap();
        let unknown_email = h
            .app
            .oneshot(json_request(
                "POST",
                "/api/auth/login",
                json!({ "email": "ghost@example.com", "password": "nope-nope" }),
            ))
            .await
            .unwrap();

        assert_eq!(wrong_password.status(), StatusCode::BAD_REQUEST);
        assert_eq!(unknown_email.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(wrong_password).await, body_json(unknown_email).await);
    }

    #[tokio::test]
    async fn missing_credentials_are_unauthorized() {
        let res = build_app(AppState::fake())
            .oneshot(Request::get("/api/auth/user").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(res).await["message"], "Unauthorized");
    }

    #[tokio::test]
    async fn deleted_account_token_is_unauthorized() {
        let h = harness();
        let reg = register(&h.app, "robin@example.com").await;
        h.users.remove(reg.id);

        let bearer = format!("Bearer {}", reg.token);
        let res = h
            .app
            .clone()
            .oneshot(get_with("/api/auth/user", header::AUTHORIZATION, &bearer))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let res = h
            .app
            .oneshot(get_with("/api/auth/user", header::COOKIE, &reg.cookie))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn admin_routes_require_admin_flag() {
        let h = harness();
        let reg = register(&h.app, "chopper@example.com").await;
        let bearer = format!("Bearer {}", reg.token);

        let res = h
            .app
            .clone()
            .oneshot(get_with("/api/admin/stats", header::AUTHORIZATION, &bearer))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_json(res).await["message"], "Admin access required");

        let res = h
            .app
            .oneshot(Request::get("/api/admin/stats").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn admin_cannot_delete_themself() {
        let h = harness();
        let reg = register(&h.app, "franky@example.com").await;
        h.users.set_admin(reg.id, true);

        let req = Request::delete(format!("/api/admin/users/{}", reg.id))
            .header(header::AUTHORIZATION, format!("Bearer {}", reg.token))
            .body(Body::empty())
            .unwrap();
        let res = h.app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(res).await["message"],
            "You cannot delete your own account"
        );
    }

    #[tokio::test]
    async fn malformed_json_is_a_validation_error() {
        let h = harness();
        let req = Request::post("/api/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let res = h.app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(res).await["message"].is_string());
    }
}
