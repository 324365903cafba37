use std::time::Duration;

mod admin;
mod app;
mod auth;
mod chat;
mod config;
mod error;
mod posts;
mod quizzes;
mod state;
mod users;

use crate::auth::session::SessionStore;

const SESSION_PRUNE_EVERY: Duration = Duration::from_secs(15 * 60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "quizhub=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let app_state = state::AppState::init().await?;

    sqlx::migrate!("./migrations").run(&app_state.db).await?;

    match users::repo::ensure_admin_user(&app_state.db, &app_state.config.admin_email).await {
        Ok(true) => tracing::info!(email = %app_state.config.admin_email, "promoted admin user"),
        Ok(false) => {}
        Err(e) => tracing::warn!(error = %e, "admin bootstrap failed; continuing"),
    }

    tokio::spawn(prune_sessions(app_state.sessions.clone()));

    app::serve(app::build_app(app_state)).await
}

async fn prune_sessions(sessions: std::sync::Arc<dyn SessionStore>) {
    let mut ticker = tokio::time::interval(SESSION_PRUNE_EVERY);
    loop {
        ticker.tick().await;
        match sessions.purge_expired().await {
            Ok(0) => {}
            Ok(n) => tracing::info!(removed = n, "expired sessions pruned"),
            Err(e) => tracing::warn!(error = %e, "session pruning failed"),
        }
    }
}
