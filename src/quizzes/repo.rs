use anyhow::Context;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use super::{
    dto::{CreateQuizRequest, SubmitResultRequest, UpdateQuizRequest},
    repo_types::{Quiz, QuizResult, QUIZ_COLUMNS},
};

pub async fn list(db: &PgPool) -> anyhow::Result<Vec<Quiz>> {
    let sql = format!("SELECT {QUIZ_COLUMNS} FROM quizzes ORDER BY created_at DESC");
    let rows = sqlx::query_as::<_, Quiz>(&sql)
        .fetch_all(db)
        .await
        .context("list quizzes")?;
    Ok(rows)
}

pub async fn get(db: &PgPool, id: i32) -> anyhow::Result<Option<Quiz>> {
    let sql = format!("SELECT {QUIZ_COLUMNS} FROM quizzes WHERE id = $1");
    let quiz = sqlx::query_as::<_, Quiz>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await
        .context("get quiz")?;
    Ok(quiz)
}

/// The hardest quiz with the biggest reward.
pub async fn featured(db: &PgPool) -> anyhow::Result<Option<Quiz>> {
    let sql = format!(
        r#"
        SELECT {QUIZ_COLUMNS}
          FROM quizzes
         WHERE difficulty = 'hard'
         ORDER BY xp_reward DESC
         LIMIT 1
        "#
    );
    let quiz = sqlx::query_as::<_, Quiz>(&sql)
        .fetch_optional(db)
        .await
        .context("featured quiz")?;
    Ok(quiz)
}

pub async fn create(
    db: &PgPool,
    created_by: Uuid,
    quiz: &CreateQuizRequest,
) -> anyhow::Result<Quiz> {
    let sql = format!(
        r#"
        INSERT INTO quizzes (title, description, category, difficulty, xp_reward,
                             time_limit, image_url, questions, created_by)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING {QUIZ_COLUMNS}
        "#
    );
    let created = sqlx::query_as::<_, Quiz>(&sql)
        .bind(&quiz.title)
        .bind(&quiz.description)
        .bind(&quiz.category)
        .bind(&quiz.difficulty)
        .bind(quiz.xp_reward)
        .bind(quiz.time_limit)
        .bind(&quiz.image_url)
        .bind(&quiz.questions)
        .bind(created_by)
        .fetch_one(db)
        .await
        .context("insert quiz")?;
    Ok(created)
}

pub async fn update(
    db: &PgPool,
    id: i32,
    quiz: &UpdateQuizRequest,
) -> anyhow::Result<Option<Quiz>> {
    let sql = format!(
        r#"
        UPDATE quizzes
           SET title = COALESCE($2, title),
               description = COALESCE($3, description),
               category = COALESCE($4, category),
               difficulty = COALESCE($5, difficulty),
               xp_reward = COALESCE($6, xp_reward),
               time_limit = COALESCE($7, time_limit),
               image_url = COALESCE($8, image_url),
               questions = COALESCE($9, questions)
         WHERE id = $1
        RETURNING {QUIZ_COLUMNS}
        "#
    );
    let updated = sqlx::query_as::<_, Quiz>(&sql)
        .bind(id)
        .bind(&quiz.title)
        .bind(&quiz.description)
        .bind(&quiz.category)
        .bind(&quiz.difficulty)
        .bind(quiz.xp_reward)
        .bind(quiz.time_limit)
        .bind(&quiz.image_url)
        .bind(&quiz.questions)
        .fetch_optional(db)
        .await
        .context("update quiz")?;
    Ok(updated)
}

pub async fn delete(db: &PgPool, id: i32) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM quizzes WHERE id = $1")
        .bind(id)
        .execute(db)
        .await
        .context("delete quiz")?;
    Ok(res.rows_affected() > 0)
}

pub async fn insert_result(
    db: impl PgExecutor<'_>,
    user_id: Uuid,
    result: &SubmitResultRequest,
) -> anyhow::Result<QuizResult> {
    let row = sqlx::query_as::<_, QuizResult>(
        r#"
        INSERT INTO quiz_results (user_id, quiz_id, score, total_questions, xp_earned)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, user_id, quiz_id, score, total_questions, xp_earned, completed_at
        "#,
    )
    .bind(user_id)
    .bind(result.quiz_id)
    .bind(result.score)
    .bind(result.total_questions)
    .bind(result.xp_earned)
    .fetch_one(db)
    .await
    .context("insert quiz result")?;
    Ok(row)
}

/// Removes results whose quiz no longer exists.
pub async fn delete_orphaned_results(db: &PgPool) -> anyhow::Result<u64> {
    let res = sqlx::query(
        "DELETE FROM quiz_results WHERE quiz_id NOT IN (SELECT id FROM quizzes)",
    )
    .execute(db)
    .await
    .context("delete orphaned quiz results")?;
    Ok(res.rows_affected())
}
