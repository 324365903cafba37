use anyhow::Context;
use tracing::{info, warn};
use uuid::Uuid;

use super::{
    dto::{CreateQuizRequest, SubmitResultRequest, UpdateQuizRequest},
    repo,
    repo_types::{Quiz, QuizResult},
};
use crate::{
    error::{AppError, AppResult},
    state::AppState,
    users,
};

pub const DIFFICULTIES: [&str; 3] = ["easy", "medium", "hard"];
pub const MAX_XP_REWARD: i32 = 10_000;

pub(crate) fn parse_quiz_id(raw: &str) -> AppResult<i32> {
    raw.parse::<i32>()
        .map_err(|_| AppError::validation("Invalid quiz ID"))
}

/// Quizzes imported with `questions` as a JSON string are decoded;
/// anything unparseable becomes an empty list.
pub(crate) fn normalize_questions(mut quiz: Quiz) -> Quiz {
    if let serde_json::Value::String(raw) = &quiz.questions {
        quiz.questions = serde_json::from_str(raw).unwrap_or_else(|e| {
            warn!(quiz_id = quiz.id, error = %e, "questions column is not valid JSON");
            serde_json::Value::Array(Vec::new())
        });
    }
    quiz
}

fn check_difficulty(difficulty: &str) -> AppResult<()> {
    if DIFFICULTIES.contains(&difficulty) {
        Ok(())
    } else {
        Err(AppError::validation(
            "Difficulty must be one of easy, medium, hard",
        ))
    }
}

fn check_xp_reward(xp: i32) -> AppResult<()> {
    if !(0..=MAX_XP_REWARD).contains(&xp) {
        return Err(AppError::Validation(format!(
            "XP reward must be between 0 and {MAX_XP_REWARD}"
        )));
    }
    Ok(())
}

pub(crate) fn validate_new_quiz(req: &mut CreateQuizRequest) -> AppResult<()> {
    req.title = req.title.trim().to_string();
    if req.title.is_empty() {
        return Err(AppError::validation("Title is required"));
    }
    check_difficulty(&req.difficulty)?;
    check_xp_reward(req.xp_reward)?;
    if !req.questions.is_array() {
        return Err(AppError::validation("Questions must be a list"));
    }
    Ok(())
}

pub(crate) fn validate_quiz_update(req: &mut UpdateQuizRequest) -> AppResult<()> {
    if let Some(title) = &mut req.title {
        *title = title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::validation("Title cannot be empty"));
        }
    }
    if let Some(d) = &req.difficulty {
        check_difficulty(d)?;
    }
    if let Some(xp) = req.xp_reward {
        check_xp_reward(xp)?;
    }
    if req.questions.as_ref().is_some_and(|q| !q.is_array()) {
        return Err(AppError::validation("Questions must be a list"));
    }
    Ok(())
}

pub(crate) fn validate_result(req: &SubmitResultRequest) -> AppResult<()> {
    if req.total_questions <= 0 {
        return Err(AppError::validation("Total questions must be positive"));
    }
    if req.score < 0 || req.score > req.total_questions {
        return Err(AppError::validation(
            "Score must be between 0 and the number of questions",
        ));
    }
    if req.xp_earned < 0 {
        return Err(AppError::validation("XP earned cannot be negative"));
    }
    Ok(())
}

/// A result may not claim more xp than its quiz rewards.
pub(crate) fn check_xp_claim(req: &SubmitResultRequest, quiz: &Quiz) -> AppResult<()> {
    if req.xp_earned > quiz.xp_reward {
        return Err(AppError::Validation(format!(
            "XP earned cannot exceed the quiz reward of {}",
            quiz.xp_reward
        )));
    }
    Ok(())
}

/// Records a finished quiz and credits its xp exactly once. Both writes
/// commit together or not at all.
pub async fn submit_result(
    state: &AppState,
    user_id: Uuid,
    req: SubmitResultRequest,
) -> AppResult<QuizResult> {
    validate_result(&req)?;
    let quiz = repo::get(&state.db, req.quiz_id)
        .await?
        .ok_or(AppError::NotFound("Quiz"))?;
    check_xp_claim(&req, &quiz)?;

    let mut tx = state.db.begin().await.context("begin quiz result")?;
    let result = repo::insert_result(&mut *tx, user_id, &req).await?;
    if req.xp_earned > 0 {
        users::repo::award_xp(&mut *tx, user_id, req.xp_earned)
            .await?
            .ok_or(AppError::Unauthenticated)?;
    }
    tx.commit().await.context("commit quiz result")?;

    info!(user_id = %user_id, quiz_id = req.quiz_id, score = req.score, "quiz result saved");
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::OffsetDateTime;

    fn quiz_with(questions: serde_json::Value) -> Quiz {
        Quiz {
            id: 1,
            title: "Naruto".into(),
            description: None,
            category: None,
            difficulty: "easy".into(),
            xp_reward: 10,
            time_limit: None,
            image_url: None,
            questions,
            created_by: None,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    fn create_req() -> CreateQuizRequest {
        serde_json::from_value(json!({ "title": "  One Piece  " })).unwrap()
    }

    #[test]
    fn quiz_id_must_be_numeric() {
        assert_eq!(parse_quiz_id("42").unwrap(), 42);
        let err = parse_quiz_id("abc").unwrap_err();
        assert_eq!(err.to_string(), "Invalid quiz ID");
    }

    #[test]
    fn string_questions_are_decoded() {
        let q = normalize_questions(quiz_with(json!("[{\"q\":\"who?\"}]")));
        assert_eq!(q.questions, json!([{ "q": "who?" }]));

        let broken = normalize_questions(quiz_with(json!("{not json")));
        assert_eq!(broken.questions, json!([]));

        let untouched = normalize_questions(quiz_with(json!([1, 2])));
        assert_eq!(untouched.questions, json!([1, 2]));
    }

    #[test]
    fn new_quiz_defaults_and_validation() {
        let mut req = create_req();
        validate_new_quiz(&mut req).unwrap();
        assert_eq!(req.title, "One Piece");
        assert_eq!(req.difficulty, "medium");
        assert_eq!(req.questions, json!([]));

        let mut req = create_req();
        req.difficulty = "legendary".into();
        assert!(validate_new_quiz(&mut req).is_err());

        let mut req = create_req();
        req.title = " ".into();
        assert_eq!(
            validate_new_quiz(&mut req).unwrap_err().to_string(),
            "Title is required"
        );
    }

    #[test]
    fn quiz_update_validation() {
        let mut ok = UpdateQuizRequest {
            difficulty: Some("hard".into()),
            ..Default::default()
        };
        assert!(validate_quiz_update(&mut ok).is_ok());

        let mut bad = UpdateQuizRequest {
            xp_reward: Some(-1),
            ..Default::default()
        };
        assert!(validate_quiz_update(&mut bad).is_err());

        let mut bad = UpdateQuizRequest {
            questions: Some(json!({"not": "a list"})),
            ..Default::default()
        };
        assert!(validate_quiz_update(&mut bad).is_err());
    }

    #[test]
    fn xp_reward_is_bounded() {
        let mut req = create_req();
        req.xp_reward = MAX_XP_REWARD + 1;
        assert!(validate_new_quiz(&mut req).is_err());

        let mut update = UpdateQuizRequest {
            xp_reward: Some(i32::MAX),
            ..Default::default()
        };
        assert!(validate_quiz_update(&mut update).is_err());
    }

    #[test]
    fn xp_claims_cannot_exceed_quiz_reward() {
        let quiz = quiz_with(json!([]));
        let within = SubmitResultRequest {
            quiz_id: 1,
            score: 5,
            total_questions: 5,
            xp_earned: quiz.xp_reward,
        };
        assert!(check_xp_claim(&within, &quiz).is_ok());

        let greedy = SubmitResultRequest {
            xp_earned: 2_147_483_000,
            ..within
        };
        let err = check_xp_claim(&greedy, &quiz).unwrap_err();
        assert_eq!(err.to_string(), "XP earned cannot exceed the quiz reward of 10");
    }

    #[test]
    fn result_ranges() {
        let ok = SubmitResultRequest {
            quiz_id: 1,
            score: 7,
            total_questions: 10,
            xp_earned: 70,
        };
        assert!(validate_result(&ok).is_ok());

        let too_high = SubmitResultRequest { score: 11, ..ok };
        assert!(validate_result(&too_high).is_err());

        let no_questions = SubmitResultRequest {
            quiz_id: 1,
            score: 0,
            total_questions: 0,
            xp_earned: 0,
        };
        assert!(validate_result(&no_questions).is_err());

        let negative_xp = SubmitResultRequest {
            quiz_id: 1,
            score: 1,
            total_questions: 1,
            xp_earned: -5,
        };
        assert!(validate_result(&negative_xp).is_err());
    }
}
