use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::domain::question::QuestionStageType;

/// The scored segments of a learner's run through a story.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttemptStageType {
    PreTest,
    Story,
    PostTest,
}

impl AttemptStageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttemptStageType::PreTest => "PRE_TEST",
            AttemptStageType::Story => "STORY",
            AttemptStageType::PostTest => "POST_TEST",
        }
    }

    /// Question stage a stage attempt is scored against. The story content's
    /// embedded quiz questions are labeled INTERACTIVE, not STORY.
    pub fn question_stage(&self) -> QuestionStageType {
        match self {
            AttemptStageType::PreTest => QuestionStageType::PreTest,
            AttemptStageType::Story => QuestionStageType::Interactive,
            AttemptStageType::PostTest => QuestionStageType::PostTest,
        }
    }
}

/// One learner's run through one story. Stage attempts and question logs are
/// embedded: deleting the attempt removes them with it, so no orphans can
/// exist.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct StoryAttempt {
    pub id: String,
    pub user_id: String,
    pub story_id: String,
    pub started_at: DateTime<Utc>,
    /// None while the run is still in progress.
    pub finished_at: Option<DateTime<Utc>>,
    pub total_time_seconds: i32,
    pub total_xp_gained: i32,
    pub pre_test_score: Option<f64>,
    pub post_test_score: Option<f64>,
    pub correct_interactive_cnt: i32,
    pub wrong_interactive_cnt: i32,
    pub essay_answer: Option<String>,
    #[serde(default)]
    pub stage_attempts: Vec<StageAttempt>,
    #[serde(default)]
    pub question_logs: Vec<QuestionAttemptLog>,
}

impl StoryAttempt {
    pub fn new(user_id: &str, story_id: &str) -> Self {
        StoryAttempt {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            story_id: story_id.to_string(),
            started_at: Utc::now(),
            finished_at: None,
            total_time_seconds: 0,
            total_xp_gained: 0,
            pre_test_score: None,
            post_test_score: None,
            correct_interactive_cnt: 0,
            wrong_interactive_cnt: 0,
            essay_answer: None,
            stage_attempts: Vec::new(),
            question_logs: Vec::new(),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished_at.is_some()
    }
}

/// One scored segment of an attempt. Created once per stage per attempt and
/// never updated afterwards.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct StageAttempt {
    pub id: String,
    pub attempt_id: String,
    pub stage_type: AttemptStageType,
    pub time_spent_seconds: i32,
    pub xp_gained: i32,
    pub score: Option<f64>,
}

impl StageAttempt {
    pub fn new(
        attempt_id: &str,
        stage_type: AttemptStageType,
        time_spent_seconds: i32,
        xp_gained: i32,
        score: Option<f64>,
    ) -> Self {
        StageAttempt {
            id: Uuid::new_v4().to_string(),
            attempt_id: attempt_id.to_string(),
            stage_type,
            time_spent_seconds,
            xp_gained,
            score,
        }
    }
}

/// One answer submission. Append-only; retries of the same question get their
/// own log entry with attempt_count tracking.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuestionAttemptLog {
    pub id: String,
    pub attempt_id: String,
    pub question_id: String,
    pub user_answer_text: Option<String>,
    /// Server-computed whenever the question type permits; None for answers
    /// that cannot be graded automatically (essays).
    pub is_correct: Option<bool>,
    pub attempt_count: i32,
    pub answered_at: DateTime<Utc>,
}

impl QuestionAttemptLog {
    pub fn new(
        attempt_id: &str,
        question_id: &str,
        user_answer_text: Option<String>,
        is_correct: Option<bool>,
        attempt_count: i32,
    ) -> Self {
        QuestionAttemptLog {
            id: Uuid::new_v4().to_string(),
            attempt_id: attempt_id.to_string(),
            question_id: question_id.to_string(),
            user_answer_text,
            is_correct,
            attempt_count,
            answered_at: Utc::now(),
        }
    }
}
