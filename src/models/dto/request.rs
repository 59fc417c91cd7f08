use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::Validate;

use crate::models::domain::story_attempt::AttemptStageType;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAttemptRequest {
    #[validate(length(min = 1))]
    pub story_id: String,
}

/// Partial update of a story attempt; any subset of fields may be present.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateAttemptRequest {
    pub finished_at: Option<DateTime<Utc>>,

    #[validate(range(min = 0))]
    pub total_time_seconds: Option<i32>,

    #[validate(range(min = 0))]
    pub total_xp_gained: Option<i32>,

    #[validate(range(min = 0.0, max = 100.0))]
    pub pre_test_score: Option<f64>,

    #[validate(range(min = 0.0, max = 100.0))]
    pub post_test_score: Option<f64>,

    #[validate(range(min = 0))]
    pub correct_interactive_cnt: Option<i32>,

    #[validate(range(min = 0))]
    pub wrong_interactive_cnt: Option<i32>,

    pub essay_answer: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateStageAttemptRequest {
    pub stage_type: AttemptStageType,

    #[validate(range(min = 0))]
    pub time_spent_seconds: Option<i32>,

    #[validate(range(min = 0))]
    pub xp_gained: Option<i32>,

    /// Explicit score; when absent the server computes it from the
    /// attempt's question logs.
    #[validate(range(min = 0.0, max = 100.0))]
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateQuestionLogRequest {
    #[validate(length(min = 1))]
    pub question_id: String,

    pub selected_option_id: Option<String>,

    pub user_answer_text: Option<String>,

    /// Accepted on the wire for compatibility but never trusted; correctness
    /// is recomputed server-side whenever it is derivable.
    pub is_correct: Option<bool>,

    #[validate(range(min = 1))]
    pub attempt_count: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpsertProgressRequest {
    #[validate(length(min = 1))]
    pub island_id: String,
    pub is_unlocked: Option<bool>,
    pub is_completed: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProgressRequest {
    pub is_unlocked: Option<bool>,
    pub is_completed: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PaginationParams {
    #[validate(range(min = 0))]
    pub offset: Option<i64>,

    #[validate(range(min = 1, max = 100))]
    pub limit: Option<i64>,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            offset: Some(0),
            limit: Some(20),
        }
    }
}

impl PaginationParams {
    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(20).min(100)
    }
}

// Query structs keep offset/limit inline: serde_urlencoded, which backs
// actix's Query extractor, cannot deserialize flattened numeric fields.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AttemptListQuery {
    #[validate(range(min = 0))]
    pub offset: Option<i64>,

    #[validate(range(min = 1, max = 100))]
    pub limit: Option<i64>,

    pub story_id: Option<String>,
    pub island_id: Option<String>,
    pub is_finished: Option<bool>,
}

impl AttemptListQuery {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams {
            offset: self.offset,
            limit: self.limit,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProgressListQuery {
    #[validate(range(min = 0))]
    pub offset: Option<i64>,

    #[validate(range(min = 1, max = 100))]
    pub limit: Option<i64>,

    pub is_unlocked: Option<bool>,
    pub is_completed: Option<bool>,
}

impl ProgressListQuery {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams {
            offset: self.offset,
            limit: self.limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_attempt_rejects_out_of_range_score() {
        let request = UpdateAttemptRequest {
            pre_test_score: Some(120.0),
            ..Default::default()
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_update_attempt_accepts_partial_fields() {
        let request = UpdateAttemptRequest {
            total_xp_gained: Some(50),
            essay_answer: Some("The fox was kind.".to_string()),
            ..Default::default()
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_stage_request_deserializes_wire_stage_type() {
        let request: CreateStageAttemptRequest =
            serde_json::from_str(r#"{"stage_type":"POST_TEST","xp_gained":10}"#)
                .expect("request should deserialize");

        assert_eq!(request.stage_type, AttemptStageType::PostTest);
        assert_eq!(request.xp_gained, Some(10));
        assert_eq!(request.score, None);
    }

    #[test]
    fn test_question_log_requires_question_id() {
        let request = CreateQuestionLogRequest {
            question_id: "".to_string(),
            selected_option_id: None,
            user_answer_text: None,
            is_correct: None,
            attempt_count: None,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_pagination_limit_is_capped() {
        let params = PaginationParams {
            offset: Some(0),
            limit: Some(500),
        };
        assert_eq!(params.limit(), 100);
    }
}
