use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stage a question belongs to. Note the divergence from AttemptStageType:
/// questions embedded in the story content are INTERACTIVE, while the
/// attempt-level stage is called STORY.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionStageType {
    PreTest,
    PostTest,
    Interactive,
}

impl QuestionStageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionStageType::PreTest => "PRE_TEST",
            QuestionStageType::PostTest => "POST_TEST",
            QuestionStageType::Interactive => "INTERACTIVE",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionType {
    Mcq,
    TrueFalse,
    DragDrop,
    Essay,
}

/// Extra per-type payload. A tagged variant rather than an open map, so a
/// DRAG_DROP question either carries a well-formed ordering or none at all.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionMetadata {
    DragDrop {
        items: Vec<DragDropItem>,
        correct_order: Vec<String>,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct DragDropItem {
    pub id: String,
    pub label: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Question {
    pub id: String,
    pub story_id: String,
    pub stage_type: QuestionStageType,
    pub question_type: QuestionType,
    pub question_text: String,
    pub xp_value: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<QuestionMetadata>,
    #[serde(default)]
    pub answer_options: Vec<AnswerOption>,
}

impl Question {
    pub fn new(
        story_id: &str,
        stage_type: QuestionStageType,
        question_type: QuestionType,
        question_text: &str,
        xp_value: i32,
    ) -> Self {
        Question {
            id: Uuid::new_v4().to_string(),
            story_id: story_id.to_string(),
            stage_type,
            question_type,
            question_text: question_text.to_string(),
            xp_value,
            metadata: None,
            answer_options: Vec::new(),
        }
    }

    /// Ordering a DRAG_DROP submission is checked against, when configured.
    pub fn correct_order(&self) -> Option<&[String]> {
        match &self.metadata {
            Some(QuestionMetadata::DragDrop { correct_order, .. }) => Some(correct_order),
            None => None,
        }
    }
}

/// Selectable answer for MCQ / TRUE_FALSE questions. Embedded in its owning
/// question but addressable by id; question_id must match the target question
/// when a submission references it.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct AnswerOption {
    pub id: String,
    pub question_id: String,
    pub option_text: String,
    pub is_correct: bool,
}

impl AnswerOption {
    pub fn new(question_id: &str, option_text: &str, is_correct: bool) -> Self {
        AnswerOption {
            id: Uuid::new_v4().to_string(),
            question_id: question_id.to_string(),
            option_text: option_text.to_string(),
            is_correct,
        }
    }
}
