use serde_json::Value;

use crate::{
    errors::{AppError, AppResult},
    models::domain::question::{AnswerOption, Question, QuestionType},
};

/// Outcome of validating one submission. `is_correct` is None when the
/// question type has no decidable answer (essays).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerVerdict {
    pub is_correct: Option<bool>,
    pub answer_text: Option<String>,
}

/// Server-side answer validation. Correctness is always derived from stored
/// content; whatever correctness flag the client sent is never consulted.
pub struct AnswerService;

impl AnswerService {
    /// Validate a submission against its question. `selected_option` is the
    /// resolved option when the submission referenced one by id; the caller
    /// is responsible for the lookup (and for rejecting unknown option ids
    /// as NotFound before getting here).
    pub fn validate(
        question: &Question,
        selected_option: Option<&AnswerOption>,
        user_answer_text: Option<&str>,
    ) -> AppResult<AnswerVerdict> {
        if let Some(option) = selected_option {
            // An option from another question is a spoofing attempt, not a
            // wrong answer. Reject it outright.
            if option.question_id != question.id {
                return Err(AppError::InvalidInput(format!(
                    "Answer option '{}' does not belong to question '{}'",
                    option.id, question.id
                )));
            }

            let answer_text = user_answer_text
                .map(str::to_string)
                .unwrap_or_else(|| option.option_text.clone());

            return Ok(AnswerVerdict {
                is_correct: Some(option.is_correct),
                answer_text: Some(answer_text),
            });
        }

        if question.question_type == QuestionType::DragDrop {
            if let Some(text) = user_answer_text {
                return Self::validate_drag_drop(question, text);
            }
        }

        // No decidable answer for essays; everything else without a usable
        // submission defaults to incorrect.
        let is_correct = if question.question_type == QuestionType::Essay {
            None
        } else {
            Some(false)
        };

        Ok(AnswerVerdict {
            is_correct,
            answer_text: user_answer_text.map(str::to_string),
        })
    }

    /// A DRAG_DROP answer is a JSON array of item ids, correct only when it
    /// matches the configured order at every position. Set equality is not
    /// enough.
    fn validate_drag_drop(question: &Question, text: &str) -> AppResult<AnswerVerdict> {
        let correct_order = question.correct_order().ok_or_else(|| {
            AppError::NotConfigured(format!(
                "Question '{}' is DRAG_DROP but has no correct_order metadata",
                question.id
            ))
        })?;

        let parsed: Value = serde_json::from_str(text).map_err(|_| {
            AppError::InvalidInput("Invalid JSON format for DRAG_DROP answer".to_string())
        })?;

        let submitted = match parsed {
            Value::Array(items) => items,
            _ => {
                return Err(AppError::InvalidInput(
                    "DRAG_DROP answer must be a JSON array of item ids".to_string(),
                ))
            }
        };

        let is_correct = submitted.len() == correct_order.len()
            && submitted
                .iter()
                .zip(correct_order.iter())
                .all(|(submitted_id, expected_id)| submitted_id.as_str() == Some(expected_id));

        Ok(AnswerVerdict {
            is_correct: Some(is_correct),
            answer_text: Some(text.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fixtures;
    use crate::models::domain::question::QuestionStageType;

    fn mcq_question() -> (Question, AnswerOption, AnswerOption) {
        fixtures::mcq_question("story-1", QuestionStageType::PreTest)
    }

    fn drag_drop_question(correct_order: &[&str]) -> Question {
        fixtures::drag_drop_question("story-1", correct_order)
    }

    #[test]
    fn correctness_comes_from_the_stored_option() {
        let (question, right, wrong) = mcq_question();

        let verdict = AnswerService::validate(&question, Some(&right), None).unwrap();
        assert_eq!(verdict.is_correct, Some(true));

        let verdict = AnswerService::validate(&question, Some(&wrong), None).unwrap();
        assert_eq!(verdict.is_correct, Some(false));
    }

    #[test]
    fn answer_text_is_backfilled_from_the_option() {
        let (question, right, _) = mcq_question();

        let verdict = AnswerService::validate(&question, Some(&right), None).unwrap();
        assert_eq!(verdict.answer_text.as_deref(), Some("A pearl"));

        let verdict =
            AnswerService::validate(&question, Some(&right), Some("my own words")).unwrap();
        assert_eq!(verdict.answer_text.as_deref(), Some("my own words"));
    }

    #[test]
    fn cross_question_option_is_rejected() {
        let (question, _, _) = mcq_question();
        let foreign = AnswerOption::new("some-other-question", "A pearl", true);

        let result = AnswerService::validate(&question, Some(&foreign), None);
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn drag_drop_exact_order_is_correct() {
        let question = drag_drop_question(&["a", "b", "c"]);

        let verdict =
            AnswerService::validate(&question, None, Some(r#"["a","b","c"]"#)).unwrap();
        assert_eq!(verdict.is_correct, Some(true));
    }

    #[test]
    fn drag_drop_same_set_wrong_order_is_incorrect() {
        let question = drag_drop_question(&["a", "b", "c"]);

        let verdict =
            AnswerService::validate(&question, None, Some(r#"["b","a","c"]"#)).unwrap();
        assert_eq!(verdict.is_correct, Some(false));
    }

    #[test]
    fn drag_drop_length_mismatch_is_incorrect() {
        let question = drag_drop_question(&["a", "b", "c"]);

        let verdict = AnswerService::validate(&question, None, Some(r#"["a","b"]"#)).unwrap();
        assert_eq!(verdict.is_correct, Some(false));
    }

    #[test]
    fn drag_drop_non_json_is_invalid_input() {
        let question = drag_drop_question(&["a", "b"]);

        let result = AnswerService::validate(&question, None, Some("a,b"));
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn drag_drop_json_non_array_is_invalid_input() {
        let question = drag_drop_question(&["a", "b"]);

        let result = AnswerService::validate(&question, None, Some(r#"{"order":["a","b"]}"#));
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn drag_drop_without_metadata_is_not_configured() {
        let mut question = drag_drop_question(&["a", "b"]);
        question.metadata = None;

        let result = AnswerService::validate(&question, None, Some(r#"["a","b"]"#));
        assert!(matches!(result, Err(AppError::NotConfigured(_))));
    }

    #[test]
    fn essay_is_left_ungraded() {
        let question = fixtures::essay_question("story-1");

        let verdict =
            AnswerService::validate(&question, None, Some("I liked the brave crab.")).unwrap();
        assert_eq!(verdict.is_correct, None);
        assert_eq!(
            verdict.answer_text.as_deref(),
            Some("I liked the brave crab.")
        );
    }

    #[test]
    fn empty_submission_defaults_to_incorrect() {
        let (question, _, _) = mcq_question();

        let verdict = AnswerService::validate(&question, None, None).unwrap();
        assert_eq!(verdict.is_correct, Some(false));
        assert_eq!(verdict.answer_text, None);
    }
}
