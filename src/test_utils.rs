use crate::models::domain::question::{
    AnswerOption, DragDropItem, Question, QuestionMetadata, QuestionStageType, QuestionType,
};
use crate::models::domain::story::{Story, StorySlide, StoryType};
use uuid::Uuid;

pub mod fixtures {
    use super::*;

    /// MCQ question with one correct and one wrong option.
    pub fn mcq_question(story_id: &str, stage_type: QuestionStageType) -> (Question, AnswerOption, AnswerOption) {
        let mut question = Question::new(
            story_id,
            stage_type,
            QuestionType::Mcq,
            "What does the seagull find?",
            5,
        );
        let right = AnswerOption::new(&question.id, "A pearl", true);
        let wrong = AnswerOption::new(&question.id, "A bottle", false);
        question.answer_options = vec![right.clone(), wrong.clone()];
        (question, right, wrong)
    }

    /// DRAG_DROP question configured with the given correct ordering.
    pub fn drag_drop_question(story_id: &str, correct_order: &[&str]) -> Question {
        let mut question = Question::new(
            story_id,
            QuestionStageType::Interactive,
            QuestionType::DragDrop,
            "Order the story events",
            10,
        );
        question.metadata = Some(QuestionMetadata::DragDrop {
            items: correct_order
                .iter()
                .map(|id| DragDropItem {
                    id: id.to_string(),
                    label: format!("Event {}", id),
                })
                .collect(),
            correct_order: correct_order.iter().map(|s| s.to_string()).collect(),
        });
        question
    }

    pub fn essay_question(story_id: &str) -> Question {
        Question::new(
            story_id,
            QuestionStageType::PostTest,
            QuestionType::Essay,
            "What did you think of the story?",
            20,
        )
    }

    /// Story with a single content slide, so it counts toward cycle
    /// completion.
    pub fn trackable_story(island_id: &str, title: &str) -> Story {
        let mut story = Story::new(island_id, title, StoryType::Static);
        story.slides.push(StorySlide {
            id: Uuid::new_v4().to_string(),
            slide_number: 1,
            content: "Once upon a tide...".to_string(),
            image_url: None,
        });
        story
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use crate::models::domain::question::QuestionStageType;

    #[test]
    fn test_mcq_fixture_options_belong_to_the_question() {
        let (question, right, wrong) = mcq_question("story-1", QuestionStageType::PreTest);

        assert_eq!(right.question_id, question.id);
        assert_eq!(wrong.question_id, question.id);
        assert!(right.is_correct);
        assert!(!wrong.is_correct);
    }

    #[test]
    fn test_trackable_story_fixture_has_content() {
        let story = trackable_story("island-1", "The Coral Reef");
        assert!(story.is_trackable());
    }
}
