pub mod island;
pub mod question;
pub mod story;
pub mod story_attempt;
pub mod user_progress;
pub mod xp_grant;

pub use island::Island;
pub use question::{AnswerOption, Question, QuestionStageType, QuestionType};
pub use story::{Story, StoryType};
pub use story_attempt::{AttemptStageType, QuestionAttemptLog, StageAttempt, StoryAttempt};
pub use user_progress::UserProgress;
pub use xp_grant::{XpGrant, XpSource};
