pub mod attempt_repository;
pub mod island_repository;
pub mod progress_repository;
pub mod question_repository;
pub mod story_repository;
pub mod xp_ledger_repository;

pub use attempt_repository::{
    AttemptListFilter, MongoStoryAttemptRepository, StoryAttemptRepository,
};
pub use island_repository::{IslandRepository, MongoIslandRepository};
pub use progress_repository::{MongoProgressRepository, ProgressFilter, ProgressRepository};
pub use question_repository::{MongoQuestionRepository, QuestionRepository};
pub use story_repository::{MongoStoryRepository, StoryRepository};
pub use xp_ledger_repository::{MongoXpLedgerRepository, XpLedgerRepository};
