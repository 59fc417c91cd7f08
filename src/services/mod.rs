pub mod answer_service;
pub mod attempt_service;
pub mod progress_service;
pub mod statistics_service;

pub use answer_service::{AnswerService, AnswerVerdict};
pub use attempt_service::AttemptService;
pub use progress_service::ProgressService;
pub use statistics_service::StatisticsService;
