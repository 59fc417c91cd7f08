use std::sync::Arc;

use crate::{
    config::Config,
    db::Database,
    errors::AppResult,
    repositories::{
        MongoIslandRepository, MongoProgressRepository, MongoQuestionRepository,
        MongoStoryAttemptRepository, MongoStoryRepository, MongoXpLedgerRepository,
    },
    services::{AttemptService, ProgressService, StatisticsService},
};

#[derive(Clone)]
pub struct AppState {
    pub attempt_service: Arc<AttemptService>,
    pub progress_service: Arc<ProgressService>,
    pub statistics_service: Arc<StatisticsService>,
    pub config: Arc<Config>,
    pub db: Database,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let db = Database::connect(&config).await?;

        let attempt_repository = Arc::new(MongoStoryAttemptRepository::new(&db));
        attempt_repository.ensure_indexes().await?;

        let story_repository = Arc::new(MongoStoryRepository::new(&db));
        story_repository.ensure_indexes().await?;

        let question_repository = Arc::new(MongoQuestionRepository::new(&db));
        question_repository.ensure_indexes().await?;

        let island_repository = Arc::new(MongoIslandRepository::new(&db));
        island_repository.ensure_indexes().await?;

        let progress_repository = Arc::new(MongoProgressRepository::new(&db));
        progress_repository.ensure_indexes().await?;

        let xp_ledger_repository = Arc::new(MongoXpLedgerRepository::new(&db));
        xp_ledger_repository.ensure_indexes().await?;

        let attempt_service = Arc::new(AttemptService::new(
            attempt_repository.clone(),
            story_repository.clone(),
            question_repository,
            progress_repository.clone(),
            xp_ledger_repository.clone(),
        ));
        let progress_service = Arc::new(ProgressService::new(
            progress_repository,
            island_repository,
        ));
        let statistics_service = Arc::new(StatisticsService::new(
            attempt_repository,
            xp_ledger_repository,
        ));

        Ok(Self {
            attempt_service,
            progress_service,
            statistics_service,
            config: Arc::new(config),
            db,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_is_cloneable() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }
}
