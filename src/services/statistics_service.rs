use std::sync::Arc;

use crate::{
    errors::AppResult,
    models::dto::response::StatisticsResponse,
    repositories::{StoryAttemptRepository, XpLedgerRepository},
};

/// Per-user aggregates: distinct finished stories, current XP total, and
/// average test scores.
pub struct StatisticsService {
    attempts: Arc<dyn StoryAttemptRepository>,
    xp_ledger: Arc<dyn XpLedgerRepository>,
}

impl StatisticsService {
    pub fn new(
        attempts: Arc<dyn StoryAttemptRepository>,
        xp_ledger: Arc<dyn XpLedgerRepository>,
    ) -> Self {
        Self { attempts, xp_ledger }
    }

    pub async fn get_statistics(&self, user_id: &str) -> AppResult<StatisticsResponse> {
        let finished_stories = self.attempts.distinct_finished_story_ids(user_id).await?;
        let total_xp = self.xp_ledger.total_for_user(user_id).await?;
        let (pre, post) = self.attempts.average_test_scores(user_id).await?;

        Ok(StatisticsResponse {
            stories_completed: finished_stories.len() as i64,
            total_xp,
            average_pre_test_score: pre.map(|s| s.round() as i32).unwrap_or(0),
            average_post_test_score: post.map(|s| s.round() as i32).unwrap_or(0),
        })
    }
}
