use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    errors::{AppError, AppResult},
    models::domain::UserProgress,
    models::dto::request::{ProgressListQuery, UpdateProgressRequest, UpsertProgressRequest},
    models::dto::response::{IslandSummary, PaginatedResponse, ProgressWithIsland},
    repositories::{IslandRepository, ProgressFilter, ProgressRepository},
};

/// Per-user, per-island unlock/completion/cycle state.
pub struct ProgressService {
    progress: Arc<dyn ProgressRepository>,
    islands: Arc<dyn IslandRepository>,
}

impl ProgressService {
    pub fn new(progress: Arc<dyn ProgressRepository>, islands: Arc<dyn IslandRepository>) -> Self {
        Self { progress, islands }
    }

    pub async fn get_user_progress(
        &self,
        user_id: &str,
        query: ProgressListQuery,
    ) -> AppResult<PaginatedResponse<ProgressWithIsland>> {
        let filter = ProgressFilter {
            is_unlocked: query.is_unlocked,
            is_completed: query.is_completed,
        };

        let offset = query.pagination().offset();
        let limit = query.pagination().limit();
        let (rows, total) = self
            .progress
            .list_for_user(user_id, filter, offset, limit)
            .await?;

        let mut island_ids: Vec<String> = rows.iter().map(|r| r.island_id.clone()).collect();
        island_ids.sort();
        island_ids.dedup();

        let islands: HashMap<String, IslandSummary> = self
            .islands
            .find_by_ids(&island_ids)
            .await?
            .into_iter()
            .map(|island| (island.id.clone(), island.into()))
            .collect();

        let items = rows
            .into_iter()
            .map(|progress| {
                let island = islands.get(&progress.island_id).cloned();
                ProgressWithIsland { progress, island }
            })
            .collect();

        Ok(PaginatedResponse {
            items,
            total,
            offset,
            limit,
        })
    }

    pub async fn get_progress_by_island(
        &self,
        user_id: &str,
        island_id: &str,
    ) -> AppResult<ProgressWithIsland> {
        let progress = self
            .progress
            .find_by_user_and_island(user_id, island_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("No progress for island '{}'", island_id))
            })?;

        let island = self
            .islands
            .find_by_id(island_id)
            .await?
            .map(IslandSummary::from);

        Ok(ProgressWithIsland { progress, island })
    }

    /// Create the (user, island) row lazily, or partially update the
    /// existing one.
    pub async fn upsert_progress(
        &self,
        user_id: &str,
        request: UpsertProgressRequest,
    ) -> AppResult<UserProgress> {
        let existing = self
            .progress
            .find_by_user_and_island(user_id, &request.island_id)
            .await?;

        match existing {
            Some(row) => {
                self.progress
                    .update_flags(&row.id, request.is_unlocked, request.is_completed)
                    .await
            }
            None => {
                let row = UserProgress::new(
                    user_id,
                    &request.island_id,
                    request.is_unlocked.unwrap_or(false),
                    request.is_completed.unwrap_or(false),
                );
                self.progress.create(row).await
            }
        }
    }

    pub async fn update_progress(
        &self,
        user_id: &str,
        progress_id: &str,
        request: UpdateProgressRequest,
    ) -> AppResult<UserProgress> {
        let row = self
            .progress
            .find_by_id(progress_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Progress with id '{}' not found", progress_id))
            })?;

        if row.user_id != user_id {
            return Err(AppError::NotFound(format!(
                "Progress with id '{}' not found",
                progress_id
            )));
        }

        self.progress
            .update_flags(progress_id, request.is_unlocked, request.is_completed)
            .await
    }

    /// Seed one progress row per island for a new learner; islands not
    /// locked by default start unlocked. Already-seeded pairs are skipped.
    pub async fn initialize_user_progress(&self, user_id: &str) -> AppResult<u64> {
        let islands = self.islands.find_all_sorted().await?;

        let rows = islands
            .iter()
            .map(|island| UserProgress::new(user_id, &island.id, !island.is_locked_default, false))
            .collect();

        self.progress.create_many_skip_duplicates(rows).await
    }

    pub async fn increment_cycle_count(
        &self,
        user_id: &str,
        island_id: &str,
    ) -> AppResult<UserProgress> {
        self.progress.increment_cycle(user_id, island_id).await
    }

    pub async fn get_cycle_count(&self, user_id: &str, island_id: &str) -> AppResult<i32> {
        let progress = self
            .progress
            .find_by_user_and_island(user_id, island_id)
            .await?;
        Ok(progress.map(|p| p.cycle_count).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::Island;
    use crate::repositories::island_repository::MockIslandRepository;
    use crate::repositories::progress_repository::MockProgressRepository;

    #[actix_rt::test]
    async fn initialize_unlocks_only_islands_not_locked_by_default() {
        let open = Island::new("Starter Shore", 1, false);
        let locked = Island::new("Vowel Volcano", 2, true);

        let mut islands = MockIslandRepository::new();
        islands
            .expect_find_all_sorted()
            .returning(move || Ok(vec![open.clone(), locked.clone()]));

        let mut progress = MockProgressRepository::new();
        progress
            .expect_create_many_skip_duplicates()
            .withf(|rows: &Vec<UserProgress>| {
                rows.len() == 2 && rows[0].is_unlocked && !rows[1].is_unlocked
            })
            .returning(|rows| Ok(rows.len() as u64));

        let service = ProgressService::new(Arc::new(progress), Arc::new(islands));

        let inserted = service.initialize_user_progress("user-1").await.unwrap();
        assert_eq!(inserted, 2);
    }

    #[actix_rt::test]
    async fn cycle_count_defaults_to_zero_without_a_row() {
        let mut progress = MockProgressRepository::new();
        progress
            .expect_find_by_user_and_island()
            .returning(|_, _| Ok(None));

        let service =
            ProgressService::new(Arc::new(progress), Arc::new(MockIslandRepository::new()));

        let count = service.get_cycle_count("user-1", "island-1").await.unwrap();
        assert_eq!(count, 0);
    }

    #[actix_rt::test]
    async fn updating_foreign_progress_surfaces_as_not_found() {
        let row = UserProgress::new("someone-else", "island-1", true, false);
        let row_id = row.id.clone();

        let mut progress = MockProgressRepository::new();
        progress
            .expect_find_by_id()
            .returning(move |_| Ok(Some(row.clone())));
        progress.expect_update_flags().never();

        let service =
            ProgressService::new(Arc::new(progress), Arc::new(MockIslandRepository::new()));

        let result = service
            .update_progress("user-1", &row_id, UpdateProgressRequest::default())
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
