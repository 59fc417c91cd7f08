use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, Document},
    options::{IndexOptions, UpdateOptions},
    Collection, IndexModel,
};
use uuid::Uuid;

use crate::{
    db::Database,
    errors::{AppError, AppResult},
    models::domain::UserProgress,
};

#[derive(Debug, Clone, Default)]
pub struct ProgressFilter {
    pub is_unlocked: Option<bool>,
    pub is_completed: Option<bool>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    async fn create(&self, progress: UserProgress) -> AppResult<UserProgress>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<UserProgress>>;
    async fn find_by_user_and_island(
        &self,
        user_id: &str,
        island_id: &str,
    ) -> AppResult<Option<UserProgress>>;
    async fn list_for_user(
        &self,
        user_id: &str,
        filter: ProgressFilter,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<UserProgress>, i64)>;
    async fn update_flags(
        &self,
        id: &str,
        is_unlocked: Option<bool>,
        is_completed: Option<bool>,
    ) -> AppResult<UserProgress>;
    /// Insert rows, skipping any (user, island) pair that already exists.
    async fn create_many_skip_duplicates(&self, rows: Vec<UserProgress>) -> AppResult<u64>;
    /// Atomically add one full cycle and mark the island completed, creating
    /// the row (unlocked, one cycle) when it does not exist yet.
    async fn increment_cycle(&self, user_id: &str, island_id: &str) -> AppResult<UserProgress>;
}

pub struct MongoProgressRepository {
    collection: Collection<UserProgress>,
}

impl MongoProgressRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("user_progress");
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for user_progress collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let user_island_index = IndexModel::builder()
            .keys(doc! { "user_id": 1, "island_id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("user_island_unique".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(user_island_index).await?;

        Ok(())
    }

    fn filter_doc(user_id: &str, filter: &ProgressFilter) -> Document {
        let mut doc = doc! { "user_id": user_id };
        if let Some(is_unlocked) = filter.is_unlocked {
            doc.insert("is_unlocked", is_unlocked);
        }
        if let Some(is_completed) = filter.is_completed {
            doc.insert("is_completed", is_completed);
        }
        doc
    }
}

#[async_trait]
impl ProgressRepository for MongoProgressRepository {
    async fn create(&self, progress: UserProgress) -> AppResult<UserProgress> {
        self.collection.insert_one(&progress).await?;
        Ok(progress)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<UserProgress>> {
        let progress = self.collection.find_one(doc! { "id": id }).await?;
        Ok(progress)
    }

    async fn find_by_user_and_island(
        &self,
        user_id: &str,
        island_id: &str,
    ) -> AppResult<Option<UserProgress>> {
        let progress = self
            .collection
            .find_one(doc! { "user_id": user_id, "island_id": island_id })
            .await?;
        Ok(progress)
    }

    async fn list_for_user(
        &self,
        user_id: &str,
        filter: ProgressFilter,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<UserProgress>, i64)> {
        let filter = Self::filter_doc(user_id, &filter);

        let total = self.collection.count_documents(filter.clone()).await?;

        let rows = self
            .collection
            .find(filter)
            .skip(offset as u64)
            .limit(limit)
            .sort(doc! { "id": 1 })
            .await?
            .try_collect()
            .await?;

        Ok((rows, total as i64))
    }

    async fn update_flags(
        &self,
        id: &str,
        is_unlocked: Option<bool>,
        is_completed: Option<bool>,
    ) -> AppResult<UserProgress> {
        let mut set = Document::new();
        if let Some(is_unlocked) = is_unlocked {
            set.insert("is_unlocked", is_unlocked);
        }
        if let Some(is_completed) = is_completed {
            set.insert("is_completed", is_completed);
        }

        if !set.is_empty() {
            let result = self
                .collection
                .update_one(doc! { "id": id }, doc! { "$set": set })
                .await?;

            if result.matched_count == 0 {
                return Err(AppError::NotFound(format!(
                    "Progress with id '{}' not found",
                    id
                )));
            }
        }

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Progress with id '{}' not found", id)))
    }

    async fn create_many_skip_duplicates(&self, rows: Vec<UserProgress>) -> AppResult<u64> {
        let mut inserted = 0;
        for row in rows {
            let existing = self
                .find_by_user_and_island(&row.user_id, &row.island_id)
                .await?;
            if existing.is_none() {
                self.collection.insert_one(&row).await?;
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    async fn increment_cycle(&self, user_id: &str, island_id: &str) -> AppResult<UserProgress> {
        let options = UpdateOptions::builder().upsert(true).build();

        self.collection
            .update_one(
                doc! { "user_id": user_id, "island_id": island_id },
                doc! {
                    "$inc": { "cycle_count": 1 },
                    "$set": { "is_completed": true },
                    "$setOnInsert": {
                        "id": Uuid::new_v4().to_string(),
                        "is_unlocked": true,
                    },
                },
            )
            .with_options(options)
            .await?;

        self.find_by_user_and_island(user_id, island_id)
            .await?
            .ok_or_else(|| {
                AppError::InternalError(format!(
                    "Progress for user '{}' on island '{}' missing after upsert",
                    user_id, island_id
                ))
            })
    }
}
