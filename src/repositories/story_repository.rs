use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

use crate::{db::Database, errors::AppResult, models::domain::Story};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StoryRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Story>>;
    async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<Story>>;
    async fn find_by_island(&self, island_id: &str) -> AppResult<Vec<Story>>;
}

pub struct MongoStoryRepository {
    collection: Collection<Story>,
}

impl MongoStoryRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("stories");
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for stories collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let island_index = IndexModel::builder()
            .keys(doc! { "island_id": 1 })
            .options(IndexOptions::builder().name("island_id".to_string()).build())
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(island_index).await?;

        Ok(())
    }
}

#[async_trait]
impl StoryRepository for MongoStoryRepository {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Story>> {
        let story = self.collection.find_one(doc! { "id": id }).await?;
        Ok(story)
    }

    async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<Story>> {
        let stories = self
            .collection
            .find(doc! { "id": { "$in": ids.to_vec() } })
            .await?
            .try_collect()
            .await?;
        Ok(stories)
    }

    async fn find_by_island(&self, island_id: &str) -> AppResult<Vec<Story>> {
        let stories = self
            .collection
            .find(doc! { "island_id": island_id })
            .await?
            .try_collect()
            .await?;
        Ok(stories)
    }
}
