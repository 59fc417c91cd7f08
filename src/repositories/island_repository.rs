use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

use crate::{db::Database, errors::AppResult, models::domain::Island};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IslandRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Island>>;
    async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<Island>>;
    /// All islands in unlock order.
    async fn find_all_sorted(&self) -> AppResult<Vec<Island>>;
}

pub struct MongoIslandRepository {
    collection: Collection<Island>,
}

impl MongoIslandRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("islands");
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for islands collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;

        Ok(())
    }
}

#[async_trait]
impl IslandRepository for MongoIslandRepository {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Island>> {
        let island = self.collection.find_one(doc! { "id": id }).await?;
        Ok(island)
    }

    async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<Island>> {
        let islands = self
            .collection
            .find(doc! { "id": { "$in": ids.to_vec() } })
            .await?
            .try_collect()
            .await?;
        Ok(islands)
    }

    async fn find_all_sorted(&self) -> AppResult<Vec<Island>> {
        let islands = self
            .collection
            .find(doc! {})
            .sort(doc! { "unlock_order": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(islands)
    }
}
