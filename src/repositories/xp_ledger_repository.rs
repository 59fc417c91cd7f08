use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::doc,
    options::{IndexOptions, ReplaceOptions},
    Collection, IndexModel,
};

use crate::{db::Database, errors::AppResult, models::domain::XpGrant};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait XpLedgerRepository: Send + Sync {
    /// Record a grant, replacing any earlier grant for the same
    /// (attempt, source) key. Amounts are never added in place; the ledger
    /// holds at most one grant per key.
    async fn record(&self, grant: XpGrant) -> AppResult<XpGrant>;
    /// The user's current XP total: a fold over their grants.
    async fn total_for_user(&self, user_id: &str) -> AppResult<i64>;
}

pub struct MongoXpLedgerRepository {
    collection: Collection<XpGrant>,
}

impl MongoXpLedgerRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("xp_grants");
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for xp_grants collection");

        let key_index = IndexModel::builder()
            .keys(doc! { "attempt_id": 1, "source": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("attempt_source_unique".to_string())
                    .build(),
            )
            .build();

        let user_index = IndexModel::builder()
            .keys(doc! { "user_id": 1 })
            .options(IndexOptions::builder().name("user_id".to_string()).build())
            .build();

        self.collection.create_index(key_index).await?;
        self.collection.create_index(user_index).await?;

        Ok(())
    }
}

#[async_trait]
impl XpLedgerRepository for MongoXpLedgerRepository {
    async fn record(&self, grant: XpGrant) -> AppResult<XpGrant> {
        let options = ReplaceOptions::builder().upsert(true).build();

        self.collection
            .replace_one(
                doc! {
                    "attempt_id": &grant.attempt_id,
                    "source": grant.source.as_str(),
                },
                &grant,
            )
            .with_options(options)
            .await?;

        Ok(grant)
    }

    async fn total_for_user(&self, user_id: &str) -> AppResult<i64> {
        let grants: Vec<XpGrant> = self
            .collection
            .find(doc! { "user_id": user_id })
            .await?
            .try_collect()
            .await?;

        Ok(grants.iter().map(|g| g.amount as i64).sum())
    }
}
