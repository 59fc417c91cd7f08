use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::doc,
    options::IndexOptions,
    Collection, IndexModel,
};

use crate::{
    db::Database,
    errors::AppResult,
    models::domain::question::{AnswerOption, Question},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Question>>;
    async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<Question>>;
    /// Resolve an answer option by id, wherever it lives. The returned
    /// option carries its owning question id, which callers must check
    /// against the question actually being answered.
    async fn find_option(&self, option_id: &str) -> AppResult<Option<AnswerOption>>;
}

pub struct MongoQuestionRepository {
    collection: Collection<Question>,
}

impl MongoQuestionRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("questions");
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for questions collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let story_stage_index = IndexModel::builder()
            .keys(doc! { "story_id": 1, "stage_type": 1 })
            .options(IndexOptions::builder().name("story_stage".to_string()).build())
            .build();

        let option_id_index = IndexModel::builder()
            .keys(doc! { "answer_options.id": 1 })
            .options(IndexOptions::builder().name("option_id".to_string()).build())
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(story_stage_index).await?;
        self.collection.create_index(option_id_index).await?;

        Ok(())
    }
}

#[async_trait]
impl QuestionRepository for MongoQuestionRepository {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Question>> {
        let question = self.collection.find_one(doc! { "id": id }).await?;
        Ok(question)
    }

    async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<Question>> {
        let questions = self
            .collection
            .find(doc! { "id": { "$in": ids.to_vec() } })
            .await?
            .try_collect()
            .await?;
        Ok(questions)
    }

    async fn find_option(&self, option_id: &str) -> AppResult<Option<AnswerOption>> {
        let question = self
            .collection
            .find_one(doc! { "answer_options.id": option_id })
            .await?;

        Ok(question.and_then(|q| {
            q.answer_options
                .into_iter()
                .find(|option| option.id == option_id)
        }))
    }
}
