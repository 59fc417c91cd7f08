use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, to_bson, Bson, Document},
    options::{FindOneAndUpdateOptions, IndexOptions, ReturnDocument},
    Collection, IndexModel,
};

use crate::{
    db::Database,
    errors::{AppError, AppResult},
    models::domain::story_attempt::{QuestionAttemptLog, StageAttempt, StoryAttempt},
    models::dto::request::UpdateAttemptRequest,
};

/// Filter for listing a user's attempts. `story_ids` is pre-resolved by the
/// caller (a single story filter or an island's stories).
#[derive(Debug, Clone, Default)]
pub struct AttemptListFilter {
    pub user_id: String,
    pub story_ids: Option<Vec<String>>,
    pub is_finished: Option<bool>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StoryAttemptRepository: Send + Sync {
    async fn create(&self, attempt: StoryAttempt) -> AppResult<StoryAttempt>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<StoryAttempt>>;
    async fn find_unfinished(&self, user_id: &str, story_id: &str)
        -> AppResult<Option<StoryAttempt>>;
    async fn list(
        &self,
        filter: AttemptListFilter,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<StoryAttempt>, i64)>;
    async fn apply_update(&self, id: &str, update: UpdateAttemptRequest)
        -> AppResult<StoryAttempt>;
    async fn delete(&self, id: &str) -> AppResult<()>;
    async fn push_stage(&self, attempt_id: &str, stage: StageAttempt) -> AppResult<()>;
    async fn push_log(&self, attempt_id: &str, log: QuestionAttemptLog) -> AppResult<()>;
    /// Distinct ids of stories the user has at least one finished attempt on.
    async fn distinct_finished_story_ids(&self, user_id: &str) -> AppResult<Vec<String>>;
    /// Averages of pre/post-test scores over the user's finished attempts.
    async fn average_test_scores(&self, user_id: &str) -> AppResult<(Option<f64>, Option<f64>)>;
}

pub struct MongoStoryAttemptRepository {
    collection: Collection<StoryAttempt>,
}

impl MongoStoryAttemptRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("story_attempts");
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for story_attempts collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let user_story_index = IndexModel::builder()
            .keys(doc! { "user_id": 1, "story_id": 1 })
            .options(IndexOptions::builder().name("user_story".to_string()).build())
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(user_story_index).await?;

        Ok(())
    }

    fn filter_doc(filter: &AttemptListFilter) -> Document {
        let mut doc = doc! { "user_id": &filter.user_id };

        if let Some(story_ids) = &filter.story_ids {
            doc.insert("story_id", doc! { "$in": story_ids.clone() });
        }

        match filter.is_finished {
            Some(true) => {
                doc.insert("finished_at", doc! { "$ne": Bson::Null });
            }
            Some(false) => {
                doc.insert("finished_at", Bson::Null);
            }
            None => {}
        }

        doc
    }

    fn update_doc(update: &UpdateAttemptRequest) -> AppResult<Document> {
        let mut set = Document::new();

        if let Some(finished_at) = &update.finished_at {
            set.insert("finished_at", to_bson(finished_at)?);
        }
        if let Some(total_time_seconds) = update.total_time_seconds {
            set.insert("total_time_seconds", total_time_seconds);
        }
        if let Some(total_xp_gained) = update.total_xp_gained {
            set.insert("total_xp_gained", total_xp_gained);
        }
        if let Some(pre_test_score) = update.pre_test_score {
            set.insert("pre_test_score", pre_test_score);
        }
        if let Some(post_test_score) = update.post_test_score {
            set.insert("post_test_score", post_test_score);
        }
        if let Some(correct_interactive_cnt) = update.correct_interactive_cnt {
            set.insert("correct_interactive_cnt", correct_interactive_cnt);
        }
        if let Some(wrong_interactive_cnt) = update.wrong_interactive_cnt {
            set.insert("wrong_interactive_cnt", wrong_interactive_cnt);
        }
        if let Some(essay_answer) = &update.essay_answer {
            set.insert("essay_answer", essay_answer);
        }

        Ok(set)
    }
}

#[async_trait]
impl StoryAttemptRepository for MongoStoryAttemptRepository {
    async fn create(&self, attempt: StoryAttempt) -> AppResult<StoryAttempt> {
        self.collection.insert_one(&attempt).await?;
        Ok(attempt)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<StoryAttempt>> {
        let attempt = self.collection.find_one(doc! { "id": id }).await?;
        Ok(attempt)
    }

    async fn find_unfinished(
        &self,
        user_id: &str,
        story_id: &str,
    ) -> AppResult<Option<StoryAttempt>> {
        let attempt = self
            .collection
            .find_one(doc! {
                "user_id": user_id,
                "story_id": story_id,
                "finished_at": Bson::Null,
            })
            .await?;
        Ok(attempt)
    }

    async fn list(
        &self,
        filter: AttemptListFilter,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<StoryAttempt>, i64)> {
        let filter = Self::filter_doc(&filter);

        let total = self.collection.count_documents(filter.clone()).await?;

        let attempts = self
            .collection
            .find(filter)
            .skip(offset as u64)
            .limit(limit)
            .sort(doc! { "started_at": -1 })
            .await?
            .try_collect()
            .await?;

        Ok((attempts, total as i64))
    }

    async fn apply_update(
        &self,
        id: &str,
        update: UpdateAttemptRequest,
    ) -> AppResult<StoryAttempt> {
        let set = Self::update_doc(&update)?;

        if set.is_empty() {
            return self.find_by_id(id).await?.ok_or_else(|| {
                AppError::NotFound(format!("Attempt with id '{}' not found", id))
            });
        }

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let attempt = self
            .collection
            .find_one_and_update(doc! { "id": id }, doc! { "$set": set })
            .with_options(options)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Attempt with id '{}' not found", id)))?;

        Ok(attempt)
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        let result = self.collection.delete_one(doc! { "id": id }).await?;

        if result.deleted_count == 0 {
            return Err(AppError::NotFound(format!(
                "Attempt with id '{}' not found",
                id
            )));
        }

        Ok(())
    }

    async fn push_stage(&self, attempt_id: &str, stage: StageAttempt) -> AppResult<()> {
        let result = self
            .collection
            .update_one(
                doc! { "id": attempt_id },
                doc! { "$push": { "stage_attempts": to_bson(&stage)? } },
            )
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!(
                "Attempt with id '{}' not found",
                attempt_id
            )));
        }

        Ok(())
    }

    async fn push_log(&self, attempt_id: &str, log: QuestionAttemptLog) -> AppResult<()> {
        let result = self
            .collection
            .update_one(
                doc! { "id": attempt_id },
                doc! { "$push": { "question_logs": to_bson(&log)? } },
            )
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!(
                "Attempt with id '{}' not found",
                attempt_id
            )));
        }

        Ok(())
    }

    async fn distinct_finished_story_ids(&self, user_id: &str) -> AppResult<Vec<String>> {
        let values = self
            .collection
            .distinct(
                "story_id",
                doc! { "user_id": user_id, "finished_at": { "$ne": Bson::Null } },
            )
            .await?;

        Ok(values
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect())
    }

    async fn average_test_scores(&self, user_id: &str) -> AppResult<(Option<f64>, Option<f64>)> {
        let finished: Vec<StoryAttempt> = self
            .collection
            .find(doc! { "user_id": user_id, "finished_at": { "$ne": Bson::Null } })
            .await?
            .try_collect()
            .await?;

        let average = |scores: Vec<f64>| {
            if scores.is_empty() {
                None
            } else {
                Some(scores.iter().sum::<f64>() / scores.len() as f64)
            }
        };

        let pre = average(finished.iter().filter_map(|a| a.pre_test_score).collect());
        let post = average(finished.iter().filter_map(|a| a.post_test_score).collect());

        Ok((pre, post))
    }
}
