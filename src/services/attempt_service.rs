use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    errors::{AppError, AppResult},
    models::domain::question::QuestionStageType,
    models::domain::story_attempt::{
        AttemptStageType, QuestionAttemptLog, StageAttempt, StoryAttempt,
    },
    models::domain::xp_grant::{XpGrant, XpSource},
    models::dto::request::{
        AttemptListQuery, CreateQuestionLogRequest, CreateStageAttemptRequest,
        UpdateAttemptRequest,
    },
    models::dto::response::{AttemptListItem, PaginatedResponse},
    repositories::{
        AttemptListFilter, ProgressRepository, QuestionRepository, StoryAttemptRepository,
        StoryRepository, XpLedgerRepository,
    },
    services::answer_service::AnswerService,
};

/// Attempt lifecycle: create/resume, partial updates, stage completion with
/// server-side scoring, question-log validation, and island cycle detection.
pub struct AttemptService {
    attempts: Arc<dyn StoryAttemptRepository>,
    stories: Arc<dyn StoryRepository>,
    questions: Arc<dyn QuestionRepository>,
    progress: Arc<dyn ProgressRepository>,
    xp_ledger: Arc<dyn XpLedgerRepository>,
    /// Mutations on one attempt serialize on its lock; two concurrent
    /// completions cannot interleave the cycle check with the progress
    /// update.
    attempt_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl AttemptService {
    pub fn new(
        attempts: Arc<dyn StoryAttemptRepository>,
        stories: Arc<dyn StoryRepository>,
        questions: Arc<dyn QuestionRepository>,
        progress: Arc<dyn ProgressRepository>,
        xp_ledger: Arc<dyn XpLedgerRepository>,
    ) -> Self {
        Self {
            attempts,
            stories,
            questions,
            progress,
            xp_ledger,
            attempt_locks: Mutex::new(HashMap::new()),
        }
    }

    async fn lock_for(&self, attempt_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.attempt_locks.lock().await;
        locks
            .entry(attempt_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Ownership check for mutations. A foreign attempt surfaces as
    /// NotFound, hiding its existence from other users.
    async fn find_owned(&self, user_id: &str, attempt_id: &str) -> AppResult<StoryAttempt> {
        let attempt = self
            .attempts
            .find_by_id(attempt_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Attempt with id '{}' not found", attempt_id))
            })?;

        if attempt.user_id != user_id {
            return Err(AppError::NotFound(format!(
                "Attempt with id '{}' not found",
                attempt_id
            )));
        }

        Ok(attempt)
    }

    /// Resume the unfinished attempt for (user, story) if one exists,
    /// otherwise start a new one. At most one unfinished attempt per pair.
    pub async fn create_or_resume(&self, user_id: &str, story_id: &str) -> AppResult<StoryAttempt> {
        if let Some(existing) = self.attempts.find_unfinished(user_id, story_id).await? {
            log::debug!(
                "Resuming attempt {} for user {} on story {}",
                existing.id,
                user_id,
                story_id
            );
            return Ok(existing);
        }

        let attempt = StoryAttempt::new(user_id, story_id);
        self.attempts.create(attempt).await
    }

    pub async fn get_attempt(&self, user_id: &str, attempt_id: &str) -> AppResult<StoryAttempt> {
        let attempt = self
            .attempts
            .find_by_id(attempt_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Attempt with id '{}' not found", attempt_id))
            })?;

        if attempt.user_id != user_id {
            return Err(AppError::Forbidden(
                "Attempt belongs to another user".to_string(),
            ));
        }

        Ok(attempt)
    }

    pub async fn list_attempts(
        &self,
        user_id: &str,
        query: AttemptListQuery,
    ) -> AppResult<PaginatedResponse<AttemptListItem>> {
        let story_ids = if let Some(story_id) = &query.story_id {
            Some(vec![story_id.clone()])
        } else if let Some(island_id) = &query.island_id {
            let stories = self.stories.find_by_island(island_id).await?;
            Some(stories.into_iter().map(|s| s.id).collect())
        } else {
            None
        };

        let filter = AttemptListFilter {
            user_id: user_id.to_string(),
            story_ids,
            is_finished: query.is_finished,
        };

        let offset = query.pagination().offset();
        let limit = query.pagination().limit();
        let (attempts, total) = self.attempts.list(filter, offset, limit).await?;

        let mut page_story_ids: Vec<String> =
            attempts.iter().map(|a| a.story_id.clone()).collect();
        page_story_ids.sort();
        page_story_ids.dedup();

        let titles: HashMap<String, String> = self
            .stories
            .find_by_ids(&page_story_ids)
            .await?
            .into_iter()
            .map(|s| (s.id, s.title))
            .collect();

        let items = attempts
            .into_iter()
            .map(|attempt| {
                let story_title = titles.get(&attempt.story_id).cloned();
                AttemptListItem {
                    attempt,
                    story_title,
                }
            })
            .collect();

        Ok(PaginatedResponse {
            items,
            total,
            offset,
            limit,
        })
    }

    pub async fn update_attempt(
        &self,
        user_id: &str,
        attempt_id: &str,
        update: UpdateAttemptRequest,
    ) -> AppResult<StoryAttempt> {
        let lock = self.lock_for(attempt_id).await;
        let _guard = lock.lock().await;

        self.find_owned(user_id, attempt_id).await?;

        if let Some(xp) = update.total_xp_gained {
            if xp > 0 {
                // Keyed by (attempt, source): re-sending the same cumulative
                // value replaces the grant instead of double-counting it.
                self.xp_ledger
                    .record(XpGrant::new(user_id, attempt_id, XpSource::AttemptTotal, xp))
                    .await?;
            }
        }

        self.attempts.apply_update(attempt_id, update).await
    }

    pub async fn delete_attempt(&self, user_id: &str, attempt_id: &str) -> AppResult<()> {
        let lock = self.lock_for(attempt_id).await;
        {
            let _guard = lock.lock().await;
            self.find_owned(user_id, attempt_id).await?;
            self.attempts.delete(attempt_id).await?;
        }
        self.attempt_locks.lock().await.remove(attempt_id);
        Ok(())
    }

    /// Record a completed stage. The score is computed from the attempt's
    /// question logs unless the caller supplied one; PRE_TEST and POST_TEST
    /// scores propagate onto the parent attempt, and a POST_TEST completion
    /// triggers the island cycle check.
    pub async fn add_stage_attempt(
        &self,
        user_id: &str,
        attempt_id: &str,
        request: CreateStageAttemptRequest,
    ) -> AppResult<StageAttempt> {
        let lock = self.lock_for(attempt_id).await;
        let _guard = lock.lock().await;

        let attempt = self.find_owned(user_id, attempt_id).await?;

        let score = match request.score {
            Some(score) => score,
            None => self.compute_stage_score(&attempt, request.stage_type).await?,
        };

        let stage = StageAttempt::new(
            attempt_id,
            request.stage_type,
            request.time_spent_seconds.unwrap_or(0),
            request.xp_gained.unwrap_or(0),
            Some(score),
        );
        self.attempts.push_stage(attempt_id, stage.clone()).await?;

        match request.stage_type {
            AttemptStageType::PreTest => {
                let patch = UpdateAttemptRequest {
                    pre_test_score: Some(score),
                    ..Default::default()
                };
                self.attempts.apply_update(attempt_id, patch).await?;
            }
            AttemptStageType::PostTest => {
                let patch = UpdateAttemptRequest {
                    post_test_score: Some(score),
                    ..Default::default()
                };
                self.attempts.apply_update(attempt_id, patch).await?;

                if let Some(story) = self.stories.find_by_id(&attempt.story_id).await? {
                    if self.is_cycle_complete(user_id, &story.island_id).await? {
                        let progress = self
                            .progress
                            .increment_cycle(user_id, &story.island_id)
                            .await?;
                        log::info!(
                            "User {} completed cycle {} of island {}",
                            user_id,
                            progress.cycle_count,
                            story.island_id
                        );
                    }
                }
            }
            AttemptStageType::Story => {}
        }

        if stage.xp_gained > 0 {
            self.xp_ledger
                .record(XpGrant::new(
                    user_id,
                    attempt_id,
                    XpSource::from(request.stage_type),
                    stage.xp_gained,
                ))
                .await?;
        }

        Ok(stage)
    }

    /// Validate and persist one answer submission. Correctness is always
    /// server-derived; the request's own is_correct flag is never read.
    pub async fn add_question_log(
        &self,
        user_id: &str,
        attempt_id: &str,
        request: CreateQuestionLogRequest,
    ) -> AppResult<QuestionAttemptLog> {
        let lock = self.lock_for(attempt_id).await;
        let _guard = lock.lock().await;

        self.find_owned(user_id, attempt_id).await?;

        let question = self
            .questions
            .find_by_id(&request.question_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Question with id '{}' not found", request.question_id))
            })?;

        let option = match &request.selected_option_id {
            Some(option_id) => Some(
                self.questions
                    .find_option(option_id)
                    .await?
                    .ok_or_else(|| {
                        AppError::NotFound(format!(
                            "Answer option with id '{}' not found",
                            option_id
                        ))
                    })?,
            ),
            None => None,
        };

        let verdict = AnswerService::validate(
            &question,
            option.as_ref(),
            request.user_answer_text.as_deref(),
        )?;

        let log = QuestionAttemptLog::new(
            attempt_id,
            &question.id,
            verdict.answer_text,
            verdict.is_correct,
            request.attempt_count.unwrap_or(1),
        );
        self.attempts.push_log(attempt_id, log.clone()).await?;

        Ok(log)
    }

    /// Whether the user has a finished attempt on every trackable story of
    /// the island. Stories without content never block completion; an island
    /// with no trackable stories is never complete.
    pub async fn is_cycle_complete(&self, user_id: &str, island_id: &str) -> AppResult<bool> {
        let stories = self.stories.find_by_island(island_id).await?;
        let trackable: Vec<&str> = stories
            .iter()
            .filter(|s| s.is_trackable())
            .map(|s| s.id.as_str())
            .collect();

        if trackable.is_empty() {
            return Ok(false);
        }

        let finished: HashSet<String> = self
            .attempts
            .distinct_finished_story_ids(user_id)
            .await?
            .into_iter()
            .collect();

        Ok(trackable.iter().all(|id| finished.contains(*id)))
    }

    async fn compute_stage_score(
        &self,
        attempt: &StoryAttempt,
        stage_type: AttemptStageType,
    ) -> AppResult<f64> {
        if attempt.question_logs.is_empty() {
            return Ok(0.0);
        }

        let mut question_ids: Vec<String> = attempt
            .question_logs
            .iter()
            .map(|log| log.question_id.clone())
            .collect();
        question_ids.sort();
        question_ids.dedup();

        let questions = self.questions.find_by_ids(&question_ids).await?;
        let stage_of: HashMap<&str, QuestionStageType> = questions
            .iter()
            .map(|q| (q.id.as_str(), q.stage_type))
            .collect();

        let wanted = stage_type.question_stage();
        let considered: Vec<&QuestionAttemptLog> = attempt
            .question_logs
            .iter()
            .filter(|log| stage_of.get(log.question_id.as_str()) == Some(&wanted))
            .collect();

        if considered.is_empty() {
            return Ok(0.0);
        }

        let correct = considered
            .iter()
            .filter(|log| log.is_correct == Some(true))
            .count();

        Ok(correct as f64 / considered.len() as f64 * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::attempt_repository::MockStoryAttemptRepository;
    use crate::repositories::progress_repository::MockProgressRepository;
    use crate::repositories::question_repository::MockQuestionRepository;
    use crate::repositories::story_repository::MockStoryRepository;
    use crate::repositories::xp_ledger_repository::MockXpLedgerRepository;

    fn service_with(
        attempts: MockStoryAttemptRepository,
        stories: MockStoryRepository,
        questions: MockQuestionRepository,
        progress: MockProgressRepository,
        xp_ledger: MockXpLedgerRepository,
    ) -> AttemptService {
        AttemptService::new(
            Arc::new(attempts),
            Arc::new(stories),
            Arc::new(questions),
            Arc::new(progress),
            Arc::new(xp_ledger),
        )
    }

    #[actix_rt::test]
    async fn create_or_resume_returns_the_existing_unfinished_attempt() {
        let existing = StoryAttempt::new("user-1", "story-1");
        let existing_id = existing.id.clone();

        let mut attempts = MockStoryAttemptRepository::new();
        attempts
            .expect_find_unfinished()
            .returning(move |_, _| Ok(Some(existing.clone())));
        attempts.expect_create().never();

        let service = service_with(
            attempts,
            MockStoryRepository::new(),
            MockQuestionRepository::new(),
            MockProgressRepository::new(),
            MockXpLedgerRepository::new(),
        );

        let attempt = service.create_or_resume("user-1", "story-1").await.unwrap();
        assert_eq!(attempt.id, existing_id);
    }

    #[actix_rt::test]
    async fn add_question_log_rejects_unknown_question() {
        let attempt = StoryAttempt::new("user-1", "story-1");
        let attempt_id = attempt.id.clone();

        let mut attempts = MockStoryAttemptRepository::new();
        attempts
            .expect_find_by_id()
            .returning(move |_| Ok(Some(attempt.clone())));
        attempts.expect_push_log().never();

        let mut questions = MockQuestionRepository::new();
        questions.expect_find_by_id().returning(|_| Ok(None));

        let service = service_with(
            attempts,
            MockStoryRepository::new(),
            questions,
            MockProgressRepository::new(),
            MockXpLedgerRepository::new(),
        );

        let request = CreateQuestionLogRequest {
            question_id: "missing".to_string(),
            selected_option_id: None,
            user_answer_text: None,
            is_correct: None,
            attempt_count: None,
        };

        let result = service
            .add_question_log("user-1", &attempt_id, request)
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[actix_rt::test]
    async fn mutations_on_a_foreign_attempt_surface_as_not_found() {
        let attempt = StoryAttempt::new("someone-else", "story-1");
        let attempt_id = attempt.id.clone();

        let mut attempts = MockStoryAttemptRepository::new();
        attempts
            .expect_find_by_id()
            .returning(move |_| Ok(Some(attempt.clone())));
        attempts.expect_apply_update().never();

        let service = service_with(
            attempts,
            MockStoryRepository::new(),
            MockQuestionRepository::new(),
            MockProgressRepository::new(),
            MockXpLedgerRepository::new(),
        );

        let result = service
            .update_attempt("user-1", &attempt_id, UpdateAttemptRequest::default())
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[actix_rt::test]
    async fn island_with_no_trackable_stories_is_never_complete() {
        let mut stories = MockStoryRepository::new();
        stories.expect_find_by_island().returning(|_| Ok(vec![]));

        let mut attempts = MockStoryAttemptRepository::new();
        attempts.expect_distinct_finished_story_ids().never();

        let service = service_with(
            attempts,
            stories,
            MockQuestionRepository::new(),
            MockProgressRepository::new(),
            MockXpLedgerRepository::new(),
        );

        let complete = service.is_cycle_complete("user-1", "island-1").await.unwrap();
        assert!(!complete);
    }
}
