use serde::Serialize;

use crate::models::domain::{Island, StoryAttempt, UserProgress};

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: String,
}

impl SuccessResponse {
    pub fn new(message: &str) -> Self {
        SuccessResponse {
            success: true,
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T: Serialize> {
    pub items: Vec<T>,
    pub total: i64,
    pub offset: i64,
    pub limit: i64,
}

/// Attempt enriched with its story's title for list views.
#[derive(Debug, Serialize)]
pub struct AttemptListItem {
    #[serde(flatten)]
    pub attempt: StoryAttempt,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub story_title: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IslandSummary {
    pub id: String,
    pub island_name: String,
    pub unlock_order: i32,
}

impl From<Island> for IslandSummary {
    fn from(island: Island) -> Self {
        IslandSummary {
            id: island.id,
            island_name: island.island_name,
            unlock_order: island.unlock_order,
        }
    }
}

/// Progress row enriched with its island's summary.
#[derive(Debug, Serialize)]
pub struct ProgressWithIsland {
    #[serde(flatten)]
    pub progress: UserProgress,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub island: Option<IslandSummary>,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct StatisticsResponse {
    pub stories_completed: i64,
    pub total_xp: i64,
    pub average_pre_test_score: i32,
    pub average_post_test_score: i32,
}
