use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StoryType {
    Static,
    Interactive,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct StorySlide {
    pub id: String,
    pub slide_number: i32,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Story {
    pub id: String,
    pub island_id: String,
    pub title: String,
    pub story_type: StoryType,
    #[serde(default)]
    pub slides: Vec<StorySlide>,
}

impl Story {
    pub fn new(island_id: &str, title: &str, story_type: StoryType) -> Self {
        Story {
            id: Uuid::new_v4().to_string(),
            island_id: island_id.to_string(),
            title: title.to_string(),
            story_type,
            slides: Vec::new(),
        }
    }

    /// Only stories with actual content count toward cycle completion.
    /// Placeholder stories (e.g. an unconfigured pre/post test shell) must
    /// never block a learner's progress.
    pub fn is_trackable(&self) -> bool {
        !self.slides.is_empty()
    }
}
