use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::domain::story_attempt::AttemptStageType;

/// Where an XP grant came from. One grant may exist per (attempt, source);
/// the attempt-level total and each stage are independent sources, so they
/// add up with each other but re-recording the same source replaces the
/// earlier grant instead of double-counting it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum XpSource {
    AttemptTotal,
    PreTestStage,
    StoryStage,
    PostTestStage,
}

impl XpSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            XpSource::AttemptTotal => "ATTEMPT_TOTAL",
            XpSource::PreTestStage => "PRE_TEST_STAGE",
            XpSource::StoryStage => "STORY_STAGE",
            XpSource::PostTestStage => "POST_TEST_STAGE",
        }
    }
}

impl From<AttemptStageType> for XpSource {
    fn from(stage: AttemptStageType) -> Self {
        match stage {
            AttemptStageType::PreTest => XpSource::PreTestStage,
            AttemptStageType::Story => XpSource::StoryStage,
            AttemptStageType::PostTest => XpSource::PostTestStage,
        }
    }
}

/// Immutable XP-grant event. A user's current XP total is the sum of their
/// grants; there is no mutable per-user counter to drift or double-count.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct XpGrant {
    pub id: String,
    pub user_id: String,
    pub attempt_id: String,
    pub source: XpSource,
    pub amount: i32,
    pub granted_at: DateTime<Utc>,
}

impl XpGrant {
    pub fn new(user_id: &str, attempt_id: &str, source: XpSource, amount: i32) -> Self {
        XpGrant {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            attempt_id: attempt_id.to_string(),
            source,
            amount,
            granted_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_types_map_to_distinct_sources() {
        let sources = [
            XpSource::from(AttemptStageType::PreTest),
            XpSource::from(AttemptStageType::Story),
            XpSource::from(AttemptStageType::PostTest),
        ];

        assert_eq!(sources[0], XpSource::PreTestStage);
        assert_eq!(sources[1], XpSource::StoryStage);
        assert_eq!(sources[2], XpSource::PostTestStage);
    }

    #[test]
    fn source_uses_wire_names() {
        assert_eq!(
            serde_json::to_string(&XpSource::AttemptTotal).unwrap(),
            "\"ATTEMPT_TOTAL\""
        );
        assert_eq!(XpSource::PostTestStage.as_str(), "POST_TEST_STAGE");
    }

    #[test]
    fn grant_round_trip_serialization() {
        let grant = XpGrant::new("user-1", "attempt-1", XpSource::PreTestStage, 15);

        let json = serde_json::to_string(&grant).expect("grant should serialize");
        let parsed: XpGrant = serde_json::from_str(&json).expect("grant should deserialize");

        assert_eq!(parsed, grant);
    }
}
