use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-(user, island) unlock/completion state. Created lazily; exactly one
/// row per pair, enforced by a unique index.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct UserProgress {
    pub id: String,
    pub user_id: String,
    pub island_id: String,
    pub is_unlocked: bool,
    pub is_completed: bool,
    /// Number of full passes through the island's trackable stories.
    pub cycle_count: i32,
}

impl UserProgress {
    pub fn new(user_id: &str, island_id: &str, is_unlocked: bool, is_completed: bool) -> Self {
        UserProgress {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            island_id: island_id.to_string(),
            is_unlocked,
            is_completed,
            cycle_count: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_progress_starts_with_zero_cycles() {
        let progress = UserProgress::new("user-1", "island-1", true, false);

        assert_eq!(progress.cycle_count, 0);
        assert!(progress.is_unlocked);
        assert!(!progress.is_completed);
    }
}
