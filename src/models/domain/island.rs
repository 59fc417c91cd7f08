use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Island {
    pub id: String,
    pub island_name: String,
    pub unlock_order: i32,
    /// Whether a fresh learner starts with this island locked.
    pub is_locked_default: bool,
}

impl Island {
    pub fn new(island_name: &str, unlock_order: i32, is_locked_default: bool) -> Self {
        Island {
            id: Uuid::new_v4().to_string(),
            island_name: island_name.to_string(),
            unlock_order,
            is_locked_default,
        }
    }
}
