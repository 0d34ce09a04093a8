use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo_types::Exercise;

/// Body for both create and rename.
#[derive(Debug, Deserialize)]
pub struct ExerciseInput {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct ExerciseOut {
    pub id: Uuid,
    pub name: String,
    pub user_id: Uuid,
}

impl From<Exercise> for ExerciseOut {
    fn from(e: Exercise) -> Self {
        Self {
            id: e.id,
            name: e.name,
            user_id: e.user_id,
        }
    }
}
