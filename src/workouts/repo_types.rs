use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::ownership::Owned;

#[derive(Debug, Clone, FromRow)]
pub struct Workout {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: Date,
    pub note: Option<String>,
    pub created_at: OffsetDateTime,
}

impl Owned for Workout {
    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}

/// One set; `position` keeps the order the client sent them in.
#[derive(Debug, Clone, FromRow)]
pub struct WorkoutSet {
    pub id: Uuid,
    pub workout_id: Uuid,
    pub exercise_id: Uuid,
    pub position: i64,
    pub reps: i64,
    pub weight_kg: f64,
}

/// A workout together with its sets, in order.
#[derive(Debug, Clone)]
pub struct WorkoutDetail {
    pub workout: Workout,
    pub sets: Vec<WorkoutSet>,
}
