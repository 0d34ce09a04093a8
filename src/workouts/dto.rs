use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

use super::repo_types::{WorkoutDetail, WorkoutSet};

#[derive(Debug, Clone, Deserialize)]
pub struct SetInput {
    pub exercise_id: Uuid,
    pub reps: i64,
    pub weight_kg: f64,
}

#[derive(Debug, Deserialize)]
pub struct CreateWorkout {
    pub date: Date,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub sets: Vec<SetInput>,
}

/// Absent fields are left as they are.
#[derive(Debug, Deserialize)]
pub struct UpdateWorkout {
    #[serde(default)]
    pub date: Option<Date>,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SetOut {
    pub id: Uuid,
    pub workout_id: Uuid,
    pub exercise_id: Uuid,
    pub reps: i64,
    pub weight_kg: f64,
}

impl From<WorkoutSet> for SetOut {
    fn from(s: WorkoutSet) -> Self {
        Self {
            id: s.id,
            workout_id: s.workout_id,
            exercise_id: s.exercise_id,
            reps: s.reps,
            weight_kg: s.weight_kg,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WorkoutOut {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: Date,
    pub note: Option<String>,
    pub sets: Vec<SetOut>,
}

impl From<WorkoutDetail> for WorkoutOut {
    fn from(d: WorkoutDetail) -> Self {
        Self {
            id: d.workout.id,
            user_id: d.workout.user_id,
            date: d.workout.date,
            note: d.workout.note,
            sets: d.sets.into_iter().map(SetOut::from).collect(),
        }
    }
}
