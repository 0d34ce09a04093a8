use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Aggregates over one user's own rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserStats {
    pub total_workouts: i64,
    pub total_sets: i64,
    pub avg_reps: Option<f64>, // null when there are no sets
}

pub async fn for_user(db: &SqlitePool, user_id: Uuid) -> sqlx::Result<UserStats> {
    let total_workouts: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM workouts WHERE user_id = ?"#)
        .bind(user_id)
        .fetch_one(db)
        .await?;

    let (total_sets, avg_reps): (i64, Option<f64>) = sqlx::query_as(
        r#"
        SELECT COUNT(s.id), AVG(s.reps)
        FROM sets s
        JOIN workouts w ON w.id = s.workout_id
        WHERE w.user_id = ?
        "#,
    )
    .bind(user_id)
    .fetch_one(db)
    .await?;

    Ok(UserStats {
        total_workouts,
        total_sets,
        avg_reps,
    })
}
