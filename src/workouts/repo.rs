use std::collections::HashMap;

use sqlx::{Executor, QueryBuilder, Sqlite, SqlitePool, Transaction};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use super::repo_types::{Workout, WorkoutSet};

impl Workout {
    /// Unscoped lookup; callers classify the row against their scope.
    pub async fn find<'e, E>(ex: E, id: Uuid) -> sqlx::Result<Option<Workout>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Workout>(
            r#"
            SELECT id, user_id, date, note, created_at
            FROM workouts
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(ex)
        .await
    }

    pub async fn list_by_user(
        db: &SqlitePool,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> sqlx::Result<Vec<Workout>> {
        sqlx::query_as::<_, Workout>(
            r#"
            SELECT id, user_id, date, note, created_at
            FROM workouts
            WHERE user_id = ?
            ORDER BY date DESC, created_at DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await
    }

    pub async fn count_by_user(db: &SqlitePool, user_id: Uuid) -> sqlx::Result<i64> {
        sqlx::query_scalar(r#"SELECT COUNT(*) FROM workouts WHERE user_id = ?"#)
            .bind(user_id)
            .fetch_one(db)
            .await
    }

    pub async fn list_all(db: &SqlitePool, limit: i64, offset: i64) -> sqlx::Result<Vec<Workout>> {
        sqlx::query_as::<_, Workout>(
            r#"
            SELECT id, user_id, date, note, created_at
            FROM workouts
            ORDER BY date DESC, created_at DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await
    }

    pub async fn count_all(db: &SqlitePool) -> sqlx::Result<i64> {
        sqlx::query_scalar(r#"SELECT COUNT(*) FROM workouts"#)
            .fetch_one(db)
            .await
    }

    pub async fn insert_tx(
        tx: &mut Transaction<'_, Sqlite>,
        user_id: Uuid,
        date: Date,
        note: Option<&str>,
    ) -> sqlx::Result<Workout> {
        sqlx::query_as::<_, Workout>(
            r#"
            INSERT INTO workouts (id, user_id, date, note, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, user_id, date, note, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(date)
        .bind(note)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(&mut **tx)
        .await
    }

    pub async fn update_tx(
        tx: &mut Transaction<'_, Sqlite>,
        id: Uuid,
        date: Date,
        note: Option<&str>,
    ) -> sqlx::Result<Workout> {
        sqlx::query_as::<_, Workout>(
            r#"
            UPDATE workouts SET date = ?, note = ?
            WHERE id = ?
            RETURNING id, user_id, date, note, created_at
            "#,
        )
        .bind(date)
        .bind(note)
        .bind(id)
        .fetch_one(&mut **tx)
        .await
    }

    /// Removes the workout and its sets.
    pub async fn delete_tx(tx: &mut Transaction<'_, Sqlite>, id: Uuid) -> sqlx::Result<()> {
        sqlx::query(r#"DELETE FROM sets WHERE workout_id = ?"#)
            .bind(id)
            .execute(&mut **tx)
            .await?;
        sqlx::query(r#"DELETE FROM workouts WHERE id = ?"#)
            .bind(id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }
}

impl WorkoutSet {
    pub async fn list_for_workout<'e, E>(ex: E, workout_id: Uuid) -> sqlx::Result<Vec<WorkoutSet>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, WorkoutSet>(
            r#"
            SELECT id, workout_id, exercise_id, position, reps, weight_kg
            FROM sets
            WHERE workout_id = ?
            ORDER BY position ASC
            "#,
        )
        .bind(workout_id)
        .fetch_all(ex)
        .await
    }

    /// Sets for a page of workouts in one round trip, grouped by workout.
    pub async fn list_for_workouts(
        db: &SqlitePool,
        workout_ids: &[Uuid],
    ) -> sqlx::Result<HashMap<Uuid, Vec<WorkoutSet>>> {
        let mut grouped: HashMap<Uuid, Vec<WorkoutSet>> = HashMap::new();
        if workout_ids.is_empty() {
            return Ok(grouped);
        }

        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT id, workout_id, exercise_id, position, reps, weight_kg FROM sets WHERE workout_id IN (",
        );
        let mut ids = qb.separated(", ");
        for id in workout_ids {
            ids.push_bind(*id);
        }
        ids.push_unseparated(") ORDER BY position ASC");

        let rows = qb.build_query_as::<WorkoutSet>().fetch_all(db).await?;
        for set in rows {
            grouped.entry(set.workout_id).or_default().push(set);
        }
        Ok(grouped)
    }

    pub async fn find_in_workout_tx(
        tx: &mut Transaction<'_, Sqlite>,
        workout_id: Uuid,
        set_id: Uuid,
    ) -> sqlx::Result<Option<WorkoutSet>> {
        sqlx::query_as::<_, WorkoutSet>(
            r#"
            SELECT id, workout_id, exercise_id, position, reps, weight_kg
            FROM sets
            WHERE id = ? AND workout_id = ?
            "#,
        )
        .bind(set_id)
        .bind(workout_id)
        .fetch_optional(&mut **tx)
        .await
    }

    pub async fn next_position_tx(tx: &mut Transaction<'_, Sqlite>, workout_id: Uuid) -> sqlx::Result<i64> {
        sqlx::query_scalar(r#"SELECT COALESCE(MAX(position) + 1, 0) FROM sets WHERE workout_id = ?"#)
            .bind(workout_id)
            .fetch_one(&mut **tx)
            .await
    }

    pub async fn insert_tx(
        tx: &mut Transaction<'_, Sqlite>,
        workout_id: Uuid,
        exercise_id: Uuid,
        position: i64,
        reps: i64,
        weight_kg: f64,
    ) -> sqlx::Result<WorkoutSet> {
        sqlx::query_as::<_, WorkoutSet>(
            r#"
            INSERT INTO sets (id, workout_id, exercise_id, position, reps, weight_kg)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id, workout_id, exercise_id, position, reps, weight_kg
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(workout_id)
        .bind(exercise_id)
        .bind(position)
        .bind(reps)
        .bind(weight_kg)
        .fetch_one(&mut **tx)
        .await
    }

    pub async fn delete_tx(tx: &mut Transaction<'_, Sqlite>, set_id: Uuid) -> sqlx::Result<()> {
        sqlx::query(r#"DELETE FROM sets WHERE id = ?"#)
            .bind(set_id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }
}
