use sqlx::{Executor, Sqlite, SqlitePool, Transaction};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::Exercise;

impl Exercise {
    /// Unscoped lookup; callers classify the row against their scope.
    pub async fn find<'e, E>(ex: E, id: Uuid) -> sqlx::Result<Option<Exercise>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Exercise>(
            r#"
            SELECT id, user_id, name, created_at
            FROM exercises
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
    ) -> sqlx::Result<Vec<Exercise>> {
        sqlx::query_as::<_, Exercise>(
            r#"
            SELECT id, user_id, name, created_at
            FROM exercises
            WHERE user_id = ?
            ORDER BY name ASC, id ASC
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
        sqlx::query_scalar(r#"SELECT COUNT(*) FROM exercises WHERE user_id = ?"#)
            .bind(user_id)
            .fetch_one(db)
            .await
    }

    /// Every owner's exercises, newest first.
    pub async fn list_all(db: &SqlitePool, limit: i64, offset: i64) -> sqlx::Result<Vec<Exercise>> {
        sqlx::query_as::<_, Exercise>(
            r#"
            SELECT id, user_id, name, created_at
            FROM exercises
            ORDER BY created_at DESC, id DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await
    }

    pub async fn count_all(db: &SqlitePool) -> sqlx::Result<i64> {
        sqlx::query_scalar(r#"SELECT COUNT(*) FROM exercises"#)
            .fetch_one(db)
            .await
    }

    /// Whether `user_id` already has another exercise called `name`.
    pub async fn name_taken<'e, E>(
        ex: E,
        user_id: Uuid,
        name: &str,
        except: Option<Uuid>,
    ) -> sqlx::Result<bool>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let hit: Option<Uuid> = sqlx::query_scalar(
            r#"
            SELECT id FROM exercises
            WHERE user_id = ? AND name = ? AND (? IS NULL OR id <> ?)
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(name)
        .bind(except)
        .bind(except)
        .fetch_optional(ex)
        .await?;
        Ok(hit.is_some())
    }

    pub async fn insert_tx(
        tx: &mut Transaction<'_, Sqlite>,
        user_id: Uuid,
        name: &str,
    ) -> sqlx::Result<Exercise> {
        sqlx::query_as::<_, Exercise>(
            r#"
            INSERT INTO exercises (id, user_id, name, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING id, user_id, name, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(name)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(&mut **tx)
        .await
    }

    pub async fn rename_tx(
        tx: &mut Transaction<'_, Sqlite>,
        id: Uuid,
        name: &str,
    ) -> sqlx::Result<Exercise> {
        sqlx::query_as::<_, Exercise>(
            r#"
            UPDATE exercises SET name = ?
            WHERE id = ?
            RETURNING id, user_id, name, created_at
            "#,
        )
        .bind(name)
        .bind(id)
        .fetch_one(&mut **tx)
        .await
    }

    /// Whether any set, in any workout, points at this exercise.
    pub async fn is_referenced_tx(tx: &mut Transaction<'_, Sqlite>, id: Uuid) -> sqlx::Result<bool> {
        let n: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM sets WHERE exercise_id = ?"#)
            .bind(id)
            .fetch_one(&mut **tx)
            .await?;
        Ok(n > 0)
    }

    pub async fn delete_tx(tx: &mut Transaction<'_, Sqlite>, id: Uuid) -> sqlx::Result<()> {
        sqlx::query(r#"DELETE FROM exercises WHERE id = ?"#)
            .bind(id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }
}
