use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;

use super::repo_types::Exercise;
use crate::{
    error::{ApiError, ApiResult},
    ownership::{Lookup, Scope},
    pagination::{Page, Pagination},
};

const MAX_NAME_LEN: usize = 100;

/// Trimmed name, 1..=100 characters.
pub(crate) fn validate_name(raw: &str) -> ApiResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(ApiError::validation("name", "must not be blank"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(ApiError::validation(
            "name",
            format!("must be at most {MAX_NAME_LEN} characters"),
        ));
    }
    Ok(name.to_string())
}

fn duplicate_name() -> ApiError {
    ApiError::BadRequest("Exercise with this name already exists".into())
}

fn not_unique(e: sqlx::Error) -> ApiError {
    match ApiError::from(e) {
        ApiError::BadRequest(_) => duplicate_name(),
        other => other,
    }
}

pub async fn create(db: &SqlitePool, owner: Uuid, raw_name: &str) -> ApiResult<Exercise> {
    let name = validate_name(raw_name)?;

    let mut tx = db.begin().await?;
    if Exercise::name_taken(&mut *tx, owner, &name, None).await? {
        warn!(user_id = %owner, "duplicate exercise name");
        return Err(duplicate_name());
    }
    let exercise = Exercise::insert_tx(&mut tx, owner, &name)
        .await
        .map_err(not_unique)?;
    tx.commit().await?;

    info!(user_id = %owner, exercise_id = %exercise.id, "exercise created");
    Ok(exercise)
}

pub async fn get(db: &SqlitePool, id: Uuid, scope: Scope) -> ApiResult<Exercise> {
    Lookup::classify(Exercise::find(db, id).await?, scope).found("Exercise")
}

pub async fn rename(db: &SqlitePool, id: Uuid, scope: Scope, raw_name: &str) -> ApiResult<Exercise> {
    let name = validate_name(raw_name)?;

    let mut tx = db.begin().await?;
    let current = Lookup::classify(Exercise::find(&mut *tx, id).await?, scope).found("Exercise")?;
    if Exercise::name_taken(&mut *tx, current.user_id, &name, Some(id)).await? {
        warn!(exercise_id = %id, "duplicate exercise name");
        return Err(duplicate_name());
    }
    let exercise = Exercise::rename_tx(&mut tx, id, &name)
        .await
        .map_err(not_unique)?;
    tx.commit().await?;

    info!(exercise_id = %id, "exercise renamed");
    Ok(exercise)
}

/// Refused while any set still references the exercise.
pub async fn delete(db: &SqlitePool, id: Uuid, scope: Scope) -> ApiResult<()> {
    let mut tx = db.begin().await?;
    Lookup::classify(Exercise::find(&mut *tx, id).await?, scope).found("Exercise")?;
    if Exercise::is_referenced_tx(&mut tx, id).await? {
        warn!(exercise_id = %id, "exercise still referenced by sets");
        return Err(ApiError::BadRequest(
            "Exercise is used by existing sets and cannot be deleted".into(),
        ));
    }
    Exercise::delete_tx(&mut tx, id).await?;
    tx.commit().await?;

    info!(exercise_id = %id, "exercise deleted");
    Ok(())
}

pub async fn list_own(db: &SqlitePool, owner: Uuid, p: Pagination) -> ApiResult<Page<Exercise>> {
    let p = p.validate()?;
    let items = Exercise::list_by_user(db, owner, p.limit, p.offset).await?;
    let total = Exercise::count_by_user(db, owner).await?;
    Ok(Page::new(items, p, total))
}

pub async fn list_all(db: &SqlitePool, p: Pagination) -> ApiResult<Page<Exercise>> {
    let p = p.validate()?;
    let items = Exercise::list_all(db, p.limit, p.offset).await?;
    let total = Exercise::count_all(db).await?;
    Ok(Page::new(items, p, total))
}
