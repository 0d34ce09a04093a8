use std::collections::HashSet;

use sqlx::{Sqlite, SqlitePool, Transaction};
use time::{Date, OffsetDateTime};
use tracing::{info, warn};
use uuid::Uuid;

use super::{
    dto::{CreateWorkout, SetInput, UpdateWorkout},
    repo_types::{Workout, WorkoutDetail, WorkoutSet},
};
use crate::{
    error::{ApiError, ApiResult, FieldError},
    exercises::repo_types::Exercise,
    ownership::{Lookup, Scope},
    pagination::{Page, Pagination},
};

const MAX_NOTE_LEN: usize = 500;

fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

pub(crate) fn check_date(date: Date, today: Date, errors: &mut Vec<FieldError>) {
    if date > today {
        errors.push(FieldError::new("date", "date must be today or earlier"));
    }
}

pub(crate) fn check_note(note: Option<&str>, errors: &mut Vec<FieldError>) {
    if note.is_some_and(|n| n.chars().count() > MAX_NOTE_LEN) {
        errors.push(FieldError::new(
            "note",
            format!("must be at most {MAX_NOTE_LEN} characters"),
        ));
    }
}

pub(crate) fn check_set(field: &str, set: &SetInput, errors: &mut Vec<FieldError>) {
    if set.reps < 0 {
        errors.push(FieldError::new(format!("{field}.reps"), "must be zero or greater"));
    }
    if !set.weight_kg.is_finite() || set.weight_kg < 0.0 {
        errors.push(FieldError::new(
            format!("{field}.weight_kg"),
            "must be a finite number, zero or greater",
        ));
    }
}

fn into_result(errors: Vec<FieldError>) -> ApiResult<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors))
    }
}

/// Every referenced exercise must belong to `owner`. Missing and foreign
/// exercises produce the same field error.
async fn check_exercises_owned(
    tx: &mut Transaction<'_, Sqlite>,
    owner: Uuid,
    sets: &[(String, Uuid)],
) -> ApiResult<()> {
    let mut visible = HashSet::new();
    let mut errors = Vec::new();
    for (field, exercise_id) in sets {
        if !visible.contains(exercise_id) {
            let row = Exercise::find(&mut **tx, *exercise_id).await?;
            match Lookup::classify(row, Scope::Owner(owner)) {
                Lookup::Visible(_) => {
                    visible.insert(*exercise_id);
                }
                Lookup::NotOwned | Lookup::Absent => {
                    errors.push(FieldError::new(format!("{field}.exercise_id"), "Exercise not found"));
                }
            }
        }
    }
    if !errors.is_empty() {
        warn!(user_id = %owner, rejected = errors.len(), "sets reference unknown exercises");
    }
    into_result(errors)
}

/// Workout and sets are written in one transaction; nothing is stored if any
/// part is rejected.
pub async fn create(db: &SqlitePool, owner: Uuid, input: CreateWorkout) -> ApiResult<WorkoutDetail> {
    let mut errors = Vec::new();
    check_date(input.date, today(), &mut errors);
    check_note(input.note.as_deref(), &mut errors);
    for (i, set) in input.sets.iter().enumerate() {
        check_set(&format!("sets[{i}]"), set, &mut errors);
    }
    into_result(errors)?;

    let mut tx = db.begin().await?;
    let refs: Vec<_> = input
        .sets
        .iter()
        .enumerate()
        .map(|(i, s)| (format!("sets[{i}]"), s.exercise_id))
        .collect();
    check_exercises_owned(&mut tx, owner, &refs).await?;

    let workout = Workout::insert_tx(&mut tx, owner, input.date, input.note.as_deref()).await?;
    let mut sets = Vec::with_capacity(input.sets.len());
    for (position, s) in input.sets.iter().enumerate() {
        let set = WorkoutSet::insert_tx(
            &mut tx,
            workout.id,
            s.exercise_id,
            position as i64,
            s.reps,
            s.weight_kg,
        )
        .await?;
        sets.push(set);
    }
    tx.commit().await?;

    info!(user_id = %owner, workout_id = %workout.id, sets = sets.len(), "workout created");
    Ok(WorkoutDetail { workout, sets })
}

pub async fn get(db: &SqlitePool, id: Uuid, scope: Scope) -> ApiResult<WorkoutDetail> {
    let workout = Lookup::classify(Workout::find(db, id).await?, scope).found("Workout")?;
    let sets = WorkoutSet::list_for_workout(db, workout.id).await?;
    Ok(WorkoutDetail { workout, sets })
}

pub async fn update(db: &SqlitePool, id: Uuid, scope: Scope, input: UpdateWorkout) -> ApiResult<WorkoutDetail> {
    let mut errors = Vec::new();
    if let Some(date) = input.date {
        check_date(date, today(), &mut errors);
    }
    check_note(input.note.as_deref(), &mut errors);
    into_result(errors)?;

    let mut tx = db.begin().await?;
    let current = Lookup::classify(Workout::find(&mut *tx, id).await?, scope).found("Workout")?;
    let date = input.date.unwrap_or(current.date);
    let note = input.note.or(current.note);
    let workout = Workout::update_tx(&mut tx, id, date, note.as_deref()).await?;
    let sets = WorkoutSet::list_for_workout(&mut *tx, id).await?;
    tx.commit().await?;

    info!(workout_id = %id, "workout updated");
    Ok(WorkoutDetail { workout, sets })
}

pub async fn delete(db: &SqlitePool, id: Uuid, scope: Scope) -> ApiResult<()> {
    let mut tx = db.begin().await?;
    Lookup::classify(Workout::find(&mut *tx, id).await?, scope).found("Workout")?;
    Workout::delete_tx(&mut tx, id).await?;
    tx.commit().await?;

    info!(workout_id = %id, "workout deleted");
    Ok(())
}

/// Appends a set after the workout's current last one.
pub async fn add_set(db: &SqlitePool, workout_id: Uuid, scope: Scope, input: SetInput) -> ApiResult<WorkoutSet> {
    let mut errors = Vec::new();
    check_set("set", &input, &mut errors);
    into_result(errors)?;

    let mut tx = db.begin().await?;
    let workout = Lookup::classify(Workout::find(&mut *tx, workout_id).await?, scope).found("Workout")?;
    check_exercises_owned(&mut tx, workout.user_id, &[("set".to_string(), input.exercise_id)]).await?;
    let position = WorkoutSet::next_position_tx(&mut tx, workout_id).await?;
    let set = WorkoutSet::insert_tx(
        &mut tx,
        workout_id,
        input.exercise_id,
        position,
        input.reps,
        input.weight_kg,
    )
    .await?;
    tx.commit().await?;

    info!(workout_id = %workout_id, set_id = %set.id, "set added");
    Ok(set)
}

pub async fn delete_set(db: &SqlitePool, workout_id: Uuid, set_id: Uuid, scope: Scope) -> ApiResult<()> {
    let mut tx = db.begin().await?;
    Lookup::classify(Workout::find(&mut *tx, workout_id).await?, scope).found("Workout")?;
    if WorkoutSet::find_in_workout_tx(&mut tx, workout_id, set_id).await?.is_none() {
        return Err(ApiError::NotFound("Set not found".into()));
    }
    WorkoutSet::delete_tx(&mut tx, set_id).await?;
    tx.commit().await?;

    info!(workout_id = %workout_id, set_id = %set_id, "set deleted");
    Ok(())
}

async fn with_sets(db: &SqlitePool, workouts: Vec<Workout>) -> ApiResult<Vec<WorkoutDetail>> {
    let ids: Vec<Uuid> = workouts.iter().map(|w| w.id).collect();
    let mut grouped = WorkoutSet::list_for_workouts(db, &ids).await?;
    Ok(workouts
        .into_iter()
        .map(|workout| {
            let sets = grouped.remove(&workout.id).unwrap_or_default();
            WorkoutDetail { workout, sets }
        })
        .collect())
}

pub async fn list_own(db: &SqlitePool, owner: Uuid, p: Pagination) -> ApiResult<Page<WorkoutDetail>> {
    let p = p.validate()?;
    let workouts = Workout::list_by_user(db, owner, p.limit, p.offset).await?;
    let total = Workout::count_by_user(db, owner).await?;
    Ok(Page::new(with_sets(db, workouts).await?, p, total))
}

pub async fn list_all(db: &SqlitePool, p: Pagination) -> ApiResult<Page<WorkoutDetail>> {
    let p = p.validate()?;
    let workouts = Workout::list_all(db, p.limit, p.offset).await?;
    let total = Workout::count_all(db).await?;
    Ok(Page::new(with_sets(db, workouts).await?, p, total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn set(reps: i64, weight_kg: f64) -> SetInput {
        SetInput {
            exercise_id: Uuid::new_v4(),
            reps,
            weight_kg,
        }
    }

    #[test]
    fn future_dates_are_rejected() {
        let today = date!(2024 - 03 - 10);
        let mut errors = Vec::new();
        check_date(date!(2024 - 03 - 10), today, &mut errors);
        check_date(date!(2020 - 01 - 01), today, &mut errors);
        assert!(errors.is_empty());
        check_date(date!(2024 - 03 - 11), today, &mut errors);
        assert_eq!(errors[0].field, "date");
    }

    #[test]
    fn note_length_is_bounded() {
        let mut errors = Vec::new();
        check_note(None, &mut errors);
        check_note(Some(&"n".repeat(500)), &mut errors);
        assert!(errors.is_empty());
        check_note(Some(&"n".repeat(501)), &mut errors);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn negative_reps_and_weight_are_rejected() {
        let mut errors = Vec::new();
        check_set("sets[0]", &set(0, 0.0), &mut errors);
        assert!(errors.is_empty());
        check_set("sets[1]", &set(-1, -2.5), &mut errors);
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, ["sets[1].reps", "sets[1].weight_kg"]);
    }

    #[test]
    fn non_finite_weight_is_rejected() {
        let mut errors = Vec::new();
        check_set("set", &set(5, f64::NAN), &mut errors);
        check_set("set", &set(5, f64::INFINITY), &mut errors);
        assert_eq!(errors.len(), 2);
    }
}
