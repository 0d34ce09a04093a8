use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::{
    dto::{CreateWorkout, SetInput, SetOut, UpdateWorkout, WorkoutOut},
    services,
};
use crate::{
    auth::extractors::{AdminUser, AuthUser},
    error::ApiResult,
    extract::{AppJson, AppPath, AppQuery},
    pagination::{Page, Pagination},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/workouts", post(create_workout).get(list_workouts))
        .route("/workouts/admin/all", get(admin_list_workouts))
        .route("/workouts/admin/:id", get(admin_get_workout))
        .route(
            "/workouts/:id",
            get(get_workout).patch(update_workout).delete(delete_workout),
        )
        .route("/workouts/:id/sets", post(add_set))
        .route("/workouts/:id/sets/:set_id", delete(delete_set))
}

#[instrument(skip(state, user, payload), fields(user_id = %user.0.id))]
pub async fn create_workout(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<CreateWorkout>,
) -> ApiResult<(StatusCode, Json<WorkoutOut>)> {
    let detail = services::create(&state.db, user.0.id, payload).await?;
    Ok((StatusCode::CREATED, Json(detail.into())))
}

#[instrument(skip(state, user), fields(user_id = %user.0.id))]
pub async fn list_workouts(
    State(state): State<AppState>,
    user: AuthUser,
    AppQuery(p): AppQuery<Pagination>,
) -> ApiResult<Json<Page<WorkoutOut>>> {
    let page = services::list_own(&state.db, user.0.id, p).await?;
    Ok(Json(page.map(WorkoutOut::from)))
}

#[instrument(skip(state, user), fields(user_id = %user.0.id))]
pub async fn get_workout(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<Json<WorkoutOut>> {
    let detail = services::get(&state.db, id, user.scope()).await?;
    Ok(Json(detail.into()))
}

#[instrument(skip(state, user, payload), fields(user_id = %user.0.id))]
pub async fn update_workout(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateWorkout>,
) -> ApiResult<Json<WorkoutOut>> {
    let detail = services::update(&state.db, id, user.scope(), payload).await?;
    Ok(Json(detail.into()))
}

#[instrument(skip(state, user), fields(user_id = %user.0.id))]
pub async fn delete_workout(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<StatusCode> {
    services::delete(&state.db, id, user.scope()).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, user, payload), fields(user_id = %user.0.id))]
pub async fn add_set(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<SetInput>,
) -> ApiResult<(StatusCode, Json<SetOut>)> {
    let set = services::add_set(&state.db, id, user.scope(), payload).await?;
    Ok((StatusCode::CREATED, Json(set.into())))
}

#[instrument(skip(state, user), fields(user_id = %user.0.id))]
pub async fn delete_set(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath((id, set_id)): AppPath<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    services::delete_set(&state.db, id, set_id, user.scope()).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, admin), fields(admin_id = %admin.0.id))]
pub async fn admin_list_workouts(
    State(state): State<AppState>,
    admin: AdminUser,
    AppQuery(p): AppQuery<Pagination>,
) -> ApiResult<Json<Page<WorkoutOut>>> {
    let page = services::list_all(&state.db, p).await?;
    Ok(Json(page.map(WorkoutOut::from)))
}

#[instrument(skip(state, admin), fields(admin_id = %admin.0.id))]
pub async fn admin_get_workout(
    State(state): State<AppState>,
    admin: AdminUser,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<Json<WorkoutOut>> {
    let detail = services::get(&state.db, id, admin.scope()).await?;
    Ok(Json(detail.into()))
}
