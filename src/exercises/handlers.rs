use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::{
    dto::{ExerciseInput, ExerciseOut},
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
        .route("/exercises", post(create_exercise).get(list_exercises))
        .route("/exercises/admin/all", get(admin_list_exercises))
        .route("/exercises/admin/:id", get(admin_get_exercise))
        .route(
            "/exercises/:id",
            get(get_exercise).patch(update_exercise).delete(delete_exercise),
        )
}

#[instrument(skip(state, user, payload), fields(user_id = %user.0.id))]
pub async fn create_exercise(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<ExerciseInput>,
) -> ApiResult<(StatusCode, Json<ExerciseOut>)> {
    let exercise = services::create(&state.db, user.0.id, &payload.name).await?;
    Ok((StatusCode::CREATED, Json(exercise.into())))
}

#[instrument(skip(state, user), fields(user_id = %user.0.id))]
pub async fn list_exercises(
    State(state): State<AppState>,
    user: AuthUser,
    AppQuery(p): AppQuery<Pagination>,
) -> ApiResult<Json<Page<ExerciseOut>>> {
    let page = services::list_own(&state.db, user.0.id, p).await?;
    Ok(Json(page.map(ExerciseOut::from)))
}

#[instrument(skip(state, user), fields(user_id = %user.0.id))]
pub async fn get_exercise(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<Json<ExerciseOut>> {
    let exercise = services::get(&state.db, id, user.scope()).await?;
    Ok(Json(exercise.into()))
}

#[instrument(skip(state, user, payload), fields(user_id = %user.0.id))]
pub async fn update_exercise(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<ExerciseInput>,
) -> ApiResult<Json<ExerciseOut>> {
    let exercise = services::rename(&state.db, id, user.scope(), &payload.name).await?;
    Ok(Json(exercise.into()))
}

#[instrument(skip(state, user), fields(user_id = %user.0.id))]
pub async fn delete_exercise(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<StatusCode> {
    services::delete(&state.db, id, user.scope()).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, admin), fields(admin_id = %admin.0.id))]
pub async fn admin_list_exercises(
    State(state): State<AppState>,
    admin: AdminUser,
    AppQuery(p): AppQuery<Pagination>,
) -> ApiResult<Json<Page<ExerciseOut>>> {
    let page = services::list_all(&state.db, p).await?;
    Ok(Json(page.map(ExerciseOut::from)))
}

#[instrument(skip(state, admin), fields(admin_id = %admin.0.id))]
pub async fn admin_get_exercise(
    State(state): State<AppState>,
    admin: AdminUser,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<Json<ExerciseOut>> {
    let exercise = services::get(&state.db, id, admin.scope()).await?;
    Ok(Json(exercise.into()))
}
