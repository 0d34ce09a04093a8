use axum::{extract::State, routing::get, Json, Router};
use tracing::instrument;

use super::repo::{self, UserStats};
use crate::{auth::extractors::AuthUser, error::ApiResult, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new().route("/stats", get(get_stats))
}

#[instrument(skip(state, user), fields(user_id = %user.0.id))]
pub async fn get_stats(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<UserStats>> {
    let stats = repo::for_user(&state.db, user.0.id).await?;
    Ok(Json(stats))
}
