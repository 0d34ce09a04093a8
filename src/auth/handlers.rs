use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{Credentials, LogoutResponse, PublicUser, RefreshRequest, TokenPair},
        extractors::{AuthUser, ClientKey},
        repo_types::Role,
        services,
    },
    error::{ApiError, ApiResult},
    extract::AppJson,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/logout", post(logout))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<Credentials>,
) -> ApiResult<(StatusCode, Json<PublicUser>)> {
    let user = services::register(&state.db, &state.hasher, &payload, Role::User).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// The limiter is consulted before anything about the payload is checked.
#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    ClientKey(client): ClientKey,
    AppJson(payload): AppJson<Credentials>,
) -> ApiResult<Json<TokenPair>> {
    if !state.login_limiter.allow(&client) {
        warn!(%client, "login throttled");
        return Err(ApiError::RateLimited);
    }
    let pair = services::login(&state.db, &state.hasher, &state.tokens, &payload).await?;
    Ok(Json(pair))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RefreshRequest>,
) -> ApiResult<Json<TokenPair>> {
    let pair = services::refresh(&state.db, &state.tokens, &payload.refresh_token).await?;
    Ok(Json(pair))
}

/// Tokens are stateless; the client discards them.
#[instrument]
pub async fn logout() -> Json<LogoutResponse> {
    info!("logout acknowledged");
    Json(LogoutResponse { detail: "logged out" })
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn get_me(AuthUser(user): AuthUser) -> Json<PublicUser> {
    Json(user.into())
}
