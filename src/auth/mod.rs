use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod extractors;
pub mod handlers;
pub mod jwt;
pub mod password;
pub mod rate_limit;
pub mod repo;
pub mod repo_types;
pub mod services;

/// Public token endpoints, mounted at the root.
pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}

/// Routes that need an access token, mounted under `/api/v1`.
pub fn protected_router() -> Router<AppState> {
    handlers::me_routes()
}
