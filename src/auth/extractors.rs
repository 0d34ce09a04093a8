use std::net::SocketAddr;

use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use sqlx::SqlitePool;
use tracing::warn;

use super::{
    jwt::{TokenKind, TokenService},
    rate_limit::UNKNOWN_CLIENT,
    repo_types::User,
};
use crate::{error::ApiError, ownership::Scope, state::AppState};

/// Why a request failed authentication. Only logged; the client always sees
/// one of a few generic messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    MissingHeader,
    BadScheme,
    Expired,
    Malformed,
    WrongType,
    UnknownSubject,
}

impl AuthFailure {
    fn client_message(self) -> &'static str {
        match self {
            AuthFailure::MissingHeader => "Missing Authorization header",
            AuthFailure::BadScheme => "Invalid authorization scheme; expected Bearer",
            AuthFailure::Expired | AuthFailure::Malformed => "Invalid or expired token",
            AuthFailure::WrongType => "Invalid token type",
            AuthFailure::UnknownSubject => "User not found",
        }
    }
}

impl From<AuthFailure> for ApiError {
    fn from(f: AuthFailure) -> Self {
        ApiError::Unauthenticated(f.client_message().into())
    }
}

/// Pull the bearer credential out of the headers. The scheme is matched
/// case-insensitively.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthFailure> {
    let raw = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(AuthFailure::MissingHeader)?;

    let (scheme, token) = raw.split_once(' ').ok_or(AuthFailure::BadScheme)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthFailure::BadScheme);
    }
    let token = token.trim();
    if token.is_empty() {
        return Err(AuthFailure::Malformed);
    }
    Ok(token)
}

/// Full resolution: header, signature/expiry, token type, then a live identity.
pub async fn resolve_identity(
    headers: &HeaderMap,
    tokens: &TokenService,
    db: &SqlitePool,
) -> Result<User, ApiError> {
    let token = bearer_token(headers).map_err(|f| {
        warn!(reason = ?f, "auth rejected");
        f
    })?;

    let claims = tokens.validate(token).map_err(|e| {
        let reason = match e {
            super::jwt::TokenError::Expired => AuthFailure::Expired,
            _ => AuthFailure::Malformed,
        };
        warn!(reason = ?reason, "auth rejected");
        reason
    })?;

    let claims = claims.require_kind(TokenKind::Access).map_err(|e| {
        warn!(error = %e, "auth rejected");
        AuthFailure::WrongType
    })?;

    match User::find_by_id(db, claims.sub).await? {
        Some(user) => Ok(user),
        None => {
            warn!(user_id = %claims.sub, reason = ?AuthFailure::UnknownSubject, "auth rejected");
            Err(AuthFailure::UnknownSubject.into())
        }
    }
}

/// The authenticated identity behind a resource request.
pub struct AuthUser(pub User);

impl AuthUser {
    pub fn scope(&self) -> Scope {
        Scope::Owner(self.0.id)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        resolve_identity(&parts.headers, &state.tokens, &state.db)
            .await
            .map(AuthUser)
    }
}

/// An authenticated identity with the admin role; 403 otherwise.
pub struct AdminUser(pub User);

impl AdminUser {
    pub fn scope(&self) -> Scope {
        Scope::Admin
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            warn!(user_id = %user.id, "admin route denied");
            return Err(ApiError::AccessDenied("Admin access required".into()));
        }
        Ok(AdminUser(user))
    }
}

/// Rate-limit key: the peer IP, or a shared sentinel when unavailable.
pub struct ClientKey(pub String);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for ClientKey {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let key = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string())
            .unwrap_or_else(|| UNKNOWN_CLIENT.to_string());
        Ok(ClientKey(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        h
    }

    #[test]
    fn missing_header() {
        assert_eq!(bearer_token(&HeaderMap::new()), Err(AuthFailure::MissingHeader));
    }

    #[test]
    fn scheme_is_case_insensitive() {
        assert_eq!(bearer_token(&headers("Bearer abc")), Ok("abc"));
        assert_eq!(bearer_token(&headers("bearer abc")), Ok("abc"));
        assert_eq!(bearer_token(&headers("BEARER abc")), Ok("abc"));
    }

    #[test]
    fn other_schemes_are_rejected() {
        assert_eq!(bearer_token(&headers("Basic dXNlcjpwYXNz")), Err(AuthFailure::BadScheme));
        assert_eq!(bearer_token(&headers("abc")), Err(AuthFailure::BadScheme));
    }

    #[test]
    fn expired_and_malformed_look_the_same_to_clients() {
        assert_eq!(
            AuthFailure::Expired.client_message(),
            AuthFailure::Malformed.client_message()
        );
    }
}
