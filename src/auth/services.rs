use lazy_static::lazy_static;
use regex::Regex;
use sqlx::SqlitePool;
use tracing::{info, warn};

use super::{
    dto::{Credentials, TokenPair},
    jwt::{TokenError, TokenService},
    password::CredentialHasher,
    repo_types::{Role, User},
};
use crate::error::{ApiError, ApiResult, FieldError};

const MAX_EMAIL_LEN: usize = 255;
const MIN_PASSWORD_LEN: usize = 8;
const MAX_PASSWORD_LEN: usize = 256;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    email.len() <= MAX_EMAIL_LEN && EMAIL_RE.is_match(email)
}

pub(crate) fn validate_credentials(c: &Credentials) -> ApiResult<()> {
    let mut errors = Vec::new();
    if !is_valid_email(&c.email) {
        errors.push(FieldError::new("email", "value is not a valid email address"));
    }
    let len = c.password.chars().count();
    if !(MIN_PASSWORD_LEN..=MAX_PASSWORD_LEN).contains(&len) {
        errors.push(FieldError::new(
            "password",
            format!("must be between {MIN_PASSWORD_LEN} and {MAX_PASSWORD_LEN} characters"),
        ));
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors))
    }
}

impl From<TokenError> for ApiError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Signing => ApiError::Internal(anyhow::anyhow!(e)),
            TokenError::WrongKind { .. } => ApiError::Unauthenticated("Invalid token type".into()),
            TokenError::Expired | TokenError::Malformed => {
                ApiError::Unauthenticated("Invalid or expired token".into())
            }
        }
    }
}

pub async fn register(
    db: &SqlitePool,
    hasher: &CredentialHasher,
    creds: &Credentials,
    role: Role,
) -> ApiResult<User> {
    validate_credentials(creds)?;

    if User::find_by_email(db, &creds.email).await?.is_some() {
        warn!(email = %creds.email, "email already registered");
        return Err(ApiError::BadRequest("Email already registered".into()));
    }

    let hash = hasher.digest(&creds.password)?;
    // The unique index still guards against a concurrent registration.
    let user = User::create(db, &creds.email, &hash, role)
        .await
        .map_err(|e| match ApiError::from(e) {
            ApiError::BadRequest(_) => ApiError::BadRequest("Email already registered".into()),
            other => other,
        })?;

    info!(user_id = %user.id, role = ?user.role, "user registered");
    Ok(user)
}

/// Unknown email and wrong password are indistinguishable to the caller.
pub async fn login(
    db: &SqlitePool,
    hasher: &CredentialHasher,
    tokens: &TokenService,
    creds: &Credentials,
) -> ApiResult<TokenPair> {
    validate_credentials(creds)?;

    let user = match User::find_by_email(db, &creds.email).await? {
        Some(u) => u,
        None => {
            warn!("login unknown email");
            // Spend a hash's worth of time so the miss is not observable.
            let _ = hasher.digest(&creds.password);
            return Err(invalid_credentials());
        }
    };

    if !hasher.verify(&creds.password, &user.password_hash) {
        warn!(user_id = %user.id, "login invalid password");
        return Err(invalid_credentials());
    }

    let pair = tokens.issue_pair(user.id)?;
    info!(user_id = %user.id, "user logged in");
    Ok(TokenPair::bearer(pair.access, pair.refresh))
}

/// Rotates both tokens. The presented refresh token stays valid until its
/// own expiry; there is no revocation store.
pub async fn refresh(db: &SqlitePool, tokens: &TokenService, refresh_token: &str) -> ApiResult<TokenPair> {
    let claims = tokens.validate_refresh(refresh_token).map_err(|e| {
        warn!(error = %e, "refresh rejected");
        e
    })?;

    if User::find_by_id(db, claims.sub).await?.is_none() {
        warn!(user_id = %claims.sub, "refresh for unknown user");
        return Err(ApiError::Unauthenticated("User not found".into()));
    }

    let pair = tokens.issue_pair(claims.sub)?;
    info!(user_id = %claims.sub, "tokens refreshed");
    Ok(TokenPair::bearer(pair.access, pair.refresh))
}

/// Create the configured admin unless the email is already taken.
pub async fn bootstrap_admin(
    db: &SqlitePool,
    hasher: &CredentialHasher,
    creds: &Credentials,
) -> ApiResult<()> {
    if let Some(existing) = User::find_by_email(db, &creds.email).await? {
        if existing.role != Role::Admin {
            warn!(user_id = %existing.id, "bootstrap admin email belongs to a regular user; leaving it alone");
        }
        return Ok(());
    }
    register(db, hasher, creds, Role::Admin).await?;
    Ok(())
}

fn invalid_credentials() -> ApiError {
    ApiError::Unauthenticated("Invalid credentials".into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds(email: &str, password: &str) -> Credentials {
        Credentials {
            email: email.into(),
            password: password.into(),
        }
    }

    #[test]
    fn email_pattern() {
        assert!(is_valid_email("user@example.com"));
        assert!(!is_valid_email("invalid-email"));
        assert!(!is_valid_email("a b@example.com"));
        assert!(!is_valid_email(&format!("{}@example.com", "a".repeat(300))));
    }

    #[test]
    fn credentials_validation_reports_every_field() {
        match validate_credentials(&creds("invalid-email", "123")).unwrap_err() {
            ApiError::Validation(fields) => {
                let names: Vec<_> = fields.iter().map(|f| f.field.as_str()).collect();
                assert_eq!(names, ["email", "password"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(validate_credentials(&creds("ok@example.com", "password123")).is_ok());
        assert!(validate_credentials(&creds("ok@example.com", &"x".repeat(257))).is_err());
    }

    #[test]
    fn token_errors_map_to_401() {
        use axum::http::StatusCode;
        assert_eq!(ApiError::from(TokenError::Expired).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::from(TokenError::Malformed).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::from(TokenError::Signing).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
