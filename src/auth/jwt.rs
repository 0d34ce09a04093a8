use axum::extract::FromRef;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::{config::JwtConfig, state::AppState};

/// Type of JWT: access or refresh.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid, // identity id
    #[serde(rename = "type")]
    pub kind: TokenKind,
    pub iat: i64, // issued at (unix seconds)
    pub exp: i64, // expires at (unix seconds)
    pub iss: String,
    pub aud: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,
    #[error("token is malformed or has a bad signature")]
    Malformed,
    #[error("expected a {expected:?} token, got {actual:?}")]
    WrongKind {
        expected: TokenKind,
        actual: TokenKind,
    },
    #[error("token signing failed")]
    Signing,
}

impl Claims {
    /// Second stage of validation: signature and expiry are already checked,
    /// this pins the token to one use.
    pub fn require_kind(self, expected: TokenKind) -> Result<Self, TokenError> {
        if self.kind == expected {
            Ok(self)
        } else {
            Err(TokenError::WrongKind {
                expected,
                actual: self.kind,
            })
        }
    }
}

/// Freshly minted access and refresh tokens for one subject.
#[derive(Debug, Clone)]
pub struct IssuedPair {
    pub access: String,
    pub refresh: String,
}

/// Signs and validates stateless bearer tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    algorithm: Algorithm,
    issuer: String,
    audience: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl FromRef<AppState> for TokenService {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}

impl TokenService {
    pub fn new(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            algorithm: cfg.algorithm,
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            access_ttl: Duration::minutes(cfg.access_ttl_minutes),
            refresh_ttl: Duration::days(cfg.refresh_ttl_days),
        }
    }

    pub(crate) fn mint(
        &self,
        subject: Uuid,
        kind: TokenKind,
        now: OffsetDateTime,
    ) -> Result<String, TokenError> {
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };
        let claims = Claims {
            sub: subject,
            kind,
            iat: now.unix_timestamp(),
            exp: (now + ttl).unix_timestamp(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::new(self.algorithm), &claims, &self.encoding)
            .map_err(|_| TokenError::Signing)?;
        debug!(user_id = %subject, kind = ?kind, "jwt signed");
        Ok(token)
    }

    pub fn issue_access(&self, subject: Uuid) -> Result<String, TokenError> {
        self.mint(subject, TokenKind::Access, OffsetDateTime::now_utc())
    }

    pub fn issue_refresh(&self, subject: Uuid) -> Result<String, TokenError> {
        self.mint(subject, TokenKind::Refresh, OffsetDateTime::now_utc())
    }

    pub fn issue_pair(&self, subject: Uuid) -> Result<IssuedPair, TokenError> {
        Ok(IssuedPair {
            access: self.issue_access(subject)?,
            refresh: self.issue_refresh(subject)?,
        })
    }

    /// First stage: signature, structure, issuer/audience and expiry.
    /// Does not look at the token type.
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);

        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            }
        })?;
        debug!(user_id = %data.claims.sub, kind = ?data.claims.kind, "jwt verified");
        Ok(data.claims)
    }

    /// Refresh endpoint check: a valid token of the refresh type.
    pub fn validate_refresh(&self, token: &str) -> Result<Claims, TokenError> {
        self.validate(token)?.require_kind(TokenKind::Refresh)
    }
}
