//! The single boundary where domain failures become HTTP responses.
//!
//! Every response body is a problem document:
//! `{type, title, status, detail, correlation_id}`. Domain failures carry a
//! structured `detail` (`{code, message, details}`) so clients can branch on
//! `code`; framework-level failures carry a plain string.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use crate::correlation;

const INTERNAL_DETAIL: &str = "An unexpected error occurred. Please contact support.";

/// One rejected input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("access denied: {0}")]
    AccessDenied(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("too many login attempts")]
    RateLimited,

    #[error("validation failed on {} field(s)", .0.len())]
    Validation(Vec<FieldError>),

    #[error("route not found")]
    RouteNotFound,

    #[error("method not allowed")]
    MethodNotAllowed,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::AccessDenied(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) | ApiError::RouteNotFound => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code for domain failures.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            ApiError::Unauthenticated(_) => Some("UNAUTHORIZED"),
            ApiError::AccessDenied(_) => Some("FORBIDDEN"),
            ApiError::NotFound(_) => Some("NOT_FOUND"),
            ApiError::BadRequest(_) => Some("BAD_REQUEST"),
            ApiError::RateLimited => Some("RATE_LIMITED"),
            _ => None,
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::Validation(vec![FieldError::new(field, message)])
    }

    fn slug(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation-error",
            ApiError::Unauthenticated(_) => "unauthorized",
            ApiError::AccessDenied(_) => "forbidden",
            ApiError::NotFound(_) | ApiError::RouteNotFound => "not-found",
            ApiError::BadRequest(_) => "bad-request",
            ApiError::RateLimited => "too-many-requests",
            ApiError::MethodNotAllowed => "method-not-allowed",
            ApiError::Internal(_) => "internal-server-error",
        }
    }
}

pub fn title_for(status: StatusCode) -> &'static str {
    match status {
        StatusCode::BAD_REQUEST => "Bad Request",
        StatusCode::UNAUTHORIZED => "Unauthorized",
        StatusCode::FORBIDDEN => "Forbidden",
        StatusCode::NOT_FOUND => "Not Found",
        StatusCode::METHOD_NOT_ALLOWED => "Method Not Allowed",
        StatusCode::UNPROCESSABLE_ENTITY => "Input validation error",
        StatusCode::TOO_MANY_REQUESTS => "Too Many Requests",
        StatusCode::INTERNAL_SERVER_ERROR => "Internal Server Error",
        _ => "Error",
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Detail {
    Text(String),
    Domain {
        code: &'static str,
        message: String,
        details: serde_json::Map<String, serde_json::Value>,
    },
}

#[derive(Debug, Serialize)]
struct Problem {
    #[serde(rename = "type")]
    kind: String,
    title: &'static str,
    status: u16,
    detail: Detail,
    correlation_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<FieldError>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let correlation_id = correlation::current().unwrap_or_else(|| "-".into());
        let kind = format!("https://example.com/problems/{}", self.slug());
        let code = self.code();

        let (detail, errors) = match self {
            ApiError::Unauthenticated(message)
            | ApiError::AccessDenied(message)
            | ApiError::NotFound(message)
            | ApiError::BadRequest(message) => (domain(code, message), None),
            ApiError::RateLimited => (
                domain(code, "Too many login attempts, try again later".into()),
                None,
            ),
            ApiError::Validation(fields) => {
                warn!(%correlation_id, fields = fields.len(), "validation failed");
                (
                    Detail::Text("Request payload failed validation".into()),
                    Some(fields),
                )
            }
            ApiError::RouteNotFound => (Detail::Text("No such route".into()), None),
            ApiError::MethodNotAllowed => {
                (Detail::Text("Method not allowed for this route".into()), None)
            }
            ApiError::Internal(e) => {
                error!(%correlation_id, error = ?e, "unhandled error");
                (Detail::Text(INTERNAL_DETAIL.into()), None)
            }
        };

        let problem = Problem {
            kind,
            title: title_for(status),
            status: status.as_u16(),
            detail,
            correlation_id,
            errors,
        };

        let mut resp = (status, Json(problem)).into_response();
        resp.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/problem+json"),
        );
        resp
    }
}

fn domain(code: Option<&'static str>, message: String) -> Detail {
    Detail::Domain {
        code: code.unwrap_or("ERROR"),
        message,
        details: serde_json::Map::new(),
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db) = e.as_database_error() {
            if db.is_unique_violation() {
                return ApiError::BadRequest("Resource already exists".into());
            }
            if db.is_foreign_key_violation() {
                return ApiError::BadRequest("Resource is referenced by other records".into());
            }
        }
        ApiError::Internal(anyhow::Error::new(e).context("database error"))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation("body", rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::validation("path", rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::validation("query", rejection.body_text())
    }
}

/// Fallback for unknown routes.
pub async fn route_not_found() -> ApiError {
    ApiError::RouteNotFound
}

/// Axum answers a wrong method with a bare 405; give it the problem shape.
pub async fn problem_for_bare_405(resp: Response) -> Response {
    if resp.status() == StatusCode::METHOD_NOT_ALLOWED
        && !resp.headers().contains_key(header::CONTENT_TYPE)
    {
        return ApiError::MethodNotAllowed.into_response();
    }
    resp
}
