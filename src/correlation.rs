//! Per-request correlation id.
//!
//! Taken from the inbound `X-Correlation-ID` header or generated, kept in a
//! task-local for the lifetime of the request so error rendering can embed it,
//! and echoed back on the response.

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

pub const CORRELATION_ID_HEADER: HeaderName = HeaderName::from_static("x-correlation-id");

/// Request extension so handlers and the trace span can read the id.
#[derive(Debug, Clone)]
pub struct CorrelationId(pub String);

tokio::task_local! {
    static CORRELATION_ID: String;
}

/// Correlation id of the request currently being handled, if any.
pub fn current() -> Option<String> {
    CORRELATION_ID.try_with(|id| id.clone()).ok()
}

pub async fn correlation_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get(&CORRELATION_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty() && v.len() <= 128)
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    req.extensions_mut().insert(CorrelationId(id.clone()));
    let mut resp = CORRELATION_ID
        .scope(id.clone(), async move { next.run(req).await })
        .await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        resp.headers_mut().insert(CORRELATION_ID_HEADER, value);
    }
    resp
}
