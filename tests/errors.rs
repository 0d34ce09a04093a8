mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};

use common::TestApp;

#[tokio::test]
async fn health_needs_no_auth() {
    let app = TestApp::new().await;
    let r = app.send(Method::GET, "/health", None, None).await;
    assert_eq!(r.status, StatusCode::OK);
    assert_eq!(r.body["status"], "ok");
}

#[tokio::test]
async fn unknown_route_is_a_problem_document() {
    let app = TestApp::new().await;
    let r = app.send(Method::GET, "/nope", None, None).await;

    assert_eq!(r.status, StatusCode::NOT_FOUND);
    assert_eq!(r.headers[header::CONTENT_TYPE], "application/problem+json");
    assert_eq!(r.body["status"], 404);
    assert_eq!(r.body["title"], "Not Found");
    assert!(r.body["detail"].is_string());
    assert!(r.body["type"].as_str().unwrap().starts_with("https://"));
    assert!(r.headers.contains_key("x-correlation-id"));
    assert_eq!(r.body["correlation_id"], r.headers["x-correlation-id"].to_str().unwrap());
}

#[tokio::test]
async fn inbound_correlation_id_is_echoed() {
    let app = TestApp::new().await;
    let req = Request::builder()
        .uri("/api/v1/me")
        .header("x-correlation-id", "abc-123")
        .body(Body::empty())
        .unwrap();
    let r = app.send_request(req).await;

    assert_eq!(r.status, StatusCode::UNAUTHORIZED);
    assert_eq!(r.headers["x-correlation-id"], "abc-123");
    assert_eq!(r.body["correlation_id"], "abc-123");
    assert_eq!(r.body["detail"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn successful_responses_carry_a_correlation_id_too() {
    let app = TestApp::new().await;
    let r = app.send(Method::GET, "/health", None, None).await;
    assert!(r.headers.contains_key("x-correlation-id"));
}

#[tokio::test]
async fn wrong_method_is_a_problem_document() {
    let app = TestApp::new().await;
    let r = app.send(Method::GET, "/auth/login", None, None).await;
    assert_eq!(r.status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(r.headers[header::CONTENT_TYPE], "application/problem+json");
    assert_eq!(r.body["title"], "Method Not Allowed");
}

#[tokio::test]
async fn malformed_json_is_a_validation_error() {
    let app = TestApp::new().await;
    let req = Request::builder()
        .method(Method::POST)
        .uri("/auth/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let r = app.send_request(req).await;

    assert_eq!(r.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(r.headers[header::CONTENT_TYPE], "application/problem+json");
    assert_eq!(r.body["errors"][0]["field"], "body");
}

#[tokio::test]
async fn unparsable_path_id_is_a_validation_error() {
    let app = TestApp::new().await;
    let (token, _) = app.signup("path@example.com").await;
    let r = app.get("/api/v1/workouts/not-a-uuid", &token).await;
    assert_eq!(r.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(r.body["errors"][0]["field"], "path");
}
