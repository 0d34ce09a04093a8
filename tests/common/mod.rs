#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use jsonwebtoken::Algorithm;
use serde_json::{json, Value};
use tower::ServiceExt;

use workout_log::{
    app::build_app,
    auth::{
        dto::Credentials, password::CredentialHasher, rate_limit::LoginRateLimiter,
        services::bootstrap_admin,
    },
    config::{AppConfig, JwtConfig},
    db,
    state::AppState,
};

pub const PASSWORD: &str = "password123";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

pub struct Reply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

fn test_config() -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".into(),
        jwt: JwtConfig {
            secret: "test-secret".into(),
            algorithm: Algorithm::HS256,
            issuer: "workout-log".into(),
            audience: "workout-log-users".into(),
            access_ttl_minutes: 15,
            refresh_ttl_days: 7,
        },
        password_pepper: "test-pepper".into(),
        cors_allow_origins: vec!["*".into()],
        host: "127.0.0.1".into(),
        port: 0,
        bootstrap_admin: None,
    }
}

impl TestApp {
    pub async fn new() -> Self {
        let config = test_config();
        let pool = db::connect(&config.database_url).await.expect("in-memory db");
        let state = AppState::from_parts(
            pool,
            config,
            CredentialHasher::fast("test-pepper"),
            LoginRateLimiter::default(),
        );
        Self {
            router: build_app(state.clone()),
            state,
        }
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Reply {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(t) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {t}"));
        }
        let req = match body {
            Some(v) => req
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&v).unwrap())),
            None => req.body(Body::empty()),
        }
        .unwrap();
        self.send_request(req).await
    }

    pub async fn send_request(&self, req: Request<Body>) -> Reply {
        let resp = self.router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
        };
        Reply { status, headers, body }
    }

    pub async fn get(&self, uri: &str, token: &str) -> Reply {
        self.send(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> Reply {
        self.send(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: &str, body: Value) -> Reply {
        self.send(Method::PATCH, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> Reply {
        self.send(Method::DELETE, uri, Some(token), None).await
    }

    pub async fn register(&self, email: &str, password: &str) -> Reply {
        self.send(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({ "email": email, "password": password })),
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> Reply {
        self.send(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "email": email, "password": password })),
        )
        .await
    }

    /// Register and log in; returns (access, refresh).
    pub async fn signup(&self, email: &str) -> (String, String) {
        let reg = self.register(email, PASSWORD).await;
        assert_eq!(reg.status, StatusCode::CREATED, "register {email}: {}", reg.body);
        let login = self.login(email, PASSWORD).await;
        assert_eq!(login.status, StatusCode::OK, "login {email}: {}", login.body);
        (
            login.body["access_token"].as_str().unwrap().to_string(),
            login.body["refresh_token"].as_str().unwrap().to_string(),
        )
    }

    /// Create an admin directly and return its access token.
    pub async fn admin(&self, email: &str) -> String {
        let creds = Credentials {
            email: email.into(),
            password: PASSWORD.into(),
        };
        bootstrap_admin(&self.state.db, &self.state.hasher, &creds)
            .await
            .unwrap();
        let login = self.login(email, PASSWORD).await;
        assert_eq!(login.status, StatusCode::OK);
        login.body["access_token"].as_str().unwrap().to_string()
    }

    pub async fn exercise(&self, token: &str, name: &str) -> String {
        let r = self.post("/api/v1/exercises", token, json!({ "name": name })).await;
        assert_eq!(r.status, StatusCode::CREATED, "{}", r.body);
        r.body["id"].as_str().unwrap().to_string()
    }
}
