//! Common test utilities for router-level tests
//!
//! The app is wired to an in-memory store, so these tests need neither a
//! database nor any environment variables.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use todoapp_api::{
    app::{build_router, AppState},
    config::{ApiConfig, Config, DatabaseConfig, JwtConfig},
};
use todoapp_shared::store::MemoryStore;
use tower::Service as _;

pub const TEST_SECRET: &str = "integration-test-secret-at-least-32-bytes";

/// Test context: the router plus a handle on its store
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub app: Router,
    pub config: Config,
}

/// A registered user and their token
pub struct TestUser {
    pub id: i64,
    pub email: String,
    pub token: String,
}

impl TestUser {
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

/// Decoded response
pub struct TestResponse {
    pub status: StatusCode,
    pub text: String,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.text)
            .unwrap_or_else(|e| panic!("Body is not JSON ({}): {}", e, self.text))
    }

    pub fn message(&self) -> String {
        self.json()["message"].as_str().unwrap_or_default().to_string()
    }
}

pub fn test_config() -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: Vec::new(),
            production: false,
        },
        database: DatabaseConfig {
            url: "postgresql://unused".to_string(),
            max_connections: 1,
            run_migrations: false,
        },
        jwt: JwtConfig {
            secret: TEST_SECRET.to_string(),
        },
    }
}

impl TestContext {
    pub fn new() -> Self {
        let config = test_config();
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(config.clone(), store.clone(), store.clone())
            .expect("Failed to build app state");

        Self {
            store,
            app: build_router(state),
            config,
        }
    }

    /// Sends a request; `body` is serialized as JSON when present
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        authorization: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        self.send_request(builder.body(body).unwrap()).await
    }

    pub async fn send_request(&self, request: Request<Body>) -> TestResponse {
        let response = self.app.clone().call(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        TestResponse {
            status,
            text: String::from_utf8_lossy(&bytes).to_string(),
        }
    }

    /// Registers a user and returns their id and token
    pub async fn register(&self, email: &str, password: &str) -> TestUser {
        let response = self
            .send(
                Method::POST,
                "/api/users/register",
                None,
                Some(json!({
                    "nom": "Dupont",
                    "prenom": "Jean",
                    "email": email,
                    "password": password,
                })),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.text);

        let body = response.json();
        TestUser {
            id: body["user"]["id"].as_i64().unwrap(),
            email: email.to_string(),
            token: body["token"].as_str().unwrap().to_string(),
        }
    }

    /// Creates a task for `user` and returns its id
    pub async fn create_task(&self, user: &TestUser, title: &str) -> i64 {
        let response = self
            .send(
                Method::POST,
                "/api/tasks",
                Some(&user.bearer()),
                Some(json!({ "title": title })),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.text);

        response.json()["task"]["id"].as_i64().unwrap()
    }
}
