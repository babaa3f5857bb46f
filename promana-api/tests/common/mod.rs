//! Shared helpers for router tests
//!
//! Each test gets its own router over an in-memory store, so tests run in
//! parallel without a database.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use promana_api::app::{build_router, AppState};
use promana_api::config::Config;
use promana_shared::store::MemoryStore;
use serde_json::{json, Value};
use tower::ServiceExt;

pub const TEST_SECRET: &str = "test-secret-key-at-least-32-bytes-long";
pub const TEST_PASSWORD: &str = "Secret123";

pub fn test_config() -> Config {
    Config::new("postgresql://unused", TEST_SECRET)
}

/// A signed-in test user
pub struct TestUser {
    pub id: String,
    pub access_token: String,
    pub refresh_token: String,
}

pub struct TestApp {
    pub app: Router,
    pub store: Arc<MemoryStore>,
}

impl TestApp {
    /// Router over a store with the standard roles
    pub fn new() -> Self {
        Self::with_store(MemoryStore::seeded())
    }

    pub fn with_store(store: MemoryStore) -> Self {
        let store = Arc::new(store);
        let app = build_router(AppState::new(store.clone(), test_config()));
        Self { app, store }
    }

    /// Sends a request and returns the status with the parsed JSON body
    ///
    /// Empty bodies come back as `Value::Null`.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, body)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }

    /// Registers `<name>@example.com` with username `<name>`
    pub async fn register(&self, name: &str) -> TestUser {
        let (status, body) = self
            .request(
                Method::POST,
                "/v1/auth/register",
                None,
                Some(json!({
                    "email": format!("{}@example.com", name),
                    "password": TEST_PASSWORD,
                    "full_name": name,
                    "username": name,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);

        TestUser {
            id: body["user"]["id"].as_str().unwrap().to_string(),
            access_token: body["access_token"].as_str().unwrap().to_string(),
            refresh_token: body["refresh_token"].as_str().unwrap().to_string(),
        }
    }

    /// Creates a project and returns its id
    pub async fn create_project(&self, user: &TestUser, name: &str) -> String {
        let (status, body) = self
            .post("/v1/projects", &user.access_token, json!({ "name": name }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "create project failed: {}", body);
        body["id"].as_str().unwrap().to_string()
    }
}
