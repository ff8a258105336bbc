//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::{Value, json};
use tower::ServiceExt;

use sessiongate_api::{AppState, build_app};
use sessiongate_auth::JwtVerifier;
use sessiongate_core::config::{AppConfig, StoreProvider};
use sessiongate_database::MemorySessionStore;

/// HS256 secret shared by the test verifier and token minting.
pub const SECRET: &str = "integration-test-secret-at-least-32-bytes";
/// Issuer expected on test tokens.
pub const ISSUER: &str = "https://issuer.sessiongate.test/";
/// Audience expected on test tokens.
pub const AUDIENCE: &str = "sessiongate-tests";

/// Chrome on Windows, as sent by a browser.
pub const CHROME_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Shared state, for direct access to the notifier
    pub state: AppState,
    /// The in-memory store behind the router
    pub store: MemorySessionStore,
}

/// Parsed test response
pub struct TestResponse {
    /// HTTP status
    pub status: StatusCode,
    /// JSON body, `Null` when empty
    pub body: Value,
}

/// Configuration used by every test app.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.database.provider = StoreProvider::Memory;
    config.auth.hs256_secret = Some(SECRET.to_string());
    config.auth.issuer = ISSUER.to_string();
    config.auth.audience = AUDIENCE.to_string();
    config
}

/// Mint a valid access token for `account`.
pub fn token_for(account: &str) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = json!({
        "sub": account,
        "iss": ISSUER,
        "aud": AUDIENCE,
        "iat": now,
        "exp": now + 3600,
    });
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .expect("Failed to mint token")
}

impl TestApp {
    /// Create a new test application with default settings
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    /// Create a test application from `config`
    pub fn with_config(config: AppConfig) -> Self {
        let store = MemorySessionStore::new();
        let verifier = JwtVerifier::new(&config.auth);
        let state = AppState::new(config, Arc::new(store.clone()), verifier);
        let router = build_app(state.clone());
        Self {
            router,
            state,
            store,
        }
    }

    /// Send a request through the router
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        self.request_with_headers(method, uri, token, body, &[]).await
    }

    /// Send a request with extra headers
    pub async fn request_with_headers(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Router failed");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        TestResponse { status, body }
    }

    /// `POST /api/session/register` for `account`
    pub async fn register(&self, account: &str, session_id: &str) -> TestResponse {
        self.request(
            "POST",
            "/api/session/register",
            Some(&token_for(account)),
            Some(json!({ "session_id": session_id, "device_info": format!("device {session_id}") })),
        )
        .await
    }

    /// `DELETE /api/session/{session_id}` for `account`
    pub async fn evict(&self, account: &str, session_id: &str) -> TestResponse {
        self.request(
            "DELETE",
            &format!("/api/session/{session_id}"),
            Some(&token_for(account)),
            None,
        )
        .await
    }

    /// `GET /api/session/status` for `account`
    pub async fn status(&self, account: &str, session_id: &str) -> String {
        let response = self
            .request(
                "GET",
                &format!("/api/session/status?session_id={session_id}"),
                Some(&token_for(account)),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::OK);
        response.body["status"].as_str().unwrap_or_default().to_string()
    }

    /// Session ids listed by `GET /api/sessions` for `account`
    pub async fn active_ids(&self, account: &str) -> Vec<String> {
        let response = self
            .request("GET", "/api/sessions", Some(&token_for(account)), None)
            .await;
        assert_eq!(response.status, StatusCode::OK);
        ids(&response.body)
    }
}

/// `session_id` of every element of a JSON array
pub fn ids(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|s| s["session_id"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
