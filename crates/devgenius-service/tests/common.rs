//! Common test utilities for devgenius integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;

use axum::Router;
use axum_test::TestServer;
use serde_json::{json, Value};
use tempfile::TempDir;

use devgenius_core::QuotaPolicy;
use devgenius_service::{create_router, AppState, ServiceConfig};
use devgenius_store::JsonFileStore;

pub const JWT_SECRET: &str = "test-jwt-secret";
pub const ADMIN_KEY: &str = "test-admin-key";
pub const WEBHOOK_SECRET: &str = "test-webhook-secret";
pub const PASSWORD: &str = "correct-horse-battery";

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// The store behind the server, for direct inspection.
    pub store: Arc<JsonFileStore>,
    /// Temporary directory for the data file (kept alive for test duration).
    pub _temp_dir: TempDir,
}

/// A registered user.
pub struct TestUser {
    pub id: String,
    pub email: String,
    pub token: String,
}

impl TestUser {
    /// The authorization header for this user.
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

impl TestHarness {
    /// Create a new test harness with a fresh data file.
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// Create a harness whose AI route talks to `base_url`.
    pub fn with_genai(base_url: &str) -> Self {
        let base_url = base_url.to_string();
        Self::with_config(move |config| {
            config.gemini_api_key = Some("test-gemini-key".into());
            config.gemini_base_url = base_url;
        })
    }

    /// Create a harness after adjusting the default test configuration.
    pub fn with_config(adjust: impl FnOnce(&mut ServiceConfig)) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let data_file = temp_dir.path().join("db.json");
        let store = Arc::new(JsonFileStore::open(&data_file).expect("Failed to open store"));

        let mut config = ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            data_file: data_file.to_string_lossy().to_string(),
            jwt_secret: JWT_SECRET.into(),
            admin_api_key: Some(ADMIN_KEY.into()),
            gemini_api_key: None,
            payment_webhook_secret: Some(WEBHOOK_SECRET.into()),
            quota: QuotaPolicy::default(),
            cors_origins: vec!["*".into()],
            ..ServiceConfig::default()
        };
        adjust(&mut config);

        let state = AppState::new(Arc::clone(&store), config);
        let router: Router = create_router(state);

        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            server,
            store,
            _temp_dir: temp_dir,
        }
    }

    /// Register a user and return their session.
    pub async fn register(&self, username: &str) -> TestUser {
        let email = format!("{username}@example.com");
        let response = self
            .server
            .post("/api/auth/register")
            .json(&json!({
                "username": username,
                "email": email,
                "password": PASSWORD
            }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);

        let body: Value = response.json();
        TestUser {
            id: body["user"]["id"].as_str().expect("user id").to_string(),
            email,
            token: body["token"].as_str().expect("token").to_string(),
        }
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
