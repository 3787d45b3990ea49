//! Shared harness: a portal pointed at a wiremock backend.
#![allow(dead_code)]

use key_portal::config::ApiSettings;
use key_portal::session::{CredentialStorage, MemoryStorage, SessionStore};
use key_portal::Portal;
use reqwest::Client;
use secrecy::Secret;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use wiremock::MockServer;

pub const TEST_USERNAME: &str = "admin";
pub const TEST_PASSWORD: &str = "s3cret";
/// base64("admin:s3cret")
pub const TEST_AUTH_HEADER: &str = "Basic YWRtaW46czNjcmV0";

/// Memory storage that counts how often the session is cleared.
#[derive(Default)]
pub struct CountingStorage {
    inner: MemoryStorage,
    clears: AtomicUsize,
}

impl CountingStorage {
    pub fn clears(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }
}

impl CredentialStorage for CountingStorage {
    fn load(&self) -> Option<Secret<String>> {
        self.inner.load()
    }

    fn store(&self, credentials: Secret<String>) {
        self.inner.store(credentials);
    }

    fn clear(&self) {
        self.clears.fetch_add(1, Ordering::SeqCst);
        self.inner.clear();
    }
}

pub struct TestPortal {
    pub server: MockServer,
    pub portal: Portal,
    pub storage: Arc<CountingStorage>,
}

impl TestPortal {
    pub async fn spawn() -> Self {
        let server = MockServer::start().await;
        Self::with_base_url(server.uri(), server)
    }

    /// Portal whose base URL refuses connections; `server` stays unused.
    pub async fn unreachable() -> Self {
        let server = MockServer::start().await;
        Self::with_base_url("http://127.0.0.1:1".to_string(), server)
    }

    fn with_base_url(base_url: String, server: MockServer) -> Self {
        let client = Client::new();
        let settings = ApiSettings {
            base_url,
            admin_base_url: None,
        };
        let storage = Arc::new(CountingStorage::default());
        let session = Arc::new(SessionStore::with_storage(
            client.clone(),
            settings.admin_base_url(),
            storage.clone(),
        ));
        let portal = Portal::with_session(client, &settings, session);

        Self {
            server,
            portal,
            storage,
        }
    }

    /// Store credentials directly, skipping the verify call.
    pub fn sign_in(&self) {
        self.storage.store(Secret::new("YWRtaW46czNjcmV0".to_string()));
    }

    pub async fn request_count(&self) -> usize {
        self.server
            .received_requests()
            .await
            .map(|requests| requests.len())
            .unwrap_or(0)
    }
}

pub fn key_request_json(request_id: &str, state: &str) -> serde_json::Value {
    serde_json::json!({
        "request_id": request_id,
        "email": "user@example.com",
        "model": "gpt-4",
        "state": state,
        "created_at": "2025-06-01T12:00:00.123456",
        "updated_at": "2025-06-01T12:30:00.654321"
    })
}

pub fn models_json() -> serde_json::Value {
    serde_json::json!({
        "models": [
            {
                "id": "gpt-4",
                "title": "GPT-4",
                "icon": "mdi-robot",
                "color": "green",
                "description": "OpenAI GPT-4"
            },
            {
                "id": "claude-3",
                "title": "Claude 3",
                "icon": "mdi-brain",
                "color": "orange",
                "description": "Anthropic Claude 3"
            }
        ]
    })
}
