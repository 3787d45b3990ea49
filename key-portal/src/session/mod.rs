//! Admin session: the single owner of the stored credential.
//!
//! The credential is the base64 encoding of `username:password`, sent as an
//! HTTP Basic `Authorization` header. It is only persisted after the backend
//! accepted it on `/api/admin/verify`.

pub mod storage;

use base64::{engine::general_purpose, Engine as _};
use portal_core::observability::TracedClientExt;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use std::sync::Arc;

pub use storage::{CredentialStorage, MemoryStorage};

pub const VERIFY_PATH: &str = "/api/admin/verify";

/// Display identity recovered from the stored credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminIdentity {
    pub username: String,
}

pub struct SessionStore {
    client: Client,
    base_url: String,
    storage: Arc<dyn CredentialStorage>,
}

impl SessionStore {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self::with_storage(client, base_url, Arc::new(MemoryStorage::new()))
    }

    pub fn with_storage(
        client: Client,
        base_url: impl Into<String>,
        storage: Arc<dyn CredentialStorage>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            storage,
        }
    }

    /// Verify the credentials against the backend and keep them on success.
    ///
    /// Every failure, including a transport error, is reported as `false`.
    pub async fn login(&self, username: &str, password: &str) -> bool {
        let credentials = Secret::new(encode_credentials(username, password));
        // Base64 output is always a valid header value.
        let Some(header) = basic_header(&credentials) else {
            return false;
        };

        let url = format!("{}{}", self.base_url, VERIFY_PATH);
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(reqwest::header::AUTHORIZATION, header);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        match self.client.traced_post(&url).headers(headers).send().await {
            Ok(response) if response.status().is_success() => {
                self.storage.store(credentials);
                tracing::info!(username = %username, "Admin logged in");
                true
            }
            Ok(response) => {
                tracing::warn!(
                    username = %username,
                    status = %response.status(),
                    "Admin credentials rejected"
                );
                false
            }
            Err(e) => {
                tracing::error!(url = %url, error = %e, "Login request failed");
                false
            }
        }
    }

    pub fn logout(&self) {
        self.storage.clear();
    }

    pub fn is_authenticated(&self) -> bool {
        self.storage.load().is_some()
    }

    /// `Authorization` header value for the stored credential, if any.
    pub fn auth_header(&self) -> Option<HeaderValue> {
        self.storage.load().and_then(|credentials| basic_header(&credentials))
    }

    pub fn current_identity(&self) -> Option<AdminIdentity> {
        let credentials = self.storage.load()?;
        let decoded = general_purpose::STANDARD
            .decode(credentials.expose_secret())
            .ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let username = decoded.split(':').next()?;

        Some(AdminIdentity {
            username: username.to_string(),
        })
    }
}

fn encode_credentials(username: &str, password: &str) -> String {
    general_purpose::STANDARD.encode(format!("{}:{}", username, password))
}

fn basic_header(credentials: &Secret<String>) -> Option<HeaderValue> {
    let mut value = HeaderValue::from_str(&format!("Basic {}", credentials.expose_secret())).ok()?;
    value.set_sensitive(true);
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(credentials: Option<&str>) -> SessionStore {
        let storage = Arc::new(MemoryStorage::new());
        if let Some(credentials) = credentials {
            storage.store(Secret::new(credentials.to_string()));
        }
        SessionStore::with_storage(Client::new(), "http://localhost:8000/", storage)
    }

    #[test]
    fn empty_store_is_unauthenticated() {
        let store = store_with(None);

        assert!(!store.is_authenticated());
        assert!(store.auth_header().is_none());
        assert!(store.current_identity().is_none());
    }

    #[test]
    fn auth_header_uses_basic_scheme() {
        let store = store_with(Some(&encode_credentials("admin", "s3cret")));
        let header = store.auth_header().unwrap();

        assert!(header.is_sensitive());
        assert_eq!(header.to_str().unwrap(), "Basic YWRtaW46czNjcmV0");
    }

    #[test]
    fn identity_exposes_username_only() {
        let store = store_with(Some(&encode_credentials("admin", "pa:ss")));
        let identity = store.current_identity().unwrap();

        assert_eq!(identity.username, "admin");
        assert!(!format!("{:?}", identity).contains("pa:ss"));
    }

    #[test]
    fn undecodable_credentials_have_no_identity() {
        let store = store_with(Some("%%not-base64%%"));

        assert!(store.is_authenticated());
        assert!(store.current_identity().is_none());
    }

    #[test]
    fn logout_is_idempotent() {
        let store = store_with(Some(&encode_credentials("admin", "pw")));

        store.logout();
        store.logout();
        assert!(!store.is_authenticated());
    }

    #[test]
    fn base_url_trailing_slash_is_dropped() {
        let store = store_with(None);
        assert_eq!(store.base_url, "http://localhost:8000");
    }
}
