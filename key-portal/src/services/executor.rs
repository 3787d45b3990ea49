//! Single-attempt HTTP execution shared by the public and admin clients.
//!
//! Every call ends in either a decoded payload or an [`ApiError`]. Calls that
//! require identity fail before any I/O when no credential is stored, and a
//! 401 on such a call clears the session and emits [`Navigation::Login`]
//! before the error is returned.

use crate::session::SessionStore;
use portal_core::observability::TracedClientExt;
use portal_core::ApiError;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::Instrument;
use uuid::Uuid;

const NAVIGATION_CAPACITY: usize = 16;

/// Navigation the hosting UI should perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// The session ended; return to the unauthenticated entry point.
    Login,
}

/// Broadcasts [`Navigation`] signals to whoever hosts the clients.
#[derive(Clone)]
pub struct Navigator {
    sender: broadcast::Sender<Navigation>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(NAVIGATION_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Navigation> {
        self.sender.subscribe()
    }

    pub fn emit(&self, navigation: Navigation) {
        // No subscriber means no UI to redirect.
        if self.sender.send(navigation).is_err() {
            tracing::debug!(?navigation, "Navigation signal dropped: no subscribers");
        }
    }
}

/// One outbound call. Built per request and consumed by [`RequestExecutor::execute`].
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<Value>,
    headers: HeaderMap,
    requires_identity: bool,
}

impl RequestDescriptor {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            headers: HeaderMap::new(),
            requires_identity: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Mark the call as requiring the stored admin credential.
    pub fn authenticated(mut self) -> Self {
        self.requires_identity = true;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn requires_identity(&self) -> bool {
        self.requires_identity
    }
}

pub struct RequestExecutor {
    client: Client,
    base_url: String,
    session: Option<Arc<SessionStore>>,
    navigator: Navigator,
}

impl RequestExecutor {
    /// Executor without a session; calls requiring identity always fail.
    pub fn new(client: Client, base_url: impl Into<String>, navigator: Navigator) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session: None,
            navigator,
        }
    }

    pub fn with_session(
        client: Client,
        base_url: impl Into<String>,
        session: Arc<SessionStore>,
        navigator: Navigator,
    ) -> Self {
        Self {
            session: Some(session),
            ..Self::new(client, base_url, navigator)
        }
    }

    /// Run the call and decode a success body as `T`.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        descriptor: RequestDescriptor,
    ) -> Result<T, ApiError> {
        let identity = if descriptor.requires_identity {
            match self.session.as_ref().and_then(|session| session.auth_header()) {
                Some(header) => Some(header),
                None => {
                    tracing::warn!(path = %descriptor.path, "No stored credentials for authenticated call");
                    return Err(ApiError::not_authenticated());
                }
            }
        } else {
            None
        };

        let request_id = Uuid::new_v4().to_string();
        let span = tracing::info_span!(
            "portal_request",
            request_id = %request_id,
            method = %descriptor.method,
            path = %descriptor.path,
            status = tracing::field::Empty,
        );

        self.dispatch(descriptor, identity, &request_id)
            .instrument(span)
            .await
    }

    async fn dispatch<T: DeserializeOwned>(
        &self,
        descriptor: RequestDescriptor,
        identity: Option<HeaderValue>,
        request_id: &str,
    ) -> Result<T, ApiError> {
        let authenticated = identity.is_some();
        let url = format!("{}{}", self.base_url, descriptor.path);
        let headers = merge_headers(descriptor.headers, identity);

        let mut request = self
            .client
            .traced_request(descriptor.method, &url)
            .headers(headers);
        if !descriptor.query.is_empty() {
            request = request.query(&descriptor.query);
        }
        if let Some(body) = &descriptor.body {
            request = request.json(body);
        }

        let response = request.send_with_request_id(request_id).await.map_err(|e| {
            tracing::error!(url = %url, error = %e, "Request did not reach the server");
            ApiError::connectivity(e)
        })?;

        let status = response.status();
        tracing::Span::current().record("status", status.as_u16());

        if status == StatusCode::UNAUTHORIZED && authenticated {
            self.reject_session();
            return Err(ApiError::rejected());
        }

        let body = response.bytes().await.map_err(|e| {
            tracing::error!(url = %url, error = %e, "Failed to read response body");
            ApiError::connectivity(e)
        })?;

        if !status.is_success() {
            let error = ApiError::from_response(status, &body);
            tracing::warn!(status = %status, message = %error.message(), "Request failed");
            return Err(error);
        }

        serde_json::from_slice(&body).map_err(|e| {
            tracing::error!(url = %url, error = %e, "Success response body could not be decoded");
            ApiError::malformed_body(e)
        })
    }

    fn reject_session(&self) {
        tracing::warn!("Credentials rejected by server, ending session");
        if let Some(session) = &self.session {
            session.logout();
        }
        self.navigator.emit(Navigation::Login);
    }
}

/// Default content type, then caller headers, then identity. A caller-supplied
/// `Authorization` never replaces the stored credential.
fn merge_headers(extra: HeaderMap, identity: Option<HeaderValue>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    let mut current: Option<HeaderName> = None;
    for (name, value) in extra {
        // A `None` name carries another value of the previous header.
        let first_value = name.is_some();
        if let Some(name) = name {
            current = Some(name);
        }
        let Some(name) = current.clone() else {
            continue;
        };

        if identity.is_some() && name == AUTHORIZATION {
            continue;
        }
        if first_value {
            headers.insert(name, value);
        } else {
            headers.append(name, value);
        }
    }

    if let Some(identity) = identity {
        headers.insert(AUTHORIZATION, identity);
    }

    headers
}
