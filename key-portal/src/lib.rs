pub mod config;
pub mod models;
pub mod services;
pub mod session;

use config::ApiSettings;
use reqwest::Client;
use services::{AdminClient, Navigation, Navigator, PublicClient, RequestExecutor};
use session::SessionStore;
use std::sync::Arc;
use tokio::sync::broadcast;

pub use portal_core::{ApiError, ErrorKind};

/// Both client pipelines wired to one HTTP client and one admin session.
#[derive(Clone)]
pub struct Portal {
    session: Arc<SessionStore>,
    navigator: Navigator,
    public: PublicClient,
    admin: AdminClient,
}

impl Portal {
    pub fn new(settings: &ApiSettings) -> Self {
        Self::with_client(Client::new(), settings)
    }

    pub fn with_client(client: Client, settings: &ApiSettings) -> Self {
        let session = Arc::new(SessionStore::new(
            client.clone(),
            settings.admin_base_url(),
        ));
        Self::with_session(client, settings, session)
    }

    /// Use a caller-built session, e.g. one backed by custom credential storage.
    pub fn with_session(client: Client, settings: &ApiSettings, session: Arc<SessionStore>) -> Self {
        let navigator = Navigator::new();

        let public_executor = Arc::new(RequestExecutor::new(
            client.clone(),
            settings.base_url.clone(),
            navigator.clone(),
        ));
        let admin_executor = Arc::new(RequestExecutor::with_session(
            client,
            settings.admin_base_url(),
            session.clone(),
            navigator.clone(),
        ));

        Self {
            session,
            navigator,
            public: PublicClient::new(public_executor),
            admin: AdminClient::new(admin_executor),
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn public(&self) -> &PublicClient {
        &self.public
    }

    pub fn admin(&self) -> &AdminClient {
        &self.admin
    }

    /// Navigation signals raised when the admin session is rejected.
    pub fn subscribe(&self) -> broadcast::Receiver<Navigation> {
        self.navigator.subscribe()
    }
}
