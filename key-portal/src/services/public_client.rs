//! Unauthenticated calls made by the key request form.

use crate::models::key_request::{KeyRequestSubmission, KeyResponse};
use crate::models::llm_model::{HealthStatus, LlmModel, ModelsEnvelope, ServerInfo};
use crate::services::executor::{RequestDescriptor, RequestExecutor};
use portal_core::ApiError;
use std::sync::Arc;

pub const MODELS_PATH: &str = "/api/models";
pub const FEATURED_MODELS_PATH: &str = "/api/featured-models";
pub const REQUEST_KEY_PATH: &str = "/api/request-key";
pub const HEALTH_PATH: &str = "/health";

/// A model list with its fallback applied: on failure `models` is empty and
/// `error` holds what went wrong.
#[derive(Debug)]
pub struct ModelListing {
    pub models: Vec<LlmModel>,
    pub error: Option<ApiError>,
}

impl ModelListing {
    fn from_result(result: Result<Vec<LlmModel>, ApiError>) -> Self {
        match result {
            Ok(models) => Self {
                models,
                error: None,
            },
            Err(error) => Self {
                models: Vec::new(),
                error: Some(error),
            },
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Full and featured listings, loaded independently.
#[derive(Debug)]
pub struct ModelCatalog {
    pub all: ModelListing,
    pub featured: ModelListing,
}

#[derive(Clone)]
pub struct PublicClient {
    executor: Arc<RequestExecutor>,
}

impl PublicClient {
    pub fn new(executor: Arc<RequestExecutor>) -> Self {
        Self { executor }
    }

    pub async fn models(&self) -> Result<Vec<LlmModel>, ApiError> {
        let envelope: ModelsEnvelope = self
            .executor
            .execute(RequestDescriptor::get(MODELS_PATH))
            .await?;
        Ok(envelope.models)
    }

    pub async fn featured_models(&self) -> Result<Vec<LlmModel>, ApiError> {
        let envelope: ModelsEnvelope = self
            .executor
            .execute(RequestDescriptor::get(FEATURED_MODELS_PATH))
            .await?;
        Ok(envelope.models)
    }

    pub async fn load_models(&self) -> ModelListing {
        let result = self.models().await;
        if let Err(e) = &result {
            tracing::error!(error = %e, status = e.status(), "Failed to fetch models");
        }
        ModelListing::from_result(result)
    }

    pub async fn load_featured_models(&self) -> ModelListing {
        let result = self.featured_models().await;
        if let Err(e) = &result {
            tracing::error!(error = %e, status = e.status(), "Failed to fetch featured models");
        }
        ModelListing::from_result(result)
    }

    /// Fetch both listings concurrently; neither failure affects the other.
    pub async fn load_catalog(&self) -> ModelCatalog {
        let (all, featured) = tokio::join!(self.load_models(), self.load_featured_models());
        ModelCatalog { all, featured }
    }

    /// Validate locally, then submit the normalized request.
    pub async fn submit_key_request(
        &self,
        submission: &KeyRequestSubmission,
    ) -> Result<KeyResponse, ApiError> {
        let payload = submission.validate()?;

        let body = serde_json::json!({
            "llm": payload.llm,
            "email": payload.email,
        });

        let response: KeyResponse = self
            .executor
            .execute(RequestDescriptor::post(REQUEST_KEY_PATH).json(body))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, status = e.status(), llm = %payload.llm, "Key request failed");
                e
            })?;

        tracing::info!(
            llm = %payload.llm,
            request_id = ?response.request_id,
            success = response.success,
            "Key request submitted"
        );

        Ok(response)
    }

    /// `true` only when the backend reports itself healthy. Never fails.
    pub async fn check_health(&self) -> bool {
        match self
            .executor
            .execute::<HealthStatus>(RequestDescriptor::get(HEALTH_PATH))
            .await
        {
            Ok(health) => health.status == "healthy",
            Err(e) => {
                tracing::warn!(error = %e, status = e.status(), "Health check failed");
                false
            }
        }
    }

    pub async fn server_info(&self) -> Result<ServerInfo, ApiError> {
        self.executor.execute(RequestDescriptor::get("/")).await
    }
}
