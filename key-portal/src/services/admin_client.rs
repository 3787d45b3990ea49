//! Authenticated calls made by the admin panel.
//!
//! Each method is one call through the executor and inherits its
//! fail-fast and 401 handling unchanged.

use crate::models::key_request::{ActionResponse, KeyRequest, KeyRequestList, RequestFilter};
use crate::services::executor::{RequestDescriptor, RequestExecutor};
use portal_core::ApiError;
use std::sync::Arc;

pub const REQUESTS_PATH: &str = "/api/admin/requests";

#[derive(Clone)]
pub struct AdminClient {
    executor: Arc<RequestExecutor>,
}

impl AdminClient {
    pub fn new(executor: Arc<RequestExecutor>) -> Self {
        Self { executor }
    }

    pub async fn list_requests(&self, filter: RequestFilter) -> Result<Vec<KeyRequest>, ApiError> {
        let list: KeyRequestList = self
            .executor
            .execute(
                RequestDescriptor::get(REQUESTS_PATH)
                    .query("filter", filter.as_str())
                    .authenticated(),
            )
            .await?;
        Ok(list.into())
    }

    pub async fn request_details(&self, request_id: &str) -> Result<KeyRequest, ApiError> {
        self.executor
            .execute(RequestDescriptor::get(request_path(request_id, None)).authenticated())
            .await
    }

    pub async fn approve(&self, request_id: &str) -> Result<ActionResponse, ApiError> {
        let response: ActionResponse = self
            .executor
            .execute(
                RequestDescriptor::post(request_path(request_id, Some("approve"))).authenticated(),
            )
            .await?;

        tracing::info!(request_id = %request_id, "Key request approved");
        Ok(response)
    }

    /// Deny with `reason`, which is sent verbatim.
    pub async fn deny(&self, request_id: &str, reason: &str) -> Result<ActionResponse, ApiError> {
        let response: ActionResponse = self
            .executor
            .execute(
                RequestDescriptor::post(request_path(request_id, Some("deny")))
                    .json(serde_json::json!({ "reason": reason }))
                    .authenticated(),
            )
            .await?;

        tracing::info!(request_id = %request_id, "Key request denied");
        Ok(response)
    }
}

fn request_path(request_id: &str, action: Option<&str>) -> String {
    let id = urlencoding::encode(request_id);
    match action {
        Some(action) => format!("{}/{}/{}", REQUESTS_PATH, id, action),
        None => format!("{}/{}", REQUESTS_PATH, id),
    }
}
