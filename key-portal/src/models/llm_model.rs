use serde::{Deserialize, Serialize};

/// A provider entry offered on the request form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmModel {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ModelsEnvelope {
    #[serde(default)]
    pub models: Vec<LlmModel>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerInfo {
    pub message: String,
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HealthStatus {
    #[serde(default)]
    pub status: String,
}
