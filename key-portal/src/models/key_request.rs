use chrono::{DateTime, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use portal_core::ApiError;
use regex::Regex;
use secrecy::Secret;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

static EMAIL_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

pub const MISSING_PROVIDER_MESSAGE: &str = "Please select an LLM provider";
pub const MISSING_EMAIL_MESSAGE: &str = "Please enter your email address";
pub const INVALID_EMAIL_MESSAGE: &str = "Please enter a valid email address";

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_SHAPE.is_match(email)
}

/// Lifecycle state reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeyRequestState {
    Pending,
    Approved,
    Denied,
    InReview,
}

/// Filter accepted by the admin request listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestFilter {
    #[default]
    Pending,
    Review,
    All,
}

impl RequestFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestFilter::Pending => "pending",
            RequestFilter::Review => "review",
            RequestFilter::All => "all",
        }
    }
}

impl fmt::Display for RequestFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A key request as stored by the backend.
#[derive(Debug, Clone, Deserialize)]
pub struct KeyRequest {
    pub request_id: String,
    pub email: String,
    pub model: String,
    pub state: KeyRequestState,
    #[serde(deserialize_with = "backend_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "backend_timestamp")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub api_key: Option<Secret<String>>,
}

/// RFC 3339, or an ISO 8601 timestamp without offset, which the backend
/// writes for UTC.
fn backend_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(timestamp.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| serde::de::Error::custom(format!("invalid timestamp '{}': {}", raw, e)))
}

/// The list endpoint answers with a bare array or a `{ "requests": [...] }` envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum KeyRequestList {
    Bare(Vec<KeyRequest>),
    Wrapped { requests: Vec<KeyRequest> },
}

impl From<KeyRequestList> for Vec<KeyRequest> {
    fn from(list: KeyRequestList) -> Self {
        match list {
            KeyRequestList::Bare(requests) | KeyRequestList::Wrapped { requests } => requests,
        }
    }
}

/// Form input for a new key request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRequestSubmission {
    pub llm: String,
    pub email: String,
}

impl KeyRequestSubmission {
    pub fn new(llm: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            llm: llm.into(),
            email: email.into(),
        }
    }

    /// Check the form and return the payload to send: provider trimmed,
    /// email trimmed and lowercased.
    ///
    /// Rules are checked in order and the first violation is reported.
    pub fn validate(&self) -> Result<KeyRequestSubmission, ApiError> {
        let llm = self.llm.trim();
        let email = self.email.trim();

        if llm.is_empty() {
            return Err(ApiError::validation("llm", MISSING_PROVIDER_MESSAGE));
        }
        if email.is_empty() {
            return Err(ApiError::validation("email", MISSING_EMAIL_MESSAGE));
        }
        if !is_valid_email(email) {
            return Err(ApiError::validation("email", INVALID_EMAIL_MESSAGE));
        }

        Ok(KeyRequestSubmission {
            llm: llm.to_string(),
            email: email.to_lowercase(),
        })
    }
}

/// Outcome of a submission. The backend may report `success: false` with a 200.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct KeyResponse {
    pub message: String,
    pub success: bool,
    #[serde(default)]
    pub request_id: Option<String>,
}

/// Outcome of an approve or deny call.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActionResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub state: Option<KeyRequestState>,
}
