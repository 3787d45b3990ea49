//! Typed error shared by every request pipeline.
//!
//! Callers branch on [`ErrorKind`] rather than inspecting messages:
//!
//! | Kind | Status | Raised when |
//! |------|--------|-------------|
//! | `Validation` | 400 | a local precondition failed, nothing was sent |
//! | `Unauthenticated` | 401 | no stored credential, or the server rejected it |
//! | `Request` | HTTP status | any other non-success response |
//! | `Transport` | 0 | no response, or a success body that could not be parsed |

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub const NOT_AUTHENTICATED_MESSAGE: &str = "Not authenticated";
pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized";
pub const REQUEST_FAILED_MESSAGE: &str = "Request failed";
pub const CONNECTIVITY_MESSAGE: &str = "Unable to connect to server. Please check your connection.";
pub const UNEXPECTED_MESSAGE: &str = "An unexpected error occurred";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Unauthenticated,
    Request,
    Transport,
}

/// Why an authenticated call was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    /// No credential was stored; the call never left the client.
    MissingCredentials,
    /// The server answered 401; the session has been cleared.
    Rejected,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("{message}")]
    Unauthenticated {
        reason: AuthFailure,
        message: String,
    },

    #[error("{message}")]
    Request {
        status: u16,
        message: String,
        details: Option<Value>,
    },

    #[error("{message}")]
    Transport {
        message: String,
        #[source]
        source: Option<BoxError>,
    },
}

impl ApiError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        ApiError::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn not_authenticated() -> Self {
        ApiError::Unauthenticated {
            reason: AuthFailure::MissingCredentials,
            message: NOT_AUTHENTICATED_MESSAGE.to_string(),
        }
    }

    pub fn rejected() -> Self {
        ApiError::Unauthenticated {
            reason: AuthFailure::Rejected,
            message: UNAUTHORIZED_MESSAGE.to_string(),
        }
    }

    /// No response was obtained from the server.
    pub fn connectivity(source: impl Into<BoxError>) -> Self {
        ApiError::Transport {
            message: CONNECTIVITY_MESSAGE.to_string(),
            source: Some(source.into()),
        }
    }

    /// A success status arrived with a body that breaks the response contract.
    pub fn malformed_body(source: impl Into<BoxError>) -> Self {
        ApiError::Transport {
            message: UNEXPECTED_MESSAGE.to_string(),
            source: Some(source.into()),
        }
    }

    /// Builds a request error from a non-success response body.
    ///
    /// The message comes from the body's `message` field, then a string
    /// `detail` field, then falls back to a generic message. A body that is
    /// not JSON yields the generic message and no details.
    pub fn from_response(status: StatusCode, body: &[u8]) -> Self {
        let details = serde_json::from_slice::<Value>(body).ok();

        let message = details
            .as_ref()
            .and_then(|value| {
                value
                    .get("message")
                    .and_then(Value::as_str)
                    .or_else(|| value.get("detail").and_then(Value::as_str))
            })
            .filter(|message| !message.is_empty())
            .unwrap_or(REQUEST_FAILED_MESSAGE)
            .to_string();

        ApiError::Request {
            status: status.as_u16(),
            message,
            details,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Validation { .. } => ErrorKind::Validation,
            ApiError::Unauthenticated { .. } => ErrorKind::Unauthenticated,
            ApiError::Request { .. } => ErrorKind::Request,
            ApiError::Transport { .. } => ErrorKind::Transport,
        }
    }

    /// Numeric classification: 0 for transport failures, HTTP status otherwise.
    pub fn status(&self) -> u16 {
        match self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST.as_u16(),
            ApiError::Unauthenticated { .. } => StatusCode::UNAUTHORIZED.as_u16(),
            ApiError::Request { status, .. } => *status,
            ApiError::Transport { .. } => 0,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::Validation { message, .. }
            | ApiError::Unauthenticated { message, .. }
            | ApiError::Request { message, .. }
            | ApiError::Transport { message, .. } => message,
        }
    }

    /// Structured body returned by the server, if any.
    pub fn details(&self) -> Option<&Value> {
        match self {
            ApiError::Request { details, .. } => details.as_ref(),
            _ => None,
        }
    }

    /// Form field a validation error refers to.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ApiError::Validation { field, .. } => Some(*field),
            _ => None,
        }
    }

    pub fn auth_failure(&self) -> Option<AuthFailure> {
        match self {
            ApiError::Unauthenticated { reason, .. } => Some(*reason),
            _ => None,
        }
    }
}
