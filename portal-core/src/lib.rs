//! portal-core: Shared infrastructure for the key portal clients.
pub mod config;
pub mod error;
pub mod observability;

pub use reqwest;
pub use serde;
pub use serde_json;
pub use tracing;

pub use error::{ApiError, ErrorKind};
