pub mod key_request;
pub mod llm_model;

pub use key_request::{
    ActionResponse, KeyRequest, KeyRequestState, KeyRequestSubmission, KeyResponse, RequestFilter,
};
pub use llm_model::{LlmModel, ServerInfo};
