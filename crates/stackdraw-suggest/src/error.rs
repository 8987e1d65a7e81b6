use stackdraw_core::SchemaError;
use thiserror::Error;

use crate::parse::ExtractError;

/// Outcomes the service boundary has to map to a response.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid input: {0}")]
    InputInvalid(String),

    #[error("AI model not configured on server")]
    ModelUnavailable,

    #[error("model call failed: {0}")]
    ModelCallFailed(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for PipelineError {
    fn from(e: serde_json::Error) -> Self {
        PipelineError::Internal(e.to_string())
    }
}

/// Why a model-backed step produced no usable result. Logged, then handled
/// according to the operation's failure policy.
#[derive(Debug, Error)]
pub enum Failure {
    #[error("model not configured")]
    Unavailable,

    #[error("model call failed: {0}")]
    CallFailed(String),

    #[error("model response blocked or empty ({})", .0.as_deref().unwrap_or("no reason given"))]
    Blocked(Option<String>),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error("schema invalid: {0}")]
    Schema(#[from] SchemaError),
}
