//! Response evaluation and score aggregation.
//!
//! Flow: build request context → generation service → fence strip + parse →
//!       coerce/validate rubric → per-response / per-essay records →
//!       compile interview rubric → fold essay scores into it.
//!
//! Generator nondeterminism is repaired, never fatal. Only a call that yields
//! no parseable JSON object aborts an evaluation.

use thiserror::Error;

use crate::llm_client::LlmError;

pub mod coercion;
pub mod compiler;
pub mod essay;
pub mod handlers;
pub mod merge;
pub mod prompts;
pub mod response;
pub mod rubric;
pub mod session;

/// Irrecoverable failure of one generation round-trip.
/// Callers surface it as "please retry"; nothing retries internally.
#[derive(Debug, Error)]
pub enum EvaluationGenerationError {
    #[error("generation service call failed: {0}")]
    Service(LlmError),

    #[error("generation service returned an empty response")]
    EmptyResponse,

    #[error("failed to parse evaluation JSON: {0}")]
    MalformedJson(#[source] serde_json::Error),

    #[error("evaluation payload is not a JSON object (found {found})")]
    NotAnObject { found: &'static str },
}

impl From<LlmError> for EvaluationGenerationError {
    fn from(error: LlmError) -> Self {
        match error {
            LlmError::EmptyContent => EvaluationGenerationError::EmptyResponse,
            other => EvaluationGenerationError::Service(other),
        }
    }
}

#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("No evaluation inputs provided")]
    NoInputs,

    #[error(transparent)]
    Generation(#[from] EvaluationGenerationError),
}
