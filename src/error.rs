use std::time::Duration;

use thiserror::Error;

/// Failures talking to the text-generation service.
///
/// None of these are retried by the self-correction loop: a generation failure
/// aborts the request.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("API error: {0}")]
    Api(String),

    #[error("Invalid response format from LLM API: {0}")]
    InvalidResponse(String),

    #[error("LLM request timed out after {0:?}")]
    Timeout(Duration),
}

/// Failures running a structured query against the graph store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Query(String),

    #[error("Store connection error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Store HTTP error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid store response: {0}")]
    InvalidResponse(String),

    #[error("Store query timed out after {0:?}")]
    Timeout(Duration),
}

/// Errors that escape the pipeline to the caller.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Query generation failed: {0}")]
    Generation(#[from] LlmError),
}
