use serde::Serialize;

use crate::error::PipelineError;
use crate::query::Row;

use super::state::PipelineOutcome;

/// Rendering hint for the caller, guessed from the result columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Anomalies,
    Tracks,
    Stats,
    Text,
}

impl DataType {
    /// Classify rows by the field names of the first row
    pub fn classify(rows: &[Row]) -> Self {
        let Some(first) = rows.first() else {
            return DataType::Text;
        };
        let has = |keys: &[&str]| keys.iter().any(|k| first.contains_key(*k));

        if has(&["anomaly_type", "type", "severity"]) {
            DataType::Anomalies
        } else if has(&["track_id", "track_name"]) {
            DataType::Tracks
        } else if has(&["count"]) {
            DataType::Stats
        } else {
            DataType::Text
        }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DataType::Anomalies => "anomalies",
            DataType::Tracks => "tracks",
            DataType::Stats => "stats",
            DataType::Text => "text",
        };
        write!(f, "{}", name)
    }
}

/// One event of the streaming entry point
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PipelineEvent {
    Query { query: String },
    Data { rows: Vec<Row>, data_type: DataType },
    Token { text: String },
    Error { message: String },
}

/// Request-level answer handed to outer layers (CLI, HTTP)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatResponse {
    pub answer: String,
    pub generated_query: String,
    pub rows: Vec<Row>,
    pub data_type: DataType,
    pub error: Option<String>,
}

impl From<PipelineOutcome> for ChatResponse {
    fn from(outcome: PipelineOutcome) -> Self {
        Self {
            data_type: DataType::classify(&outcome.structured_payload),
            answer: outcome.answer,
            generated_query: outcome.generated_query,
            rows: outcome.structured_payload,
            error: outcome.last_error,
        }
    }
}

impl From<PipelineError> for ChatResponse {
    fn from(error: PipelineError) -> Self {
        Self {
            answer: format!("I encountered an error processing your request: {}", error),
            generated_query: String::new(),
            rows: Vec::new(),
            data_type: DataType::Text,
            error: Some(error.to_string()),
        }
    }
}

impl ChatResponse {
    pub fn from_result(result: Result<PipelineOutcome, PipelineError>) -> Self {
        match result {
            Ok(outcome) => outcome.into(),
            Err(error) => error.into(),
        }
    }
}
