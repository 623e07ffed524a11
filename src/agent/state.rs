use serde::Serialize;

use crate::query::Row;

/// Per-question pipeline state.
///
/// Created fresh for every question and owned by exactly one in-flight
/// request. Fields only change through [`PipelineState::apply`].
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineState {
    question: String,
    generated_query: String,
    result_rows: Vec<Row>,
    last_error: Option<String>,
    retry_count: u32,
    final_answer: String,
    structured_payload: Option<Vec<Row>>,
}

/// The outcome of one pipeline step, carrying only the fields that step owns.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// The generator produced a new query; any pending error is consumed
    QueryGenerated(String),
    /// The executor ran the query successfully
    Executed(Vec<Row>),
    /// The executor failed with this message
    ExecutionFailed(String),
    /// A terminal component produced the answer
    Answered { answer: String, payload: Vec<Row> },
}

impl PipelineState {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            generated_query: String::new(),
            result_rows: Vec::new(),
            last_error: None,
            retry_count: 0,
            final_answer: String::new(),
            structured_payload: None,
        }
    }

    /// Fold one step's outcome into the state
    pub fn apply(mut self, transition: Transition) -> Self {
        match transition {
            Transition::QueryGenerated(query) => {
                self.generated_query = query;
                self.last_error = None;
            }
            Transition::Executed(rows) => {
                self.result_rows = rows;
                self.last_error = None;
            }
            Transition::ExecutionFailed(message) => {
                let message = if message.trim().is_empty() {
                    "Unknown error".to_string()
                } else {
                    message
                };
                self.result_rows.clear();
                self.last_error = Some(message);
                self.retry_count += 1;
            }
            Transition::Answered { answer, payload } => {
                debug_assert!(self.final_answer.is_empty(), "answer already set");
                self.final_answer = answer;
                self.structured_payload = Some(payload);
            }
        }
        self
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn generated_query(&self) -> &str {
        &self.generated_query
    }

    pub fn result_rows(&self) -> &[Row] {
        &self.result_rows
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    pub fn final_answer(&self) -> &str {
        &self.final_answer
    }

    pub fn structured_payload(&self) -> Option<&[Row]> {
        self.structured_payload.as_deref()
    }
}

/// Final snapshot returned by the batch entry point
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineOutcome {
    pub question: String,
    pub generated_query: String,
    pub answer: String,
    pub structured_payload: Vec<Row>,
    pub last_error: Option<String>,
    pub retry_count: u32,
}

impl From<PipelineState> for PipelineOutcome {
    fn from(state: PipelineState) -> Self {
        Self {
            question: state.question,
            generated_query: state.generated_query,
            answer: state.final_answer,
            structured_payload: state.structured_payload.unwrap_or_default(),
            last_error: state.last_error,
            retry_count: state.retry_count,
        }
    }
}
