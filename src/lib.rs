// Expose modules as public for use by other crates
pub mod agent;
pub mod config;
pub mod error;
pub mod graph;
pub mod prompt;
pub mod query;

#[cfg(test)]
pub(crate) mod testing;

// Re-export core types for convenience
pub use agent::{ChatResponse, Orchestrator, PipelineEvent, PipelineOutcome};
pub use config::{LlmConfig, PipelineConfig, StoreConfig};
pub use error::{LlmError, PipelineError, StoreError};
