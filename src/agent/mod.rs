mod failure;
mod orchestrator;
mod response;
mod router;
mod state;
mod synthesizer;

pub use failure::FailureHandler;
pub use orchestrator::Orchestrator;
pub use response::{ChatResponse, DataType, PipelineEvent};
pub use router::{route, Route};
pub use state::{PipelineOutcome, PipelineState, Transition};
pub use synthesizer::{format_rows, no_results_message, ResponseSynthesizer};
