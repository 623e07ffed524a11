use std::sync::Arc;

use futures::{Stream, StreamExt};
use tracing::{debug, info, warn};

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::graph::store::GraphStore;
use crate::prompt::llm_integration::TextGenerator;
use crate::query::{QueryExecutor, QueryGenerator};

use super::failure::FailureHandler;
use super::response::{DataType, PipelineEvent};
use super::router::{route, Route};
use super::state::{PipelineOutcome, PipelineState, Transition};
use super::synthesizer::ResponseSynthesizer;

/// Control-loop position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Generate,
    Execute,
    Decide,
    Synthesize,
    Fail,
    End,
}

/// Answers questions about the inspection graph by generating a query,
/// running it, correcting it on failure, and summarizing the results.
///
/// Holds no per-question state, so one instance can serve concurrent
/// questions.
pub struct Orchestrator {
    generator: QueryGenerator,
    executor: QueryExecutor,
    synthesizer: ResponseSynthesizer,
    failure: FailureHandler,
    max_retries: u32,
}

impl Orchestrator {
    pub fn new(
        llm: Arc<dyn TextGenerator>,
        store: Arc<dyn GraphStore>,
        config: PipelineConfig,
    ) -> Self {
        // every question gets at least one execution
        let max_retries = config.max_retries.max(1);

        Self {
            generator: QueryGenerator::new(llm.clone(), &config),
            executor: QueryExecutor::new(store, config.store_timeout),
            synthesizer: ResponseSynthesizer::new(llm, &config),
            failure: FailureHandler::new(max_retries),
            max_retries,
        }
    }

    /// Run the self-correcting pipeline to completion.
    ///
    /// Execution errors are retried with corrective context and end in a
    /// failure answer when retries run out. Only a failed query-generation
    /// call is returned as an error.
    pub async fn process(&self, question: &str) -> Result<PipelineOutcome, PipelineError> {
        info!("Processing question: {}", question);

        let mut state = PipelineState::new(question);
        let mut stage = Stage::Generate;

        while stage != Stage::End {
            stage = match stage {
                Stage::Generate => {
                    debug!("Generating query, attempt {}", state.retry_count() + 1);
                    let query = self
                        .generator
                        .generate(state.question(), state.last_error(), state.generated_query())
                        .await?;
                    debug!("Generated query: {}", query);
                    state = state.apply(Transition::QueryGenerated(query));
                    Stage::Execute
                }
                Stage::Execute => {
                    let outcome = self.executor.execute(state.generated_query()).await;
                    state = match outcome {
                        Ok(rows) => {
                            info!("Query returned {} rows", rows.len());
                            state.apply(Transition::Executed(rows))
                        }
                        Err(e) => {
                            warn!("Query execution failed: {}", e);
                            state.apply(Transition::ExecutionFailed(e.to_string()))
                        }
                    };
                    Stage::Decide
                }
                Stage::Decide => {
                    let decision = route(&state, self.max_retries);
                    debug!(
                        "Route after {} failed attempt(s): {:?}",
                        state.retry_count(),
                        decision
                    );
                    match decision {
                        Route::Retry => Stage::Generate,
                        Route::Synthesize => Stage::Synthesize,
                        Route::Fail => Stage::Fail,
                    }
                }
                Stage::Synthesize => {
                    let answer = self
                        .synthesizer
                        .synthesize(state.question(), state.result_rows())
                        .await;
                    let payload = state.result_rows().to_vec();
                    state = state.apply(Transition::Answered { answer, payload });
                    Stage::End
                }
                Stage::Fail => {
                    let answer = self
                        .failure
                        .handle_failure(state.question(), state.last_error());
                    state = state.apply(Transition::Answered {
                        answer,
                        payload: Vec::new(),
                    });
                    Stage::End
                }
                Stage::End => Stage::End,
            };
        }

        Ok(state.into())
    }

    /// Generate a query for `question` without executing it
    pub async fn generate_only(&self, question: &str) -> Result<String, PipelineError> {
        Ok(self.generator.generate(question, None, "").await?)
    }

    /// Answer `question` as a stream of events.
    ///
    /// Makes exactly one generation and one execution attempt so output can
    /// start as early as possible. Yields `query`, `data`, then `token`
    /// events; any failure yields a single `error` event and ends the stream.
    /// Dropping the stream stops the underlying model stream.
    pub fn process_streaming<'a>(
        &'a self,
        question: &'a str,
    ) -> impl Stream<Item = PipelineEvent> + Send + 'a {
        async_stream::stream! {
            info!("Streaming answer for: {}", question);

            let query = match self.generator.generate(question, None, "").await {
                Ok(query) => query,
                Err(e) => {
                    yield PipelineEvent::Error { message: PipelineError::from(e).to_string() };
                    return;
                }
            };
            yield PipelineEvent::Query { query: query.clone() };

            let rows = match self.executor.execute(&query).await {
                Ok(rows) => rows,
                Err(e) => {
                    warn!("Query execution failed: {}", e);
                    yield PipelineEvent::Error { message: e.to_string() };
                    return;
                }
            };
            let data_type = DataType::classify(&rows);
            info!("Query returned {} rows ({})", rows.len(), data_type);
            yield PipelineEvent::Data { rows: rows.clone(), data_type };

            let mut tokens = self.synthesizer.synthesize_stream(question, &rows);
            while let Some(fragment) = tokens.next().await {
                match fragment {
                    Ok(text) => yield PipelineEvent::Token { text },
                    Err(e) => {
                        yield PipelineEvent::Error { message: e.to_string() };
                        return;
                    }
                }
            }
        }
    }
}
