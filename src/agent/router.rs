use super::state::PipelineState;

/// Where the pipeline goes after a query execution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Generate a corrected query and execute again
    Retry,
    /// Write the answer from the result rows
    Synthesize,
    /// Give up and report the last error
    Fail,
}

/// Decide the next step from the current state.
///
/// At most `max_retries` executions happen per question: once `retry_count`
/// reaches the limit a pending error always routes to `Fail`.
pub fn route(state: &PipelineState, max_retries: u32) -> Route {
    match state.last_error() {
        Some(error) if !error.is_empty() => {
            if state.retry_count() >= max_retries {
                Route::Fail
            } else {
                Route::Retry
            }
        }
        _ => Route::Synthesize,
    }
}
