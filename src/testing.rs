//! In-crate fakes for the text-generation service and the graph store.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;

use crate::error::{LlmError, StoreError};
use crate::graph::store::{GraphStore, QueryParams};
use crate::graph::value::{Record, StoreValue};
use crate::prompt::llm_integration::{GenerationParams, TextGenerator, TextStream};

/// Replays canned completions in order and remembers every prompt it saw.
pub struct ScriptedGenerator {
    responses: Mutex<VecDeque<Result<String, String>>>,
    stream_chunks: Vec<Result<String, String>>,
    calls: Mutex<Vec<(String, GenerationParams)>>,
    stream_calls: AtomicUsize,
    chunks_pulled: Arc<AtomicUsize>,
}

impl ScriptedGenerator {
    pub fn new(responses: Vec<&str>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().map(|r| Ok(r.to_string())).collect()),
            stream_chunks: Vec::new(),
            calls: Mutex::new(Vec::new()),
            stream_calls: AtomicUsize::new(0),
            chunks_pulled: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(message: &str) -> Self {
        let generator = Self::new(vec![]);
        generator
            .responses
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
        generator
    }

    pub fn with_stream(mut self, chunks: Vec<&str>) -> Self {
        self.stream_chunks = chunks.into_iter().map(|c| Ok(c.to_string())).collect();
        self
    }

    pub fn with_stream_error(mut self, message: &str) -> Self {
        self.stream_chunks.push(Err(message.to_string()));
        self
    }

    /// Prompts passed to `complete`, in call order
    pub fn calls(&self) -> Vec<(String, GenerationParams)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn stream_calls(&self) -> usize {
        self.stream_calls.load(Ordering::SeqCst)
    }

    /// Stream chunks handed to consumers so far, across all streams
    pub fn chunks_pulled(&self) -> usize {
        self.chunks_pulled.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn complete(&self, prompt: &str, params: GenerationParams) -> Result<String, LlmError> {
        self.calls.lock().unwrap().push((prompt.to_string(), params));
        match self.responses.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(LlmError::Api(message)),
            None => Err(LlmError::Api("no scripted response left".to_string())),
        }
    }

    fn stream(&self, prompt: String, params: GenerationParams) -> TextStream {
        self.calls.lock().unwrap().push((prompt, params));
        self.stream_calls.fetch_add(1, Ordering::SeqCst);
        let chunks: Vec<Result<String, LlmError>> = self
            .stream_chunks
            .iter()
            .cloned()
            .map(|c| c.map_err(LlmError::Api))
            .collect();
        let pulled = self.chunks_pulled.clone();
        Box::pin(futures::stream::iter(chunks).inspect(move |_| {
            pulled.fetch_add(1, Ordering::SeqCst);
        }))
    }
}

/// Replays canned query outcomes in order; once they run out, repeats the
/// fallback outcome.
pub struct ScriptedStore {
    outcomes: Mutex<VecDeque<Result<Vec<Record>, String>>>,
    fallback: Result<Vec<Record>, String>,
    delay: Option<Duration>,
    queries: Mutex<Vec<String>>,
    runs: AtomicUsize,
}

impl ScriptedStore {
    pub fn new(outcomes: Vec<Result<Vec<Record>, &str>>) -> Self {
        Self {
            outcomes: Mutex::new(
                outcomes
                    .into_iter()
                    .map(|o| o.map_err(str::to_string))
                    .collect(),
            ),
            fallback: Ok(Vec::new()),
            delay: None,
            queries: Mutex::new(Vec::new()),
            runs: AtomicUsize::new(0),
        }
    }

    pub fn returning(records: Vec<Record>) -> Self {
        Self::new(vec![Ok(records)])
    }

    pub fn always_failing(message: &str) -> Self {
        let mut store = Self::new(vec![]);
        store.fallback = Err(message.to_string());
        store
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl GraphStore for ScriptedStore {
    async fn run(&self, query: &str, _params: &QueryParams) -> Result<Vec<Record>, StoreError> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(query.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let outcome = self
            .outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        outcome.map_err(StoreError::Query)
    }
}

/// Build a record from `(column, value)` pairs
pub fn record(fields: &[(&str, StoreValue)]) -> Record {
    fields
        .iter()
        .fold(Record::new(), |r, (k, v)| r.with(*k, v.clone()))
}
