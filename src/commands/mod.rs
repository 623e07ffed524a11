pub mod ask;
pub mod generate;
pub mod health;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use railgraph::config::{get_llm_config, PipelineConfig, StoreConfig};
use railgraph::graph::Neo4jHttpStore;
use railgraph::prompt::llm_integration::ChatCompletionsClient;
use railgraph::Orchestrator;

use crate::cli::PipelineOptions;

/// Apply CLI overrides on top of the default pipeline settings
fn pipeline_config(options: &PipelineOptions) -> PipelineConfig {
    let mut config = PipelineConfig::default();
    if let Some(max_retries) = options.max_retries {
        config.max_retries = max_retries;
    }
    if let Some(row_cap) = options.row_cap {
        config.row_cap = row_cap;
    }
    if let Some(secs) = options.llm_timeout {
        config.llm_timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = options.store_timeout {
        config.store_timeout = Duration::from_secs(secs);
    }
    config
}

/// Wire the model client and the graph store into an orchestrator
pub fn build_orchestrator(options: &PipelineOptions) -> Result<Orchestrator> {
    let llm_config = get_llm_config(options.provider.as_deref(), options.model.as_deref())?;
    tracing::info!(
        "Using {} model '{}' at {}",
        llm_config.provider,
        llm_config.model,
        llm_config.endpoint_url
    );

    let store_config = StoreConfig::from_env();
    tracing::info!("Using graph store at {}", store_config.uri);

    let llm = Arc::new(ChatCompletionsClient::new(llm_config)?);
    let store = Arc::new(Neo4jHttpStore::new(store_config)?);

    Ok(Orchestrator::new(llm, store, pipeline_config(options)))
}
