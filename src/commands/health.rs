use anyhow::{anyhow, Result};
use railgraph::config::{PipelineConfig, StoreConfig};
use railgraph::graph::{GraphStore, Neo4jHttpStore};
use tracing::{error, info};

/// Ping the graph store and report whether it answers
pub async fn run() -> Result<()> {
    let config = StoreConfig::from_env();
    let uri = config.uri.clone();
    let store = Neo4jHttpStore::new(config)?;

    let timeout = PipelineConfig::default().store_timeout;
    let result = tokio::time::timeout(timeout, store.ping())
        .await
        .map_err(|_| railgraph::StoreError::Timeout(timeout))
        .and_then(|r| r);

    match result {
        Ok(()) => {
            info!("Graph store reachable at {}", uri);
            println!("ok");
            Ok(())
        }
        Err(e) => {
            error!("Graph store at {} is not reachable: {}", uri, e);
            Err(anyhow!("Graph store health check failed: {}", e))
        }
    }
}
