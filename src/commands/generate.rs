use anyhow::Result;

use super::build_orchestrator;
use crate::cli::PipelineOptions;

/// Print the generated query without executing it
pub async fn run(options: &PipelineOptions, question: &str) -> Result<()> {
    let orchestrator = build_orchestrator(options)?;
    let query = orchestrator.generate_only(question).await?;
    println!("{}", query);
    Ok(())
}
