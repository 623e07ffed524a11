use std::io::Write;

use anyhow::Result;
use futures::StreamExt;
use railgraph::{ChatResponse, PipelineEvent};

use super::build_orchestrator;
use crate::cli::{OutputFormat, PipelineOptions};

/// Answer one question, either in one piece or streamed
pub async fn run(
    options: &PipelineOptions,
    question: &str,
    stream: bool,
    format: OutputFormat,
) -> Result<()> {
    let orchestrator = build_orchestrator(options)?;

    if stream {
        let events = orchestrator.process_streaming(question);
        futures::pin_mut!(events);
        let mut stdout = std::io::stdout();

        while let Some(event) = events.next().await {
            if format == OutputFormat::Json {
                writeln!(stdout, "{}", serde_json::to_string(&event)?)?;
                continue;
            }

            match event {
                PipelineEvent::Query { query } => eprintln!("Query:\n{}\n", query),
                PipelineEvent::Data { rows, data_type } => {
                    eprintln!("[{} rows, {}]\n", rows.len(), data_type)
                }
                PipelineEvent::Token { text } => {
                    write!(stdout, "{}", text)?;
                    stdout.flush()?;
                }
                PipelineEvent::Error { message } => eprintln!("\nError: {}", message),
            }
        }
        if format == OutputFormat::Text {
            writeln!(stdout)?;
        }
        return Ok(());
    }

    let response = ChatResponse::from_result(orchestrator.process(question).await);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&response)?),
        OutputFormat::Text => {
            if !response.generated_query.is_empty() {
                eprintln!("Query:\n{}\n", response.generated_query);
            }
            println!("{}", response.answer);
        }
    }

    Ok(())
}
