mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout only carries answers
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = cli::Cli::parse();

    match cli.command {
        cli::Commands::Ask {
            question,
            stream,
            format,
        } => commands::ask::run(&cli.options, &question, stream, format).await?,
        cli::Commands::Generate { question } => {
            commands::generate::run(&cli.options, &question).await?
        }
        cli::Commands::Health => commands::health::run().await?,
    }

    Ok(())
}
