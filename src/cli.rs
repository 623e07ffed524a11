use clap::{Args, Parser, Subcommand, ValueEnum};

/// Railgraph: ask questions about the railway inspection graph in plain language
#[derive(Parser)]
#[command(
    author,
    version,
    about = "Ask questions about the railway inspection graph in plain language"
)]
pub struct Cli {
    #[command(flatten)]
    pub options: PipelineOptions,

    #[command(subcommand)]
    pub command: Commands,
}

/// Overrides for the pipeline and collaborator settings
#[derive(Args, Debug)]
pub struct PipelineOptions {
    /// LLM provider (ollama, openai, openrouter); defaults to $LLM_PROVIDER or ollama
    #[arg(long, global = true)]
    pub provider: Option<String>,

    /// Model name; defaults to $LLM_MODEL or the provider's default
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Maximum query executions per question, including the first
    #[arg(long, global = true)]
    pub max_retries: Option<u32>,

    /// Rows shown to the model when writing the answer
    #[arg(long, global = true)]
    pub row_cap: Option<usize>,

    /// Timeout for each model call, in seconds
    #[arg(long, global = true)]
    pub llm_timeout: Option<u64>,

    /// Timeout for each graph query, in seconds
    #[arg(long, global = true)]
    pub store_timeout: Option<u64>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Answer a question using live graph data
    Ask {
        /// Question (e.g., "Show me all critical cracks on Track 5")
        question: String,

        /// Print the answer as it is generated (single attempt, no self-correction)
        #[arg(long, short)]
        stream: bool,

        /// Output format
        #[arg(long, short, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Print the graph query generated for a question without running it
    Generate {
        /// Question to translate
        question: String,
    },

    /// Check that the graph store is reachable
    Health,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON response (one event per line when streaming)
    Json,
}
