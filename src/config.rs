use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Result};

/// Tuning knobs for one pipeline instance.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Maximum number of query executions per question, including the first.
    /// Values below 1 are treated as 1.
    pub max_retries: u32,
    /// Low temperature so generated queries stay reproducible.
    pub query_temperature: f32,
    pub synthesis_temperature: f32,
    pub query_max_tokens: u32,
    pub synthesis_max_tokens: u32,
    /// Rows shown to the model when writing the answer.
    pub row_cap: usize,
    pub llm_timeout: Duration,
    pub store_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            query_temperature: 0.1,
            synthesis_temperature: 0.4,
            query_max_tokens: 512,
            synthesis_max_tokens: 1024,
            row_cap: 20,
            llm_timeout: Duration::from_secs(120),
            store_timeout: Duration::from_secs(30),
        }
    }
}

/// Supported text-generation backends. All of them speak the OpenAI
/// chat-completions protocol, they only differ in endpoint and auth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    Ollama,
    OpenAI,
    OpenRouter,
}

impl LlmProvider {
    fn default_endpoint(&self) -> String {
        match self {
            LlmProvider::Ollama => {
                let base = env::var("OLLAMA_BASE_URL")
                    .unwrap_or_else(|_| "http://localhost:11434".to_string());
                format!("{}/v1/chat/completions", base.trim_end_matches('/'))
            }
            LlmProvider::OpenAI => "https://api.openai.com/v1/chat/completions".to_string(),
            LlmProvider::OpenRouter => "https://openrouter.ai/api/v1/chat/completions".to_string(),
        }
    }

    fn default_model(&self) -> String {
        match self {
            LlmProvider::Ollama => env::var("OLLAMA_MODEL").unwrap_or_else(|_| "llama3".into()),
            LlmProvider::OpenAI => "gpt-4o-mini".to_string(),
            LlmProvider::OpenRouter => "anthropic/claude-3-haiku".to_string(),
        }
    }

    fn api_key_var(&self) -> Option<&'static str> {
        match self {
            LlmProvider::Ollama => None,
            LlmProvider::OpenAI => Some("OPENAI_API_KEY"),
            LlmProvider::OpenRouter => Some("OPENROUTER_API_KEY"),
        }
    }
}

impl FromStr for LlmProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "ollama" => Ok(LlmProvider::Ollama),
            "openai" => Ok(LlmProvider::OpenAI),
            "openrouter" => Ok(LlmProvider::OpenRouter),
            other => Err(anyhow!("Unknown LLM provider '{}'", other)),
        }
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmProvider::Ollama => write!(f, "ollama"),
            LlmProvider::OpenAI => write!(f, "openai"),
            LlmProvider::OpenRouter => write!(f, "openrouter"),
        }
    }
}

/// Connection settings for the text-generation service
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub model: String,
    pub api_key: String,
    pub endpoint_url: String,
}

/// Build an LLM configuration from explicit overrides, then environment variables,
/// then provider defaults.
pub fn get_llm_config(provider: Option<&str>, model: Option<&str>) -> Result<LlmConfig> {
    let provider: LlmProvider = match provider {
        Some(p) => p.parse()?,
        None => match env::var("LLM_PROVIDER") {
            Ok(p) => p.parse()?,
            Err(_) => LlmProvider::Ollama,
        },
    };

    let model = model
        .map(str::to_string)
        .or_else(|| env::var("LLM_MODEL").ok())
        .unwrap_or_else(|| provider.default_model());

    let api_key = env::var("LLM_API_KEY")
        .ok()
        .or_else(|| provider.api_key_var().and_then(|var| env::var(var).ok()))
        .unwrap_or_default();

    let endpoint_url = env::var("LLM_ENDPOINT_URL").unwrap_or_else(|_| provider.default_endpoint());

    Ok(LlmConfig {
        provider,
        model,
        api_key,
        endpoint_url,
    })
}

/// Connection settings for the graph store's HTTP endpoint
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl StoreConfig {
    pub fn from_env() -> Self {
        Self {
            uri: env::var("NEO4J_URI").unwrap_or_else(|_| "http://localhost:7474".into()),
            user: env::var("NEO4J_USER").unwrap_or_else(|_| "neo4j".into()),
            password: env::var("NEO4J_PASSWORD").unwrap_or_else(|_| "password".into()),
            database: env::var("NEO4J_DATABASE").unwrap_or_else(|_| "neo4j".into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.row_cap, 20);
        assert!(config.query_temperature < config.synthesis_temperature);
    }

    #[test]
    fn test_provider_parsing() {
        assert_eq!("Ollama".parse::<LlmProvider>().unwrap(), LlmProvider::Ollama);
        assert_eq!("openrouter".parse::<LlmProvider>().unwrap(), LlmProvider::OpenRouter);
        assert!("bard".parse::<LlmProvider>().is_err());
    }

    #[test]
    fn test_explicit_overrides_win() {
        let config = get_llm_config(Some("openai"), Some("gpt-test")).unwrap();
        assert_eq!(config.provider, LlmProvider::OpenAI);
        assert_eq!(config.model, "gpt-test");
    }
}
