use std::pin::Pin;

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use reqwest::{Client, Response};
use serde_json::Value;

use crate::config::{LlmConfig, LlmProvider};
use crate::error::LlmError;

/// Incremental text output of a streaming completion.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, LlmError>> + Send + 'static>>;

/// Sampling parameters for a single completion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

/// A text-generation backend.
///
/// Implementations are stateless between calls, so one instance can serve any
/// number of concurrent requests.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Produce the whole completion for `prompt` in one call
    async fn complete(&self, prompt: &str, params: GenerationParams) -> Result<String, LlmError>;

    /// Produce the completion as a lazy sequence of fragments.
    ///
    /// Dropping the returned stream stops any further reads from the backend.
    fn stream(&self, prompt: String, params: GenerationParams) -> TextStream;
}

/// Client for any service speaking the OpenAI chat-completions protocol
/// (Ollama, OpenAI, OpenRouter).
#[derive(Clone)]
pub struct ChatCompletionsClient {
    client: Client,
    config: LlmConfig,
}

impl ChatCompletionsClient {
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let client = Client::builder().build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }
}

#[async_trait]
impl TextGenerator for ChatCompletionsClient {
    async fn complete(&self, prompt: &str, params: GenerationParams) -> Result<String, LlmError> {
        tracing::debug!(
            "Sending completion request to {} ({})",
            self.config.provider,
            self.config.model
        );

        let body = build_request_body(&self.config, prompt, params, false);
        let res = send_request(&self.client, &self.config, &body).await?;
        let json: Value = res.json().await?;
        extract_message_content(&json)
    }

    fn stream(&self, prompt: String, params: GenerationParams) -> TextStream {
        let client = self.client.clone();
        let config = self.config.clone();

        Box::pin(async_stream::stream! {
            let body = build_request_body(&config, &prompt, params, true);
            let res = match send_request(&client, &config, &body).await {
                Ok(res) => res,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };

            let mut bytes = res.bytes_stream();
            let mut buffer: Vec<u8> = Vec::new();

            while let Some(chunk) = bytes.next().await {
                match chunk {
                    Ok(chunk) => buffer.extend_from_slice(&chunk),
                    Err(e) => {
                        yield Err(LlmError::Http(e));
                        return;
                    }
                }

                while let Some(pos) = buffer.iter().position(|b| *b == b'\n') {
                    let line: Vec<u8> = buffer.drain(..=pos).collect();
                    let line = String::from_utf8_lossy(&line);
                    match parse_sse_line(line.trim()) {
                        Ok(SseChunk::Delta(text)) => yield Ok(text),
                        Ok(SseChunk::Done) => return,
                        Ok(SseChunk::Skip) => {}
                        Err(e) => {
                            yield Err(e);
                            return;
                        }
                    }
                }
            }
        })
    }
}

fn build_request_body(config: &LlmConfig, prompt: &str, params: GenerationParams, stream: bool) -> Value {
    serde_json::json!({
        "model": config.model,
        "messages": [
            {"role": "user", "content": prompt}
        ],
        "temperature": params.temperature,
        "max_tokens": params.max_tokens,
        "stream": stream
    })
}

async fn send_request(client: &Client, config: &LlmConfig, body: &Value) -> Result<Response, LlmError> {
    let mut req = client
        .post(&config.endpoint_url)
        .header("Content-Type", "application/json")
        .json(body);

    if !config.api_key.is_empty() {
        req = req.bearer_auth(&config.api_key);
    }
    if config.provider == LlmProvider::OpenRouter {
        req = req.header("HTTP-Referer", "https://github.com/railgraph/railgraph");
    }

    let res = req.send().await?;

    if !res.status().is_success() {
        let status = res.status().as_u16();
        let body = res
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(LlmError::Status { status, body });
    }

    Ok(res)
}

/// Pull the assistant message out of a non-streaming chat-completions response
fn extract_message_content(json: &Value) -> Result<String, LlmError> {
    if let Some(choice) = json["choices"].as_array().and_then(|arr| arr.first()) {
        if let Some(msg) = choice["message"]["content"].as_str() {
            return Ok(msg.to_string());
        }
    }

    if let Some(message) = json["error"]["message"].as_str() {
        return Err(LlmError::Api(message.to_string()));
    }

    Err(LlmError::InvalidResponse(
        "missing choices[0].message.content".to_string(),
    ))
}

#[derive(Debug, PartialEq)]
enum SseChunk {
    Delta(String),
    Done,
    Skip,
}

/// Decode one line of a server-sent-events chat-completions stream
fn parse_sse_line(line: &str) -> Result<SseChunk, LlmError> {
    let Some(data) = line.strip_prefix("data:") else {
        // blank separators, comments and `event:` lines
        return Ok(SseChunk::Skip);
    };

    let data = data.trim();
    if data == "[DONE]" {
        return Ok(SseChunk::Done);
    }

    let json: Value = serde_json::from_str(data)
        .map_err(|e| LlmError::InvalidResponse(format!("bad stream chunk: {}", e)))?;

    if let Some(message) = json["error"]["message"].as_str() {
        return Err(LlmError::Api(message.to_string()));
    }

    match json["choices"][0]["delta"]["content"].as_str() {
        Some(text) if !text.is_empty() => Ok(SseChunk::Delta(text.to_string())),
        _ => Ok(SseChunk::Skip),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_message_content() {
        let response = json!({
            "choices": [{"message": {"role": "assistant", "content": "MATCH (n) RETURN n"}}]
        });
        assert_eq!(
            extract_message_content(&response).unwrap(),
            "MATCH (n) RETURN n"
        );

        let error = json!({"error": {"message": "quota exceeded"}});
        match extract_message_content(&error) {
            Err(LlmError::Api(msg)) => assert_eq!(msg, "quota exceeded"),
            other => panic!("expected API error, got {:?}", other),
        }

        assert!(matches!(
            extract_message_content(&json!({})),
            Err(LlmError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_parse_sse_lines() {
        let delta = r#"data: {"choices":[{"delta":{"content":"Three"}}]}"#;
        assert_eq!(parse_sse_line(delta).unwrap(), SseChunk::Delta("Three".into()));

        let role_only = r#"data: {"choices":[{"delta":{"role":"assistant"}}]}"#;
        assert_eq!(parse_sse_line(role_only).unwrap(), SseChunk::Skip);

        assert_eq!(parse_sse_line("data: [DONE]").unwrap(), SseChunk::Done);
        assert_eq!(parse_sse_line("").unwrap(), SseChunk::Skip);
        assert_eq!(parse_sse_line(": keep-alive").unwrap(), SseChunk::Skip);
        assert!(parse_sse_line("data: {not json").is_err());
    }

    #[test]
    fn test_request_body_carries_params() {
        let config = LlmConfig {
            provider: LlmProvider::Ollama,
            model: "llama3".to_string(),
            api_key: String::new(),
            endpoint_url: "http://localhost:11434/v1/chat/completions".to_string(),
        };
        let params = GenerationParams {
            temperature: 0.1,
            max_tokens: 256,
        };

        let body = build_request_body(&config, "hello", params, true);
        assert_eq!(body["model"], "llama3");
        assert_eq!(body["max_tokens"], 256);
        assert_eq!(body["stream"], true);
        assert_eq!(body["messages"][0]["content"], "hello");
    }
}
