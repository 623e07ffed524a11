use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;

use crate::config::PipelineConfig;
use crate::error::LlmError;
use crate::prompt::llm_integration::{GenerationParams, TextGenerator, TextStream};
use crate::query::Row;

/// Turns query results into a natural-language answer
pub struct ResponseSynthesizer {
    llm: Arc<dyn TextGenerator>,
    params: GenerationParams,
    row_cap: usize,
    timeout: Duration,
}

impl ResponseSynthesizer {
    pub fn new(llm: Arc<dyn TextGenerator>, config: &PipelineConfig) -> Self {
        Self {
            llm,
            params: GenerationParams {
                temperature: config.synthesis_temperature,
                max_tokens: config.synthesis_max_tokens,
            },
            row_cap: config.row_cap,
            timeout: config.llm_timeout,
        }
    }

    /// Write the answer in one call.
    ///
    /// Always returns a non-empty answer: without rows the model is not
    /// consulted, and a failed model call yields a degraded answer describing
    /// the failure.
    pub async fn synthesize(&self, question: &str, rows: &[Row]) -> String {
        if rows.is_empty() {
            return no_results_message(question);
        }

        let prompt = build_synthesis_prompt(question, &format_rows(rows, self.row_cap));
        let result = tokio::time::timeout(self.timeout, self.llm.complete(&prompt, self.params))
            .await
            .map_err(|_| LlmError::Timeout(self.timeout))
            .and_then(|r| r);

        match result {
            Ok(answer) if !answer.trim().is_empty() => answer.trim().to_string(),
            Ok(_) => degraded_answer(rows.len(), "the model returned an empty response"),
            Err(e) => {
                tracing::error!("Answer synthesis failed: {}", e);
                degraded_answer(rows.len(), &e.to_string())
            }
        }
    }

    /// Write the answer as a lazy sequence of fragments.
    ///
    /// Each fragment must arrive within the configured timeout; a timeout or
    /// backend error is yielded once and ends the sequence.
    pub fn synthesize_stream(&self, question: &str, rows: &[Row]) -> TextStream {
        if rows.is_empty() {
            let message = no_results_message(question);
            return Box::pin(futures::stream::iter(vec![Ok(message)]));
        }

        let prompt = build_synthesis_prompt(question, &format_rows(rows, self.row_cap));
        let mut inner = self.llm.stream(prompt, self.params);
        let timeout = self.timeout;

        Box::pin(async_stream::stream! {
            loop {
                match tokio::time::timeout(timeout, inner.next()).await {
                    Ok(Some(Ok(text))) => yield Ok(text),
                    Ok(Some(Err(e))) => {
                        yield Err(e);
                        return;
                    }
                    Ok(None) => return,
                    Err(_) => {
                        yield Err(LlmError::Timeout(timeout));
                        return;
                    }
                }
            }
        })
    }
}

pub fn no_results_message(question: &str) -> String {
    format!(
        "I couldn't find any results for your query: '{}'. This might mean there's no matching data, \
         or you could try rephrasing your question.",
        question
    )
}

fn degraded_answer(row_count: usize, reason: &str) -> String {
    format!(
        "I found {} matching record(s) but could not summarize them ({}). \
         The raw results are included below.",
        row_count, reason
    )
}

/// Numbered list of the first `cap` rows, plus a count of the rest
pub fn format_rows(rows: &[Row], cap: usize) -> String {
    let mut text = String::new();

    for (i, row) in rows.iter().take(cap).enumerate() {
        let rendered = serde_json::to_string(row).unwrap_or_default();
        text.push_str(&format!("\n{}. {}", i + 1, rendered));
    }

    if rows.len() > cap {
        text.push_str(&format!("\n... and {} more results", rows.len() - cap));
    }

    text
}

fn build_synthesis_prompt(question: &str, results: &str) -> String {
    format!(
        r#"You are a helpful railway maintenance assistant.
Your job is to explain database query results in clear, professional language.

## Guidelines
1. Summarize the key findings from the data.
2. Lead with CRITICAL and HIGH severity issues.
3. Mention specific locations (track names, coordinates) when present.
4. If data shows anomalies, recommend appropriate actions.
5. Format confidence values as percentages (e.g., "87% confidence" not "0.87 confidence").
6. Keep responses concise but informative.

User's question: {}

Query results:
{}

Please provide a helpful, natural language response summarizing these findings."#,
        question, results
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedGenerator;
    use serde_json::json;

    fn rows(n: usize) -> Vec<Row> {
        (0..n)
            .map(|i| {
                json!({"id": format!("ANOM-{}", i), "severity": "HIGH"})
                    .as_object()
                    .cloned()
                    .unwrap()
            })
            .collect()
    }

    #[test]
    fn test_format_rows_caps_and_counts_remainder() {
        let text = format_rows(&rows(23), 20);
        assert!(text.contains("\n1. {\"id\":\"ANOM-0\",\"severity\":\"HIGH\"}"));
        assert!(text.contains("\n20. "));
        assert!(!text.contains("\n21. "));
        assert!(text.ends_with("... and 3 more results"));

        let text = format_rows(&rows(2), 20);
        assert!(!text.contains("more results"));
    }

    #[tokio::test]
    async fn test_empty_rows_skip_the_model() {
        let llm = Arc::new(ScriptedGenerator::new(vec![]));
        let synthesizer = ResponseSynthesizer::new(llm.clone(), &PipelineConfig::default());

        let answer = synthesizer.synthesize("Any broken ties on Track 9?", &[]).await;
        assert!(answer.contains("'Any broken ties on Track 9?'"));
        assert!(llm.calls().is_empty());
    }

    #[tokio::test]
    async fn test_synthesis_prompt_and_params() {
        let llm = Arc::new(ScriptedGenerator::new(vec!["  Two HIGH severity anomalies.  "]));
        let synthesizer = ResponseSynthesizer::new(llm.clone(), &PipelineConfig::default());

        let answer = synthesizer.synthesize("What is urgent?", &rows(2)).await;
        assert_eq!(answer, "Two HIGH severity anomalies.");

        let calls = llm.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].0.contains("User's question: What is urgent?"));
        assert!(calls[0].0.contains("2. {\"id\":\"ANOM-1\""));
        assert!(calls[0].0.contains("percentages"));
        assert_eq!(calls[0].1.temperature, 0.4);
    }

    #[tokio::test]
    async fn test_model_failure_degrades_answer() {
        let llm = Arc::new(ScriptedGenerator::failing("quota exceeded"));
        let synthesizer = ResponseSynthesizer::new(llm, &PipelineConfig::default());

        let answer = synthesizer.synthesize("What is urgent?", &rows(4)).await;
        assert!(answer.contains("4 matching record(s)"));
        assert!(answer.contains("quota exceeded"));
    }

    #[tokio::test]
    async fn test_stream_forwards_fragments() {
        let llm = Arc::new(ScriptedGenerator::new(vec![]).with_stream(vec!["Two ", "cracks."]));
        let synthesizer = ResponseSynthesizer::new(llm, &PipelineConfig::default());

        let fragments: Vec<String> = synthesizer
            .synthesize_stream("q", &rows(2))
            .map(|f| f.unwrap())
            .collect()
            .await;
        assert_eq!(fragments, vec!["Two ", "cracks."]);
    }

    #[tokio::test]
    async fn test_stream_without_rows_is_single_canned_fragment() {
        let llm = Arc::new(ScriptedGenerator::new(vec![]));
        let synthesizer = ResponseSynthesizer::new(llm.clone(), &PipelineConfig::default());

        let fragments: Vec<_> = synthesizer.synthesize_stream("Track 9?", &[]).collect().await;
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].as_ref().unwrap(), &no_results_message("Track 9?"));
        assert_eq!(llm.stream_calls(), 0);
    }
}
