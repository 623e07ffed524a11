use std::sync::Arc;
use std::time::Duration;

use crate::config::PipelineConfig;
use crate::error::LlmError;
use crate::prompt::llm_integration::{GenerationParams, TextGenerator};
use crate::prompt::schema::{FEW_SHOT_EXAMPLES, GRAPH_SCHEMA};

use super::fence::{extract_query, Extraction};

/// Translates natural language questions into graph queries
pub struct QueryGenerator {
    llm: Arc<dyn TextGenerator>,
    params: GenerationParams,
    timeout: Duration,
}

impl QueryGenerator {
    pub fn new(llm: Arc<dyn TextGenerator>, config: &PipelineConfig) -> Self {
        Self {
            llm,
            params: GenerationParams {
                temperature: config.query_temperature,
                max_tokens: config.query_max_tokens,
            },
            timeout: config.llm_timeout,
        }
    }

    /// Generate a query for `question`.
    ///
    /// When `last_error` is set, the prompt asks the model to correct
    /// `previous_query`. Any failure of the model call is returned as-is and is
    /// not subject to self-correction.
    pub async fn generate(
        &self,
        question: &str,
        last_error: Option<&str>,
        previous_query: &str,
    ) -> Result<String, LlmError> {
        let prompt = build_generation_prompt(question, last_error, previous_query);

        let response = tokio::time::timeout(self.timeout, self.llm.complete(&prompt, self.params))
            .await
            .map_err(|_| LlmError::Timeout(self.timeout))??;

        let (query, extraction) = extract_query(&response);
        if extraction == Extraction::Unbalanced {
            tracing::warn!("Model response had an unclosed code fence, using the raw text");
        }

        Ok(query)
    }
}

/// Build the query-generation prompt: schema, worked examples, optional
/// correction block, then the question itself.
pub fn build_generation_prompt(
    question: &str,
    last_error: Option<&str>,
    previous_query: &str,
) -> String {
    let error_context = match last_error.filter(|e| !e.is_empty()) {
        Some(error) => format!(
            r#"
## Previous Query Error
Your previous query failed with error: {}
Previous query was: {}

Please fix the query and try again. Common issues:
- Use correct property names from the schema
- Check relationship directions
- Ensure proper Cypher syntax
"#,
            error,
            if previous_query.is_empty() {
                "N/A"
            } else {
                previous_query
            }
        ),
        None => String::new(),
    };

    format!(
        r#"You are a Neo4j Cypher expert for a Railway Anomaly Detection system.

{}
{}
## Instructions
1. Generate ONLY valid Cypher queries based on the schema above.
2. Always return useful fields like id, type, severity, coordinates (lat, lng), and timestamps.
3. Use proper property names as shown in the schema (e.g., anomaly_type, not defect_type).
4. For track references by number (like "Track 5"), search both track_id (CONTAINS '005') and name (CONTAINS '5').
5. Always ORDER results meaningfully (by severity, date, or count).
6. Return ONLY the Cypher query, no explanations.
{}
## Question
{}
"#,
        GRAPH_SCHEMA, FEW_SHOT_EXAMPLES, error_context, question
    )
}
