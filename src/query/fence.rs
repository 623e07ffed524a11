//! Extraction of a query from model output that may be wrapped in a
//! Markdown code fence.
//!
//! Grammar: `[preamble] "```" [lang-tag NEWLINE] content "```" [trailer]`.
//! Both fences must be present; when the opening fence has no matching
//! closing fence the whole trimmed response is used instead.

const FENCE: &str = "```";

/// Tags stripped even when the query follows on the same line
const QUERY_TAGS: &[&str] = &["cypher", "neo4j", "cql"];

/// How the query text was obtained from the raw response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extraction {
    /// Content of a balanced code fence
    Fenced,
    /// No fence present, the trimmed response as-is
    Raw,
    /// An opening fence without a closing one; fell back to the trimmed response
    Unbalanced,
}

/// Pull the query out of a model response
pub fn extract_query(response: &str) -> (String, Extraction) {
    let trimmed = response.trim();

    let Some(open) = trimmed.find(FENCE) else {
        return (trimmed.to_string(), Extraction::Raw);
    };

    let after_open = &trimmed[open + FENCE.len()..];
    let body = skip_language_tag(after_open);

    match body.find(FENCE) {
        Some(close) => (body[..close].trim().to_string(), Extraction::Fenced),
        None => (trimmed.to_string(), Extraction::Unbalanced),
    }
}

/// Skip `cypher\n` in "```cypher\nMATCH ...". A known query tag is dropped
/// wherever the line continues; any other identifier-like word only counts as
/// a tag when it sits alone on the first line, so "```MATCH (n) RETURN n```"
/// keeps its content.
fn skip_language_tag(after_open: &str) -> &str {
    if let Some(rest) = strip_query_tag(after_open) {
        return rest;
    }

    let Some(newline) = after_open.find('\n') else {
        return after_open;
    };

    let first_line = after_open[..newline].trim();
    let is_tag = first_line
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+' | '.'));

    if is_tag {
        &after_open[newline + 1..]
    } else {
        after_open
    }
}

fn strip_query_tag(after_open: &str) -> Option<&str> {
    let word_end = after_open.find(char::is_whitespace)?;
    let word = &after_open[..word_end];

    QUERY_TAGS
        .iter()
        .any(|tag| word.eq_ignore_ascii_case(tag))
        .then(|| after_open[word_end..].trim_start())
}
