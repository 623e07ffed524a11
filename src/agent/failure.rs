/// Builds the terminal apology when every execution attempt failed.
/// Never calls the model.
#[derive(Debug, Clone, Copy)]
pub struct FailureHandler {
    max_retries: u32,
}

impl FailureHandler {
    pub fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }

    pub fn handle_failure(&self, question: &str, last_error: Option<&str>) -> String {
        tracing::warn!(
            "Giving up on '{}' after {} attempts",
            question,
            self.max_retries
        );

        format!(
            "I'm sorry, I couldn't process your query after {} attempts. \
             The last error was: {}. \
             Please try rephrasing your question or ask for help with the specific query.",
            self.max_retries,
            last_error.unwrap_or("Unknown error")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_names_attempts_and_error() {
        let message = FailureHandler::new(3)
            .handle_failure("Show cracks", Some("Unknown function 'cnt'"));
        assert!(message.contains("after 3 attempts"));
        assert!(message.contains("Unknown function 'cnt'"));
    }

    #[test]
    fn test_missing_error_text() {
        let message = FailureHandler::new(2).handle_failure("Show cracks", None);
        assert!(message.contains("Unknown error"));
    }
}
