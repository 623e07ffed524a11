pub mod llm_integration;
pub mod schema;
