mod executor;
mod fence;
mod generator;

pub use executor::{normalize_record, normalize_value, QueryExecutor, Row};
pub use fence::{extract_query, Extraction};
pub use generator::{build_generation_prompt, QueryGenerator};
