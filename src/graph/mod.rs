pub mod store;
pub mod value;

// Re-export the store seam for convenience
pub use crate::graph::store::{GraphStore, Neo4jHttpStore, QueryParams};
pub use crate::graph::value::{Record, StoreValue};
