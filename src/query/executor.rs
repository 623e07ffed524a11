use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Number, Value};

use crate::error::StoreError;
use crate::graph::store::{GraphStore, QueryParams};
use crate::graph::value::{Record, StoreValue};

/// One normalized result row: column name to plain JSON value
pub type Row = Map<String, Value>;

/// Runs generated queries against the graph store and normalizes the results
pub struct QueryExecutor {
    store: Arc<dyn GraphStore>,
    timeout: Duration,
}

impl QueryExecutor {
    pub fn new(store: Arc<dyn GraphStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Execute a read-only query. A timeout is reported like any other
    /// execution error.
    pub async fn execute(&self, query: &str) -> Result<Vec<Row>, StoreError> {
        let params = QueryParams::new();
        let records = tokio::time::timeout(self.timeout, self.store.run(query, &params))
            .await
            .map_err(|_| StoreError::Timeout(self.timeout))??;

        Ok(records.iter().map(normalize_record).collect())
    }
}

pub fn normalize_record(record: &Record) -> Row {
    record
        .fields
        .iter()
        .map(|(key, value)| (key.clone(), normalize_value(value)))
        .collect()
}

/// Convert a store value into plain JSON.
///
/// Temporal values become ISO-8601 strings and graph elements become maps of
/// their properties; everything else maps one to one.
pub fn normalize_value(value: &StoreValue) -> Value {
    match value {
        StoreValue::Null => Value::Null,
        StoreValue::Bool(b) => Value::Bool(*b),
        StoreValue::Int(i) => Value::from(*i),
        StoreValue::Float(f) => Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null),
        StoreValue::String(s) => Value::String(s.clone()),
        StoreValue::DateTime(dt) => Value::String(dt.to_rfc3339()),
        StoreValue::LocalDateTime(dt) => {
            Value::String(dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string())
        }
        StoreValue::Date(d) => Value::String(d.format("%Y-%m-%d").to_string()),
        StoreValue::Time(t) => Value::String(t.format("%H:%M:%S%.f").to_string()),
        StoreValue::Node { properties, .. } | StoreValue::Relationship { properties, .. } => {
            normalize_properties(properties)
        }
        StoreValue::List(items) => Value::Array(items.iter().map(normalize_value).collect()),
        StoreValue::Map(entries) => normalize_properties(entries),
    }
}

fn normalize_properties(entries: &[(String, StoreValue)]) -> Value {
    Value::Object(
        entries
            .iter()
            .map(|(k, v)| (k.clone(), normalize_value(v)))
            .collect(),
    )
}
