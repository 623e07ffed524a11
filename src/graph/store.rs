use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use reqwest::Client;
use serde_json::Value;

use crate::config::StoreConfig;
use crate::error::StoreError;

use super::value::{Record, StoreValue};

/// Named parameters bound into a structured query
pub type QueryParams = serde_json::Map<String, Value>;

/// Read access to the graph store: run one structured query, get its rows.
#[async_trait]
pub trait GraphStore: Send + Sync {
    async fn run(&self, query: &str, params: &QueryParams) -> Result<Vec<Record>, StoreError>;

    /// Check that the store is reachable and accepts queries
    async fn ping(&self) -> Result<(), StoreError> {
        self.run("RETURN 1 AS ok", &QueryParams::new())
            .await
            .map(|_| ())
    }
}

/// Graph store backed by the Neo4j HTTP transactional endpoint.
///
/// The underlying client keeps a connection pool; each `run` borrows one
/// connection for the duration of a single request.
pub struct Neo4jHttpStore {
    client: Client,
    config: StoreConfig,
}

impl std::fmt::Debug for Neo4jHttpStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Neo4jHttpStore")
            .field("uri", &self.config.uri)
            .field("database", &self.config.database)
            .finish()
    }
}

impl Neo4jHttpStore {
    pub fn new(config: StoreConfig) -> Result<Self, StoreError> {
        let client = Client::builder().build()?;
        Ok(Self { client, config })
    }

    fn commit_url(&self) -> String {
        format!(
            "{}/db/{}/tx/commit",
            self.config.uri.trim_end_matches('/'),
            self.config.database
        )
    }
}

#[async_trait]
impl GraphStore for Neo4jHttpStore {
    async fn run(&self, query: &str, params: &QueryParams) -> Result<Vec<Record>, StoreError> {
        let body = serde_json::json!({
            "statements": [{
                "statement": query,
                "parameters": params,
                "resultDataContents": ["row"]
            }]
        });

        let res = self
            .client
            .post(self.commit_url())
            .basic_auth(&self.config.user, Some(&self.config.password))
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(StoreError::Status { status, body });
        }

        let json: Value = res.json().await?;
        decode_commit_response(&json)
    }
}

/// Turn a transactional-endpoint response into records, surfacing the first
/// reported statement error as a query error.
fn decode_commit_response(json: &Value) -> Result<Vec<Record>, StoreError> {
    if let Some(error) = json["errors"].as_array().and_then(|errors| errors.first()) {
        let message = error["message"]
            .as_str()
            .or_else(|| error["code"].as_str())
            .unwrap_or("Unknown store error");
        return Err(StoreError::Query(message.to_string()));
    }

    let result = json["results"]
        .as_array()
        .and_then(|results| results.first())
        .ok_or_else(|| StoreError::InvalidResponse("missing results".to_string()))?;

    let columns: Vec<String> = result["columns"]
        .as_array()
        .ok_or_else(|| StoreError::InvalidResponse("missing columns".to_string()))?
        .iter()
        .map(|c| c.as_str().unwrap_or_default().to_string())
        .collect();

    let data = result["data"].as_array().cloned().unwrap_or_default();
    let mut records = Vec::with_capacity(data.len());

    for entry in &data {
        let row = entry["row"]
            .as_array()
            .ok_or_else(|| StoreError::InvalidResponse("data entry without row".to_string()))?;
        let meta = entry["meta"].as_array();

        let mut record = Record::new();
        for (i, column) in columns.iter().enumerate() {
            let value = row.get(i).unwrap_or(&Value::Null);
            let value_meta = meta.and_then(|m| m.get(i)).unwrap_or(&Value::Null);
            record = record.with(column.clone(), decode_value(value, value_meta));
        }
        records.push(record);
    }

    Ok(records)
}

/// Rebuild a store-native value from a row entry and its type metadata
fn decode_value(value: &Value, meta: &Value) -> StoreValue {
    if let (Some(items), Some(metas)) = (value.as_array(), meta.as_array()) {
        return StoreValue::List(
            items
                .iter()
                .enumerate()
                .map(|(i, item)| decode_value(item, metas.get(i).unwrap_or(&Value::Null)))
                .collect(),
        );
    }

    let element_id = meta["elementId"]
        .as_str()
        .map(str::to_string)
        .or_else(|| meta["id"].as_i64().map(|id| id.to_string()));

    match meta["type"].as_str() {
        Some("node") => StoreValue::Node {
            id: element_id,
            properties: decode_properties(value),
        },
        Some("relationship") => StoreValue::Relationship {
            id: element_id,
            properties: decode_properties(value),
        },
        Some(kind) => value
            .as_str()
            .and_then(|s| decode_temporal(kind, s))
            .unwrap_or_else(|| decode_plain(value)),
        None => decode_plain(value),
    }
}

fn decode_temporal(kind: &str, s: &str) -> Option<StoreValue> {
    match kind {
        "datetime" => {
            // zoned values carry a trailing region id, e.g. `...+01:00[Europe/London]`
            let s = s.split('[').next().unwrap_or(s);
            DateTime::parse_from_rfc3339(s).ok().map(StoreValue::DateTime)
        }
        "localdatetime" => NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(StoreValue::LocalDateTime),
        "date" => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .map(StoreValue::Date),
        "localtime" => NaiveTime::parse_from_str(s, "%H:%M:%S%.f")
            .ok()
            .map(StoreValue::Time),
        _ => None,
    }
}

fn decode_properties(value: &Value) -> Vec<(String, StoreValue)> {
    value
        .as_object()
        .map(|props| {
            props
                .iter()
                .map(|(k, v)| (k.clone(), decode_plain(v)))
                .collect()
        })
        .unwrap_or_default()
}

fn decode_plain(value: &Value) -> StoreValue {
    match value {
        Value::Null => StoreValue::Null,
        Value::Bool(b) => StoreValue::Bool(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => StoreValue::Int(i),
            None => StoreValue::Float(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => StoreValue::String(s.clone()),
        Value::Array(items) => StoreValue::List(items.iter().map(decode_plain).collect()),
        Value::Object(map) => StoreValue::Map(
            map.iter()
                .map(|(k, v)| (k.clone(), decode_plain(v)))
                .collect(),
        ),
    }
}
