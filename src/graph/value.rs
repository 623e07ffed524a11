use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};

/// A value as handed back by the graph store, before normalization.
///
/// Temporal values and graph elements are kept as store-native types here;
/// the query executor turns them into plain JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    DateTime(DateTime<FixedOffset>),
    LocalDateTime(NaiveDateTime),
    Date(NaiveDate),
    Time(NaiveTime),
    Node {
        id: Option<String>,
        properties: Vec<(String, StoreValue)>,
    },
    Relationship {
        id: Option<String>,
        properties: Vec<(String, StoreValue)>,
    },
    List(Vec<StoreValue>),
    Map(Vec<(String, StoreValue)>),
}

/// One result record: output columns in the order the query returned them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    pub fields: Vec<(String, StoreValue)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: StoreValue) -> Self {
        self.fields.push((key.into(), value));
        self
    }

    pub fn get(&self, key: &str) -> Option<&StoreValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

impl From<&str> for StoreValue {
    fn from(s: &str) -> Self {
        StoreValue::String(s.to_string())
    }
}

impl From<i64> for StoreValue {
    fn from(n: i64) -> Self {
        StoreValue::Int(n)
    }
}

impl From<f64> for StoreValue {
    fn from(n: f64) -> Self {
        StoreValue::Float(n)
    }
}
