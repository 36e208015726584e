use crate::{FeedError, FeedResult};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Risk score above which an event is flagged as critical.
pub const CRITICAL_RISK_SCORE: f64 = 0.8;

/// One server-pushed record. Opaque: every field is kept as received,
/// the well-known ones are exposed through typed accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeedEvent(Map<String, Value>);

impl FeedEvent {
    /// Parse one message. Anything other than a JSON object is malformed.
    pub fn parse(text: &str) -> FeedResult<Self> {
        match serde_json::from_str::<Value>(text)? {
            Value::Object(fields) => Ok(Self(fields)),
            other => Err(FeedError::parse(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    pub fn label(&self) -> Option<&str> {
        self.str_field("label")
    }

    pub fn url(&self) -> Option<&str> {
        self.str_field("url")
    }

    pub fn title(&self) -> Option<&str> {
        self.str_field("title")
    }

    /// Raw timestamp as sent by the server (ISO-8601 in practice).
    pub fn timestamp(&self) -> Option<&str> {
        self.str_field("timestamp")
    }

    pub fn risk_score(&self) -> Option<f64> {
        self.0.get("risk_score").and_then(Value::as_f64)
    }

    pub fn csam_flag(&self) -> bool {
        self.0
            .get("csam_flag")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn entities(&self) -> Option<&Value> {
        self.0.get("entities")
    }

    /// Up to `per_kind` string values from each entity group, in order.
    pub fn entity_tags(&self, per_kind: usize) -> Vec<&str> {
        let Some(Value::Object(groups)) = self.entities() else {
            return Vec::new();
        };

        groups
            .values()
            .filter_map(Value::as_array)
            .flat_map(|values| values.iter().filter_map(Value::as_str).take(per_kind))
            .collect()
    }

    /// Advisory display flag; never used to filter the window.
    pub fn is_critical(&self) -> bool {
        self.risk_score().is_some_and(|score| score > CRITICAL_RISK_SCORE) || self.csam_flag()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }
}

impl From<Map<String, Value>> for FeedEvent {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
