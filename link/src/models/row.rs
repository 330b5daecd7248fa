use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Key of the single field carried by a "no rows" sentinel.
pub const SENTINEL_KEY: &str = "Message";

/// One untyped record. Keys are conventionally `<resource><Field>`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(Map<String, JsonValue>);

impl Row {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn get(&self, field: &str) -> Option<&JsonValue> {
        self.0.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<JsonValue>) {
        self.0.insert(field.into(), value.into());
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &JsonValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the value only when it is a JSON string
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.0.get(field)?.as_str()
    }

    /// Value rendered as text; numbers and booleans are stringified, null is absent
    pub fn get_string(&self, field: &str) -> Option<String> {
        self.0.get(field).and_then(key_string)
    }

    /// Integer from a JSON number or a numeric string
    pub fn get_i64(&self, field: &str) -> Option<i64> {
        match self.0.get(field)? {
            JsonValue::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
            JsonValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Exactly `{ "Message": <string> }`
    pub fn is_sentinel(&self) -> bool {
        self.sentinel_message().is_some()
    }

    pub fn sentinel_message(&self) -> Option<&str> {
        if self.0.len() != 1 {
            return None;
        }
        self.0.get(SENTINEL_KEY)?.as_str()
    }

    pub fn into_inner(self) -> Map<String, JsonValue> {
        self.0
    }
}

impl From<Map<String, JsonValue>> for Row {
    fn from(map: Map<String, JsonValue>) -> Self {
        Self(map)
    }
}

impl From<Row> for JsonValue {
    fn from(row: Row) -> Self {
        JsonValue::Object(row.0)
    }
}

impl<K: Into<String>> FromIterator<(K, JsonValue)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, JsonValue)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Coerce a field value into a comparison key.
///
/// `5`, `5.0` and `"5"` all become `"5"`. Null yields `None` so that a
/// missing foreign key never matches anything.
pub fn key_string(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Bool(b) => Some(b.to_string()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else if let Some(u) = n.as_u64() {
                Some(u.to_string())
            } else {
                match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => Some((f as i64).to_string()),
                    _ => Some(n.to_string()),
                }
            }
        },
        other => Some(other.to_string()),
    }
}
