use serde::{Deserialize, Deserializer, Serialize};

/// Raw reply to a batch call: `{ "Data": [ { "JsonData": "<json text>" }, ... ] }`.
///
/// Each `JsonData` is itself a serialized document, so getting at rows takes
/// a second parse; see [`ResponseDecoder`](crate::ResponseDecoder).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResponse {
    #[serde(rename = "Data", default, deserialize_with = "null_as_empty")]
    pub entries: Vec<BatchEntry>,
}

/// One slot of a batch reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchEntry {
    /// Present only when the backend echoes the caller's label
    #[serde(
        rename = "Label",
        alias = "label",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub label: Option<String>,

    /// Serialized inner document
    #[serde(rename = "JsonData")]
    pub payload: String,
}

impl BatchEntry {
    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            label: None,
            payload: payload.into(),
        }
    }

    pub fn labelled(label: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            payload: payload.into(),
        }
    }
}

impl BatchResponse {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<BatchEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<BatchEntry>>::deserialize(deserializer)?.unwrap_or_default())
}
