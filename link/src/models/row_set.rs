use serde::{Deserialize, Serialize};

use super::row::Row;

/// Decoded `TableData`, before it is exposed as a [`RowSet`].
///
/// Keeps "the backend said there is nothing" apart from real rows so that
/// sentinel text can never be correlated as data.
#[derive(Debug, Clone, PartialEq)]
pub enum TableData {
    /// Only sentinels (or nothing at all). Carries the first sentinel's text.
    Empty { message: Option<String> },
    /// At least one real row; sentinels already removed
    Rows(Vec<Row>),
}

impl TableData {
    /// Split raw rows into data and sentinels.
    pub fn from_rows(rows: Vec<Row>) -> Self {
        let mut message = None;
        let mut data = Vec::with_capacity(rows.len());
        for row in rows {
            match row.sentinel_message() {
                Some(text) => {
                    if message.is_none() {
                        message = Some(text.to_string());
                    }
                },
                None => data.push(row),
            }
        }
        if data.is_empty() {
            TableData::Empty { message }
        } else {
            TableData::Rows(data)
        }
    }

    pub fn into_row_set(self, label: impl Into<String>) -> RowSet {
        match self {
            TableData::Empty { message } => RowSet {
                label: label.into(),
                rows: Vec::new(),
                notice: message,
            },
            TableData::Rows(rows) => RowSet {
                label: label.into(),
                rows,
                notice: None,
            },
        }
    }
}

/// The sentinel-free result of one operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawRowSet")]
pub struct RowSet {
    pub label: String,
    pub rows: Vec<Row>,
    /// Backend text that came instead of rows (e.g. "No data found")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

/// Serialized RowSet as read back from a cache or file; rows may still hold sentinels.
#[derive(Deserialize)]
struct RawRowSet {
    label: String,
    #[serde(default)]
    rows: Vec<Row>,
    #[serde(default)]
    notice: Option<String>,
}

impl From<RawRowSet> for RowSet {
    fn from(raw: RawRowSet) -> Self {
        let mut set = TableData::from_rows(raw.rows).into_row_set(raw.label);
        if set.rows.is_empty() && set.notice.is_none() {
            set.notice = raw.notice;
        }
        set
    }
}

impl RowSet {
    pub fn empty(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            rows: Vec::new(),
            notice: None,
        }
    }

    pub fn new(label: impl Into<String>, rows: Vec<Row>) -> Self {
        TableData::from_rows(rows).into_row_set(label)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    pub fn first(&self) -> Option<&Row> {
        self.rows.first()
    }

    pub fn get(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    /// Stringified values of one column, skipping nulls and missing fields
    pub fn column_keys(&self, field: &str) -> Vec<String> {
        self.rows.iter().filter_map(|row| row.get_string(field)).collect()
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }
}

impl<'a> IntoIterator for &'a RowSet {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
