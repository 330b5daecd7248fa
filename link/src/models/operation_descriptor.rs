use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::action_kind::ActionKind;

/// One named operation inside a batch.
///
/// `fields` values are always strings on the wire, including numeric ids
/// and the `(1,2,3)` lists used by [`ActionKind::ReadIn`].
///
/// # Examples
///
/// ```rust
/// use batch_link::{ActionKind, OperationDescriptor};
///
/// let op = OperationDescriptor::new("Company", "company", ActionKind::ReadExact)
///     .with_field("companyId", 42);
/// assert_eq!(op.fields.get("companyId").map(String::as_str), Some("42"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationDescriptor {
    /// Caller-chosen name used to find this operation's result
    pub label: String,

    /// Physical table or stored procedure name
    pub resource: String,

    pub action: ActionKind,

    /// Untyped parameters, transmitted as strings
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

impl OperationDescriptor {
    pub fn new(label: impl Into<String>, resource: impl Into<String>, action: ActionKind) -> Self {
        Self {
            label: label.into(),
            resource: resource.into(),
            action,
            fields: BTreeMap::new(),
        }
    }

    /// Add a parameter; the value is stringified.
    pub fn with_field(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.fields.insert(name.into(), value.to_string());
        self
    }

    /// Add many parameters at once.
    pub fn with_fields<K, V, I>(mut self, fields: I) -> Self
    where
        K: Into<String>,
        V: ToString,
        I: IntoIterator<Item = (K, V)>,
    {
        for (name, value) in fields {
            self.fields.insert(name.into(), value.to_string());
        }
        self
    }
}
