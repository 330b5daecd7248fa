use serde::{Deserialize, Serialize};
use std::fmt;

/// What the backend should do with one operation.
///
/// Serialized in camelCase (`"readExact"`, `"readIn"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionKind {
    /// Invoke a named server routine
    Procedure,
    /// Rows matching equality on every field
    ReadExact,
    /// Rows whose field is a member of a parenthesized id list
    ReadIn,
    /// Insert the row carried in `fields`
    Create,
    /// Update the row identified in `fields`
    Update,
    /// Delete the row identified in `fields`
    Delete,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Procedure => "procedure",
            ActionKind::ReadExact => "readExact",
            ActionKind::ReadIn => "readIn",
            ActionKind::Create => "create",
            ActionKind::Update => "update",
            ActionKind::Delete => "delete",
        }
    }

    /// True for create/update/delete
    pub fn is_mutation(&self) -> bool {
        matches!(self, ActionKind::Create | ActionKind::Update | ActionKind::Delete)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
