use serde::{Deserialize, Serialize};

use super::{operation_descriptor::OperationDescriptor, pagination::Pagination};

/// Placeholder sent as `CrudMessage` when the caller has nothing to pass through.
pub const DEFAULT_CRUD_MESSAGE: &str = "@CrudMessage";

/// An ordered list of operations sent in one network call.
///
/// Built fresh for every logical fetch, usually through
/// [`BatchComposer`](crate::BatchComposer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    pub operations: Vec<OperationDescriptor>,
    pub pagination: Pagination,
    /// Opaque continuation token, passed through unchanged
    pub crud_message: String,
}

impl Default for Batch {
    fn default() -> Self {
        Self {
            operations: Vec::new(),
            pagination: Pagination::default(),
            crud_message: DEFAULT_CRUD_MESSAGE.to_string(),
        }
    }
}

impl Batch {
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Labels in submission order
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.operations.iter().map(|op| op.label.as_str())
    }

    pub fn operation(&self, label: &str) -> Option<&OperationDescriptor> {
        self.operations.iter().find(|op| op.label == label)
    }

    /// Copy of this batch asking for a different page. The original is untouched.
    pub fn with_pagination(&self, pagination: Pagination) -> Self {
        Self {
            operations: self.operations.clone(),
            pagination,
            crud_message: self.crud_message.clone(),
        }
    }
}
