//! Batch composition.
//!
//! Turns a caller's list of logical queries into one [`Batch`], keeping
//! submission order and formatting `readIn` id lists.

use std::collections::HashSet;
use std::fmt::Display;

use crate::{
    error::{BatchLinkError, Result},
    models::{ActionKind, Batch, OperationDescriptor, Pagination, DEFAULT_CRUD_MESSAGE},
};

/// Builder for a single [`Batch`].
///
/// # Examples
///
/// ```rust
/// use batch_link::BatchComposer;
///
/// let batch = BatchComposer::new()
///     .read_exact("Parent", "parent", [("parentStatus", "active")])
///     .read_in("Child", "child", "childParentId", [1, 2, 3])
///     .build()
///     .unwrap();
///
/// assert_eq!(batch.labels().collect::<Vec<_>>(), vec!["Parent", "Child"]);
/// ```
#[derive(Debug, Clone)]
pub struct BatchComposer {
    operations: Vec<OperationDescriptor>,
    pagination: Pagination,
    crud_message: String,
}

impl Default for BatchComposer {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchComposer {
    pub fn new() -> Self {
        Self {
            operations: Vec::new(),
            pagination: Pagination::default(),
            crud_message: DEFAULT_CRUD_MESSAGE.to_string(),
        }
    }

    /// Append an already-built descriptor
    pub fn push(mut self, operation: OperationDescriptor) -> Self {
        self.operations.push(operation);
        self
    }

    /// Rows of `resource` matching every field by equality
    pub fn read_exact<K, V, I>(self, label: &str, resource: &str, fields: I) -> Self
    where
        K: Into<String>,
        V: ToString,
        I: IntoIterator<Item = (K, V)>,
    {
        self.push(OperationDescriptor::new(label, resource, ActionKind::ReadExact).with_fields(fields))
    }

    /// Rows of `resource` whose `field` is one of `ids`
    pub fn read_in<T, I>(self, label: &str, resource: &str, field: &str, ids: I) -> Self
    where
        T: Display,
        I: IntoIterator<Item = T>,
    {
        self.push(
            OperationDescriptor::new(label, resource, ActionKind::ReadIn)
                .with_field(field, format_id_list(ids)),
        )
    }

    /// Invoke a stored procedure
    pub fn procedure<K, V, I>(self, label: &str, procedure: &str, params: I) -> Self
    where
        K: Into<String>,
        V: ToString,
        I: IntoIterator<Item = (K, V)>,
    {
        self.push(OperationDescriptor::new(label, procedure, ActionKind::Procedure).with_fields(params))
    }

    pub fn create<K, V, I>(self, label: &str, resource: &str, row: I) -> Self
    where
        K: Into<String>,
        V: ToString,
        I: IntoIterator<Item = (K, V)>,
    {
        self.push(OperationDescriptor::new(label, resource, ActionKind::Create).with_fields(row))
    }

    pub fn update<K, V, I>(self, label: &str, resource: &str, row: I) -> Self
    where
        K: Into<String>,
        V: ToString,
        I: IntoIterator<Item = (K, V)>,
    {
        self.push(OperationDescriptor::new(label, resource, ActionKind::Update).with_fields(row))
    }

    pub fn delete<K, V, I>(self, label: &str, resource: &str, key: I) -> Self
    where
        K: Into<String>,
        V: ToString,
        I: IntoIterator<Item = (K, V)>,
    {
        self.push(OperationDescriptor::new(label, resource, ActionKind::Delete).with_fields(key))
    }

    pub fn pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = pagination;
        self
    }

    pub fn page(mut self, page_number: u32, page_size: u32) -> Self {
        self.pagination = Pagination {
            page_number,
            page_size,
        };
        self
    }

    /// Opaque continuation token, sent unchanged
    pub fn crud_message(mut self, message: impl Into<String>) -> Self {
        self.crud_message = message.into();
        self
    }

    /// Finish the batch.
    ///
    /// Fails on invalid pagination or on two operations sharing a label,
    /// since results are located by label. An empty batch is valid.
    pub fn build(self) -> Result<Batch> {
        self.pagination.validate()?;

        let mut seen = HashSet::with_capacity(self.operations.len());
        for op in &self.operations {
            if op.label.is_empty() {
                return Err(BatchLinkError::InvalidBatch(format!(
                    "operation on '{}' has an empty label",
                    op.resource
                )));
            }
            if !seen.insert(op.label.as_str()) {
                return Err(BatchLinkError::InvalidBatch(format!(
                    "duplicate label '{}'",
                    op.label
                )));
            }
        }

        Ok(Batch {
            operations: self.operations,
            pagination: self.pagination,
            crud_message: self.crud_message,
        })
    }
}

/// Format ids for a `readIn` field: `(a,b,c)`.
///
/// Input order is kept and repeated ids are dropped (they would otherwise
/// produce duplicate join matches). No ids gives `()`.
pub fn format_id_list<T, I>(ids: I) -> String
where
    T: Display,
    I: IntoIterator<Item = T>,
{
    let mut seen = HashSet::new();
    let mut parts = Vec::new();
    for id in ids {
        let id = id.to_string();
        if seen.insert(id.clone()) {
            parts.push(id);
        }
    }
    format!("({})", parts.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_id_list() {
        assert_eq!(format_id_list([3, 1, 2]), "(3,1,2)");
        assert_eq!(format_id_list(["a", "b", "a", "c", "b"]), "(a,b,c)");
        assert_eq!(format_id_list(Vec::<u32>::new()), "()");
        assert_eq!(format_id_list([42]), "(42)");
    }

    #[test]
    fn test_composer_preserves_order() {
        let batch = BatchComposer::new()
            .procedure("Stats", "usp_GetStats", [("year", 2024)])
            .read_exact("Company", "company", [("companyId", 9)])
            .delete("Drop", "note", [("noteId", 3)])
            .create("Add", "note", [("noteText", "hello")])
            .update("Edit", "note", [("noteId", "4"), ("noteText", "bye")])
            .build()
            .unwrap();

        let labels: Vec<&str> = batch.labels().collect();
        assert_eq!(labels, vec!["Stats", "Company", "Drop", "Add", "Edit"]);
        assert_eq!(batch.operations[0].action, ActionKind::Procedure);
        assert_eq!(batch.operations[2].action, ActionKind::Delete);
        assert_eq!(batch.operations[4].fields.len(), 2);
    }

    #[test]
    fn test_read_in_fields() {
        let batch = BatchComposer::new()
            .read_in("Child", "child", "childParentId", [1, 2, 2, 3])
            .build()
            .unwrap();

        let op = batch.operation("Child").unwrap();
        assert_eq!(op.action, ActionKind::ReadIn);
        assert_eq!(op.fields.get("childParentId").map(String::as_str), Some("(1,2,3)"));
    }

    #[test]
    fn test_numeric_fields_are_strings() {
        let batch = BatchComposer::new()
            .read_exact("Company", "company", [("companyId", 12)])
            .build()
            .unwrap();

        assert_eq!(
            batch.operations[0].fields.get("companyId").map(String::as_str),
            Some("12")
        );
    }

    #[test]
    fn test_empty_batch_is_valid() {
        let batch = BatchComposer::new().build().unwrap();
        assert!(batch.is_empty());
    }

    #[test]
    fn test_duplicate_label_rejected() {
        let result = BatchComposer::new()
            .read_exact("Company", "company", [("companyId", 1)])
            .read_exact("Company", "company", [("companyId", 2)])
            .build();

        assert!(matches!(result, Err(BatchLinkError::InvalidBatch(_))));
    }

    #[test]
    fn test_invalid_page_rejected() {
        let result = BatchComposer::new().page(0, 20).build();
        assert!(result.is_err());

        let batch = BatchComposer::new().page(3, 25).crud_message("cursor-9").build().unwrap();
        assert_eq!(batch.pagination, Pagination::new(3, 25).unwrap());
        assert_eq!(batch.crud_message, "cursor-9");
    }
}
