use serde::{Deserialize, Serialize};

use super::{batch::Batch, operation_descriptor::OperationDescriptor};

/// Wire body of a batch call.
///
/// `data` holds the operations serialized to a JSON string, and the
/// pagination fields are string-encoded integers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRequest {
    pub data: String,

    #[serde(rename = "PageNo")]
    pub page_no: String,

    #[serde(rename = "NoOfLines")]
    pub no_of_lines: String,

    #[serde(rename = "CrudMessage")]
    pub crud_message: String,
}

impl BatchRequest {
    pub fn from_batch(batch: &Batch) -> Result<Self, serde_json::Error> {
        Ok(Self {
            data: serde_json::to_string(&batch.operations)?,
            page_no: batch.pagination.page_number.to_string(),
            no_of_lines: batch.pagination.page_size.to_string(),
            crud_message: batch.crud_message.clone(),
        })
    }

    /// Parse `data` back into operations (used by fakes and diagnostics)
    pub fn operations(&self) -> Result<Vec<OperationDescriptor>, serde_json::Error> {
        serde_json::from_str(&self.data)
    }

    /// `(PageNo, NoOfLines)` parsed back to integers, if well-formed
    pub fn page(&self) -> Option<(u32, u32)> {
        Some((self.page_no.parse().ok()?, self.no_of_lines.parse().ok()?))
    }
}
