//! Data models for the batch-link client library.
//!
//! Defines the caller-side batch structures, the wire request/response
//! bodies, and the decoded row types.

pub mod action_kind;
pub mod batch;
pub mod batch_request;
pub mod batch_response;
pub mod http_version;
pub mod operation_descriptor;
pub mod pagination;
pub mod row;
pub mod row_set;


pub use action_kind::ActionKind;
pub use batch::{Batch, DEFAULT_CRUD_MESSAGE};
pub use batch_request::BatchRequest;
pub use batch_response::{BatchEntry, BatchResponse};
pub use http_version::HttpVersion;
pub use operation_descriptor::OperationDescriptor;
pub use pagination::{Pagination, DEFAULT_PAGE_SIZE};
pub use row::{key_string, Row, SENTINEL_KEY};
pub use row_set::{RowSet, TableData};
