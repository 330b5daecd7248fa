//! # batch-link
//!
//! Client library for a backend that runs many heterogeneous CRUD and
//! stored-procedure operations in one round trip and answers with
//! doubly-encoded, per-operation JSON payloads.
//!
//! ## Flow
//!
//! 1. Compose a [`Batch`] with [`BatchComposer`] (or [`BatchLinkClient::composer`]).
//! 2. Send it with [`BatchLinkClient::fetch`]; the current bearer token from
//!    the client's [`AuthTokenProvider`] is attached automatically.
//! 3. Read each operation's [`RowSet`] by label from the [`DecodedBatch`].
//!    Sentinel `{ "Message": ... }` rows are already removed and a malformed
//!    payload only empties its own label.
//! 4. Join auxiliary RowSets with [`correlate::join`], which compares keys
//!    as strings and supports versioned alias tables.
//! 5. Optionally hand the result to a sibling page through the
//!    [`SessionCache`].
//!
//! ```rust,no_run
//! use batch_link::{correlate, BatchLinkClient};
//!
//! # async fn example() -> batch_link::Result<()> {
//! let client = BatchLinkClient::builder()
//!     .base_url("http://localhost:8080")
//!     .bearer_token("eyJhbGc...")
//!     .build()?;
//!
//! let parents = client
//!     .fetch(&client.composer().read_exact("Parent", "parent", [("parentActive", 1)]).build()?)
//!     .await?
//!     .take("Parent");
//!
//! let ids = parents.column_keys("parentId");
//! let children = client
//!     .fetch(&client.composer().read_in("Child", "child", "childParentId", ids).build()?)
//!     .await?
//!     .take("Child");
//!
//! let joined = correlate::join(&parents, &children, "parentId", "childParentId");
//! for (parent, kids) in joined.iter() {
//!     println!("{:?}: {} children", parent.get("parentId"), kids.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod composer;
pub mod config;
pub mod correlate;
pub mod decode;
pub mod error;
pub mod generation;
pub mod models;
pub mod session_cache;
pub mod timeouts;
pub mod transport;

pub use auth::{AuthProvider, AuthTokenProvider};
pub use client::{BatchLinkClient, BatchLinkClientBuilder, FetchOutcome};
pub use composer::{format_id_list, BatchComposer};
pub use config::ClientConfig;
pub use correlate::{Correlation, KeyAliasTable, KeySource, ATTACHMENT_RELATIVE_ID_ALIASES};
pub use decode::{DecodeFailure, DecodedBatch, ResponseDecoder};
pub use error::{BatchLinkError, DecodeError, Result, TransportError};
pub use generation::{FetchGenerations, FetchTicket};
pub use models::{
    ActionKind, Batch, BatchEntry, BatchRequest, BatchResponse, HttpVersion, OperationDescriptor,
    Pagination, Row, RowSet,
};
pub use session_cache::SessionCache;
pub use timeouts::LinkTimeouts;
pub use transport::{HttpTransport, Transport};
