//! Error types for batch-link.
//!
//! Transport failures surface to the caller. Decode failures are contained
//! per label by the decoder and never travel through [`Result`].

use thiserror::Error;

/// Result type for batch-link operations
pub type Result<T> = std::result::Result<T, BatchLinkError>;

/// Errors returned by the client.
#[derive(Error, Debug)]
pub enum BatchLinkError {
    /// The network call failed or returned an unusable top-level body
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Builder or config file problem
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// A batch that cannot be sent as composed
    #[error("Invalid batch: {0}")]
    InvalidBatch(String),

    /// Encoding or decoding a caller-supplied value failed
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for BatchLinkError {
    fn from(err: serde_json::Error) -> Self {
        BatchLinkError::SerializationError(err.to_string())
    }
}

impl From<toml::de::Error> for BatchLinkError {
    fn from(err: toml::de::Error) -> Self {
        BatchLinkError::ConfigurationError(format!("TOML parse error: {}", err))
    }
}

/// A failed `send`. Always carries the original cause.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The request did not complete within the configured timeout
    #[error("Request timed out: {0}")]
    Timeout(#[source] reqwest::Error),

    /// Connection, TLS, or body-read failure
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The server answered with a non-success status
    #[error("Server error ({status_code}): {message}")]
    Status { status_code: u16, message: String },

    /// The outer `{ Data: [...] }` document could not be parsed
    #[error("Malformed batch response: {0}")]
    MalformedResponse(#[source] serde_json::Error),

    /// The outgoing operations could not be serialized into `data`
    #[error("Failed to encode batch request: {0}")]
    Encode(#[source] serde_json::Error),
}

impl TransportError {
    /// Classify a reqwest failure.
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout(err)
        } else {
            TransportError::Network(err)
        }
    }

    /// HTTP status code, when the server answered at all
    pub fn status_code(&self) -> Option<u16> {
        match self {
            TransportError::Status { status_code, .. } => Some(*status_code),
            TransportError::Timeout(e) | TransportError::Network(e) => {
                e.status().map(|s| s.as_u16())
            },
            _ => None,
        }
    }
}

/// Why one response entry could not be turned into a RowSet.
///
/// Produced by the decoder and recorded alongside the decoded batch;
/// the affected label is downgraded to an empty RowSet.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// `JsonData` was not valid JSON
    #[error("payload is not valid JSON: {0}")]
    InvalidPayload(#[source] serde_json::Error),

    /// `JsonData` parsed, but not into an object
    #[error("payload is not an object (found {found})")]
    NotAnObject { found: &'static str },

    /// No key matched a label or resource and there was more than one key
    #[error("cannot locate dataset in payload (keys: {keys:?})")]
    UnresolvedDataset { keys: Vec<String> },

    /// The dataset object has no `TableData` array
    #[error("dataset '{dataset}' has no TableData array")]
    MissingTableData { dataset: String },

    /// A `TableData` element was not an object
    #[error("dataset '{dataset}' row {index} is not an object")]
    RowNotObject { dataset: String, index: usize },
}
