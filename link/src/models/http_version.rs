use serde::{Deserialize, Serialize};

/// HTTP protocol version used by the transport.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpVersion {
    /// HTTP/1.1 only (maximum compatibility)
    #[default]
    Http1,
    /// HTTP/2 with prior knowledge
    Http2,
    /// Negotiate via ALPN
    Auto,
}
