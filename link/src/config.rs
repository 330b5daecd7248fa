//! File and key/value configuration for the client.
//!
//! Accepts a TOML document or a flat string map (snake_case keys or their
//! dotted aliases, e.g. `page_size` / `page.size`).

use serde::{Deserialize, Serialize};
use std::{collections::HashMap, time::Duration};

use crate::{
    error::{BatchLinkError, Result},
    models::{HttpVersion, DEFAULT_CRUD_MESSAGE, DEFAULT_PAGE_SIZE},
    timeouts::LinkTimeouts,
};

/// Endpoint path appended to `base_url` when none is configured.
pub const DEFAULT_ENDPOINT: &str = "/api/crud";

/// Client settings.
///
/// ```rust
/// use batch_link::ClientConfig;
///
/// let config = ClientConfig::from_toml_str(r#"
///     base_url = "https://dash.example.com"
///     page_size = 50
/// "#).unwrap();
/// assert_eq!(config.endpoint, "/api/crud");
/// assert_eq!(config.page_size, 50);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub base_url: String,

    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Default `NoOfLines`
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Default `CrudMessage`
    #[serde(default = "default_crud_message")]
    pub crud_message: String,

    #[serde(default = "default_connection_timeout_ms")]
    pub connection_timeout_ms: u64,

    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    #[serde(default)]
    pub http_version: HttpVersion,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_crud_message() -> String {
    DEFAULT_CRUD_MESSAGE.to_string()
}

fn default_connection_timeout_ms() -> u64 {
    LinkTimeouts::default().connection_timeout.as_millis() as u64
}

fn default_request_timeout_ms() -> u64 {
    LinkTimeouts::default().request_timeout.as_millis() as u64
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            endpoint: default_endpoint(),
            page_size: default_page_size(),
            crud_message: default_crud_message(),
            connection_timeout_ms: default_connection_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            http_version: HttpVersion::default(),
        }
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: ClientConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_map(map: &HashMap<String, String>) -> Result<Self> {
        let base_url = get_str(map, "base_url", "base.url")
            .ok_or_else(|| BatchLinkError::ConfigurationError("base_url is required".into()))?;

        let mut config = Self::new(base_url);

        if let Some(value) = get_str(map, "endpoint", "endpoint.path") {
            config.endpoint = value;
        }
        if let Some(value) = get_str(map, "page_size", "page.size") {
            config.page_size = parse_u32(&value, "page_size")?;
        }
        if let Some(value) = get_str(map, "crud_message", "crud.message") {
            config.crud_message = value;
        }
        if let Some(value) = get_str(map, "connection_timeout_ms", "connection.timeout.ms") {
            config.connection_timeout_ms = parse_u64(&value, "connection_timeout_ms")?;
        }
        if let Some(value) = get_str(map, "request_timeout_ms", "request.timeout.ms") {
            config.request_timeout_ms = parse_u64(&value, "request_timeout_ms")?;
        }
        if let Some(value) = get_str(map, "http_version", "http.version") {
            config.http_version = parse_http_version(&value)?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(BatchLinkError::ConfigurationError("base_url is required".into()));
        }
        if self.page_size == 0 {
            return Err(BatchLinkError::ConfigurationError("page_size must be >= 1".into()));
        }
        Ok(())
    }

    pub fn timeouts(&self) -> LinkTimeouts {
        LinkTimeouts {
            connection_timeout: Duration::from_millis(self.connection_timeout_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
        }
    }

    /// `base_url` and `endpoint` joined with exactly one slash
    pub fn endpoint_url(&self) -> String {
        join_url(&self.base_url, &self.endpoint)
    }
}

pub(crate) fn join_url(base_url: &str, endpoint: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        endpoint.trim_start_matches('/')
    )
}

fn get_str(map: &HashMap<String, String>, key: &str, alias: &str) -> Option<String> {
    map.get(key).cloned().or_else(|| map.get(alias).cloned())
}

fn parse_u32(value: &str, field: &str) -> Result<u32> {
    value.trim().parse::<u32>().map_err(|_| {
        BatchLinkError::ConfigurationError(format!("Invalid {} value: {}", field, value))
    })
}

fn parse_u64(value: &str, field: &str) -> Result<u64> {
    value.trim().parse::<u64>().map_err(|_| {
        BatchLinkError::ConfigurationError(format!("Invalid {} value: {}", field, value))
    })
}

fn parse_http_version(value: &str) -> Result<HttpVersion> {
    match value.trim().to_lowercase().as_str() {
        "http1" | "http/1.1" | "1" => Ok(HttpVersion::Http1),
        "http2" | "http/2" | "2" => Ok(HttpVersion::Http2),
        "auto" => Ok(HttpVersion::Auto),
        _ => Err(BatchLinkError::ConfigurationError(format!(
            "Invalid http_version value: {}",
            value
        ))),
    }
}
