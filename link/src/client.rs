//! Batch client with builder pattern.
//!
//! Ties together the token provider, transport, decoder, session cache and
//! fetch generations behind one explicit instance that pages receive and
//! share (clones share all state).

use std::sync::Arc;
use std::time::Duration;

use crate::{
    auth::{AuthProvider, AuthTokenProvider},
    composer::BatchComposer,
    config::{join_url, ClientConfig, DEFAULT_ENDPOINT},
    decode::{DecodedBatch, ResponseDecoder},
    error::{BatchLinkError, Result, TransportError},
    generation::FetchGenerations,
    models::{
        ActionKind, Batch, BatchRequest, BatchResponse, HttpVersion, OperationDescriptor,
        Pagination, RowSet, DEFAULT_CRUD_MESSAGE, DEFAULT_PAGE_SIZE,
    },
    session_cache::SessionCache,
    timeouts::LinkTimeouts,
    transport::{HttpTransport, Transport},
};

/// Result of a generation-guarded fetch.
#[derive(Debug)]
pub enum FetchOutcome {
    /// The newest request for its target; safe to apply
    Current(DecodedBatch),
    /// A newer request was issued while this one was in flight
    Superseded,
}

impl FetchOutcome {
    pub fn into_current(self) -> Option<DecodedBatch> {
        match self {
            FetchOutcome::Current(decoded) => Some(decoded),
            FetchOutcome::Superseded => None,
        }
    }

    pub fn is_superseded(&self) -> bool {
        matches!(self, FetchOutcome::Superseded)
    }
}

/// Client for the batch endpoint.
///
/// Use [`BatchLinkClientBuilder`] to construct instances.
///
/// # Examples
///
/// ```rust,no_run
/// use batch_link::BatchLinkClient;
///
/// # async fn example() -> batch_link::Result<()> {
/// let client = BatchLinkClient::builder()
///     .base_url("http://localhost:8080")
///     .build()?;
/// client.set_auth_token("eyJhbGc...");
///
/// let batch = client
///     .composer()
///     .read_exact("Company", "company", [("companyId", 42)])
///     .build()?;
/// let decoded = client.fetch(&batch).await?;
/// println!("{} companies", decoded.rows("Company").len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct BatchLinkClient {
    transport: Arc<dyn Transport>,
    auth: AuthTokenProvider,
    session_cache: SessionCache,
    generations: FetchGenerations,
    default_pagination: Pagination,
    crud_message: String,
}

impl BatchLinkClient {
    pub fn builder() -> BatchLinkClientBuilder {
        BatchLinkClientBuilder::new()
    }

    /// A composer preloaded with this client's default page and crud message
    pub fn composer(&self) -> BatchComposer {
        BatchComposer::new()
            .pagination(self.default_pagination)
            .crud_message(self.crud_message.clone())
    }

    /// Send a batch and return the raw reply.
    ///
    /// An empty batch returns an empty reply without touching the network.
    pub async fn send(&self, batch: &Batch) -> Result<BatchResponse> {
        if batch.is_empty() {
            log::debug!("[BATCH_HTTP] Empty batch, skipping network call");
            return Ok(BatchResponse::default());
        }
        batch.pagination.validate()?;

        let request = BatchRequest::from_batch(batch).map_err(TransportError::Encode)?;
        log::debug!(
            "[BATCH_HTTP] Sending {} operations: [{}]",
            batch.len(),
            batch.labels().collect::<Vec<_>>().join(", ")
        );
        Ok(self.transport.send(&request).await?)
    }

    /// Send and decode. Transport failures propagate; decode failures are
    /// contained in [`DecodedBatch::failures`].
    pub async fn fetch(&self, batch: &Batch) -> Result<DecodedBatch> {
        let response = self.send(batch).await?;
        Ok(ResponseDecoder::for_batch(batch).decode(&response))
    }

    /// Fetch a specific page of `batch` without modifying it
    pub async fn fetch_page(&self, batch: &Batch, pagination: Pagination) -> Result<DecodedBatch> {
        pagination.validate()?;
        self.fetch(&batch.with_pagination(pagination)).await
    }

    /// Fetch on behalf of `target`, discarding the result if a newer fetch
    /// for the same target was issued before this one completed.
    pub async fn fetch_latest(&self, target: &str, batch: &Batch) -> Result<FetchOutcome> {
        let ticket = self.generations.begin(target);
        let result = self.fetch(batch).await;

        if !self.generations.is_current(&ticket) {
            log::warn!(
                "[FETCH_GEN] Response for {} generation {} superseded (latest {})",
                target,
                ticket.generation(),
                self.generations.latest(target)
            );
            return Ok(FetchOutcome::Superseded);
        }
        result.map(FetchOutcome::Current)
    }

    /// Run one stored procedure and return its rows.
    pub async fn call_procedure<K, V, I>(&self, name: &str, params: I) -> Result<RowSet>
    where
        K: Into<String>,
        V: ToString,
        I: IntoIterator<Item = (K, V)>,
    {
        let batch = self
            .composer()
            .push(OperationDescriptor::new(name, name, ActionKind::Procedure).with_fields(params))
            .build()?;
        let mut decoded = self.fetch(&batch).await?;
        Ok(decoded.take(name))
    }

    /// Use `token` as the bearer credential for all subsequent calls
    pub fn set_auth_token(&self, token: impl Into<String>) {
        self.auth.set_auth_token(token);
    }

    pub fn clear_auth_token(&self) {
        self.auth.clear();
    }

    pub fn auth(&self) -> &AuthTokenProvider {
        &self.auth
    }

    pub fn session_cache(&self) -> &SessionCache {
        &self.session_cache
    }

    pub fn generations(&self) -> &FetchGenerations {
        &self.generations
    }

    pub fn default_pagination(&self) -> Pagination {
        self.default_pagination
    }
}

/// Builder for configuring [`BatchLinkClient`] instances.
pub struct BatchLinkClientBuilder {
    base_url: Option<String>,
    endpoint: String,
    timeouts: LinkTimeouts,
    http_version: HttpVersion,
    auth: AuthTokenProvider,
    transport: Option<Arc<dyn Transport>>,
    session_cache: SessionCache,
    page_size: u32,
    crud_message: String,
}

impl BatchLinkClientBuilder {
    fn new() -> Self {
        Self {
            base_url: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeouts: LinkTimeouts::default(),
            http_version: HttpVersion::default(),
            auth: AuthTokenProvider::default(),
            transport: None,
            session_cache: SessionCache::default(),
            page_size: DEFAULT_PAGE_SIZE,
            crud_message: DEFAULT_CRUD_MESSAGE.to_string(),
        }
    }

    /// Start from loaded configuration
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new()
            .base_url(config.base_url.clone())
            .endpoint(config.endpoint.clone())
            .timeouts(config.timeouts())
            .http_version(config.http_version)
            .page_size(config.page_size)
            .crud_message(config.crud_message.clone())
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Path of the batch endpoint under `base_url` (default `/api/crud`)
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Shorthand for setting only the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.request_timeout = timeout;
        self
    }

    pub fn timeouts(mut self, timeouts: LinkTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn http_version(mut self, version: HttpVersion) -> Self {
        self.http_version = version;
        self
    }

    /// Start with a bearer token already set
    pub fn bearer_token(self, token: impl Into<String>) -> Self {
        self.auth.set_auth_token(token);
        self
    }

    /// Set any credential kind
    pub fn auth(self, auth: AuthProvider) -> Self {
        self.auth.set_provider(auth);
        self
    }

    /// Share an existing token provider (e.g. one owned by the login flow)
    pub fn auth_provider(mut self, provider: AuthTokenProvider) -> Self {
        self.auth = provider;
        self
    }

    /// Replace the HTTP transport. `base_url` becomes optional.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Share a session cache with other clients of the same session
    pub fn session_cache(mut self, cache: SessionCache) -> Self {
        self.session_cache = cache;
        self
    }

    /// Default `NoOfLines` for batches built through [`BatchLinkClient::composer`]
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn crud_message(mut self, message: impl Into<String>) -> Self {
        self.crud_message = message.into();
        self
    }

    pub fn build(self) -> Result<BatchLinkClient> {
        let default_pagination = Pagination::new(1, self.page_size)
            .map_err(|e| BatchLinkError::ConfigurationError(e.to_string()))?;

        let transport = match self.transport {
            Some(transport) => transport,
            None => {
                let base_url = self.base_url.ok_or_else(|| {
                    BatchLinkError::ConfigurationError("base_url is required".into())
                })?;
                let http_client = build_http_client(&self.timeouts, self.http_version)?;
                let url = join_url(&base_url, &self.endpoint);
                log::debug!("[CLIENT] Batch endpoint: {}", url);
                Arc::new(HttpTransport::new(url, http_client, self.auth.clone()))
            },
        };

        Ok(BatchLinkClient {
            transport,
            auth: self.auth,
            session_cache: self.session_cache,
            generations: FetchGenerations::new(),
            default_pagination,
            crud_message: self.crud_message,
        })
    }
}

fn build_http_client(timeouts: &LinkTimeouts, http_version: HttpVersion) -> Result<reqwest::Client> {
    let mut client_builder = reqwest::Client::builder()
        .timeout(timeouts.request_timeout)
        .connect_timeout(timeouts.connection_timeout)
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(90));

    client_builder = match http_version {
        HttpVersion::Http1 => {
            log::debug!("[CLIENT] Using HTTP/1.1 only");
            client_builder.http1_only()
        },
        HttpVersion::Http2 => {
            log::debug!("[CLIENT] Using HTTP/2 with prior knowledge");
            client_builder.http2_prior_knowledge()
        },
        HttpVersion::Auto => {
            log::debug!("[CLIENT] Using automatic HTTP version negotiation");
            client_builder
        },
    };

    client_builder
        .build()
        .map_err(|e| BatchLinkError::ConfigurationError(e.to_string()))
}
