//! Authentication for batch calls.
//!
//! [`AuthProvider`] describes one credential and knows how to attach it to a
//! request. [`AuthTokenProvider`] is the shared, session-scoped holder the
//! client reads on every `send`.

use base64::{engine::general_purpose, Engine as _};
use parking_lot::RwLock;
use std::sync::Arc;

/// Credentials attached to outgoing requests.
///
/// # Examples
///
/// ```rust
/// use batch_link::AuthProvider;
///
/// let auth = AuthProvider::bearer_token("eyJhbGc...".to_string());
/// assert!(auth.is_authenticated());
///
/// let auth = AuthProvider::none();
/// assert!(!auth.is_authenticated());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthProvider {
    /// `Authorization: Bearer <token>`
    BearerToken(String),

    /// HTTP Basic Auth (username, password)
    BasicAuth(String, String),

    /// No authentication
    None,
}

impl AuthProvider {
    pub fn bearer_token(token: String) -> Self {
        Self::BearerToken(token)
    }

    /// Encodes username:password as base64 following RFC 7617.
    pub fn basic_auth(username: String, password: String) -> Self {
        Self::BasicAuth(username, password)
    }

    pub fn none() -> Self {
        Self::None
    }

    /// Attach authentication headers to an HTTP request builder
    ///
    /// - BearerToken: `Authorization: Bearer <token>`
    /// - BasicAuth: `Authorization: Basic <base64(username:password)>`
    /// - None: no headers
    pub fn apply_to_request(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self {
            Self::BearerToken(token) => request.bearer_auth(token),
            Self::BasicAuth(username, password) => {
                request.header("Authorization", format!("Basic {}", encode_basic(username, password)))
            },
            Self::None => request,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        !matches!(self, Self::None)
    }
}

fn encode_basic(username: &str, password: &str) -> String {
    let credentials = format!("{}:{}", username, password);
    general_purpose::STANDARD.encode(credentials.as_bytes())
}

/// Session credential shared by every clone of a client.
///
/// Written on login and session change, read by every in-flight `send`.
/// Cloning shares the same slot.
#[derive(Debug, Clone)]
pub struct AuthTokenProvider {
    current: Arc<RwLock<AuthProvider>>,
}

impl Default for AuthTokenProvider {
    fn default() -> Self {
        Self::new(AuthProvider::None)
    }
}

impl AuthTokenProvider {
    pub fn new(auth: AuthProvider) -> Self {
        Self {
            current: Arc::new(RwLock::new(auth)),
        }
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self::new(AuthProvider::BearerToken(token.into()))
    }

    /// Replace the credential with a bearer token
    pub fn set_auth_token(&self, token: impl Into<String>) {
        log::debug!("[AUTH] Bearer token updated");
        *self.current.write() = AuthProvider::BearerToken(token.into());
    }

    pub fn set_provider(&self, auth: AuthProvider) {
        *self.current.write() = auth;
    }

    /// Drop the credential (logout)
    pub fn clear(&self) {
        log::debug!("[AUTH] Credential cleared");
        *self.current.write() = AuthProvider::None;
    }

    /// Snapshot of the credential in effect right now
    pub fn current(&self) -> AuthProvider {
        self.current.read().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.read().is_authenticated()
    }

    pub fn apply_to_request(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        self.current.read().apply_to_request(request)
    }
}
