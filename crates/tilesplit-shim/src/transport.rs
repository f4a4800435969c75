//! Native transport interfaces
//!
//! The two request-sending entry points a page exposes, modelled as traits
//! so interceptors can decorate them:
//! - [`FetchTransport`]: one call, one awaited response
//! - [`XhrTransport`]: request objects configured by `open`, fired by `send`

use async_trait::async_trait;

/// Request body as handed to a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    /// Textual body
    Text(String),
    /// Any non-textual body (blobs, form data, buffers)
    Binary(Vec<u8>),
}

impl RequestBody {
    /// Text content, if the body is textual and non-empty
    #[inline]
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) if !text.is_empty() => Some(text.as_str()),
            _ => None,
        }
    }
}

impl From<String> for RequestBody {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for RequestBody {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// Options accompanying a fetch call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestInit {
    /// HTTP method; absent means the transport default
    pub method: Option<String>,
    /// Request headers in insertion order
    pub headers: Vec<(String, String)>,
    /// Request body
    pub body: Option<RequestBody>,
}

impl RequestInit {
    /// Create empty options
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With method
    #[inline]
    #[must_use]
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// With an additional header
    #[inline]
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// With body
    #[inline]
    #[must_use]
    pub fn with_body(mut self, body: impl Into<RequestBody>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Copy of these options carrying a different textual body
    #[must_use]
    pub fn replacing_body(&self, body: String) -> Self {
        Self {
            body: Some(RequestBody::Text(body)),
            ..self.clone()
        }
    }
}

/// Errors raised by a native transport
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// Request could not be delivered
    #[error("network error: {0}")]
    Network(String),

    /// Request object used out of order (e.g. send before open)
    #[error("invalid request state: {0}")]
    InvalidState(String),

    /// Request was rejected before dispatch
    #[error("request rejected: {0}")]
    Rejected(String),
}

/// Promise-style transport: one call per request
#[async_trait]
pub trait FetchTransport: Send + Sync {
    /// Response handed back to the caller
    type Response: Send;

    /// Send a request
    async fn fetch(
        &self,
        url: String,
        init: Option<RequestInit>,
    ) -> Result<Self::Response, TransportError>;
}

#[async_trait]
impl<T: FetchTransport> FetchTransport for std::sync::Arc<T> {
    type Response = T::Response;

    async fn fetch(
        &self,
        url: String,
        init: Option<RequestInit>,
    ) -> Result<Self::Response, TransportError> {
        (**self).fetch(url, init).await
    }
}

/// Stateful transport that hands out request objects
pub trait XhrTransport: Send + Sync {
    /// Request object type
    type Request: XhrRequest;

    /// Create a fresh, unopened request object
    fn create(&self) -> Self::Request;
}

/// One stateful request: `open`, optional headers, then `send`
#[async_trait]
pub trait XhrRequest: Send {
    /// Declare method and URL
    ///
    /// # Errors
    /// Transport-specific; typically `InvalidState` when already sent.
    fn open(&mut self, method: &str, url: &str) -> Result<(), TransportError>;

    /// Add a request header; only valid after `open`
    ///
    /// # Errors
    /// Transport-specific; typically `InvalidState` when not opened.
    fn set_request_header(&mut self, name: &str, value: &str) -> Result<(), TransportError>;

    /// Issue the request
    ///
    /// Resolves once the request has been handed to the network.
    ///
    /// # Errors
    /// Transport-specific.
    async fn send(&mut self, body: Option<RequestBody>) -> Result<(), TransportError>;
}
