//! Fetch transport over `reqwest`

use crate::settings::HttpSettings;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Method};
use tilesplit_shim::{FetchTransport, RequestBody, RequestInit, TransportError};

/// Native fetch transport for the command-line host
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Build a transport from HTTP settings
    ///
    /// # Errors
    /// Fails if the underlying client cannot be constructed.
    pub fn new(settings: &HttpSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.timeout())
            .user_agent(settings.user_agent.as_str())
            .build()
            .context("building HTTP client")?;
        Ok(Self { client })
    }
}

fn method_of(init: &RequestInit) -> Result<Method, TransportError> {
    match init.method.as_deref() {
        Some(method) => Method::from_bytes(method.as_bytes())
            .map_err(|e| TransportError::Rejected(format!("invalid method {method:?}: {e}"))),
        None => Ok(Method::GET),
    }
}

#[async_trait]
impl FetchTransport for ReqwestTransport {
    type Response = reqwest::Response;

    async fn fetch(
        &self,
        url: String,
        init: Option<RequestInit>,
    ) -> Result<Self::Response, TransportError> {
        let init = init.unwrap_or_default();
        let mut request = self.client.request(method_of(&init)?, &url);
        for (name, value) in &init.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        request = match init.body {
            Some(RequestBody::Text(text)) => request.body(text),
            Some(RequestBody::Binary(bytes)) => request.body(bytes),
            None => request,
        };

        tracing::debug!(%url, "sending HTTP request");
        request.send().await.map_err(|e| {
            if e.is_builder() {
                TransportError::Rejected(e.to_string())
            } else {
                TransportError::Network(e.to_string())
            }
        })
    }
}
