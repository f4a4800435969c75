//! XHR interception
//!
//! [`XhrInterceptor`] decorates an [`XhrTransport`]. Each request object it
//! hands out records what `open` declared in a [`RequestContext`] and
//! consults it on `send`; nothing is shared between request objects.
//!
//! Split requests are sent one after another on fresh native request
//! objects, and the caller's own request is never sent.

use crate::plan::DispatchPlan;
use crate::transport::{RequestBody, TransportError, XhrRequest, XhrTransport};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tilesplit_core::{RequestBodyProcessor, RequestDescriptor, TransportKind};
use tracing::Instrument;
use uuid::Uuid;

/// Wrap `inner` so eligible writes go through `processor`
#[must_use]
pub fn install_xhr<T: XhrTransport>(
    inner: T,
    processor: Arc<RequestBodyProcessor>,
) -> XhrInterceptor<T> {
    tracing::info!(prefix = %processor.config().target_prefix, "XHR interceptor installed");
    XhrInterceptor {
        inner: Arc::new(inner),
        processor,
    }
}

/// Method, URL and headers declared on one request object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// Method passed to `open`
    pub method: String,
    /// URL passed to `open`
    pub url: String,
    /// Headers set after `open`, in order
    pub headers: Vec<(String, String)>,
}

impl RequestContext {
    /// Context for a freshly opened request
    #[inline]
    #[must_use]
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            headers: Vec::new(),
        }
    }

    /// Open `request` on `url` with this context's method and headers
    fn open_on<R>(&self, request: &mut R, url: &str) -> Result<(), TransportError>
    where
        R: XhrRequest + ?Sized,
    {
        request.open(&self.method, url)?;
        for (name, value) in &self.headers {
            request.set_request_header(name, value)?;
        }
        Ok(())
    }
}

/// Intercepting decorator over a stateful transport
pub struct XhrInterceptor<T> {
    inner: Arc<T>,
    processor: Arc<RequestBodyProcessor>,
}

impl<T> fmt::Debug for XhrInterceptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XhrInterceptor")
            .field("processor", &self.processor)
            .finish_non_exhaustive()
    }
}

impl<T: XhrTransport> XhrInterceptor<T> {
    /// Native transport being decorated
    #[inline]
    #[must_use]
    pub fn inner(&self) -> &T {
        &self.inner
    }
}

impl<T: XhrTransport> XhrTransport for XhrInterceptor<T> {
    type Request = InterceptedXhr<T>;

    fn create(&self) -> Self::Request {
        InterceptedXhr {
            request: self.inner.create(),
            transport: Arc::clone(&self.inner),
            processor: Arc::clone(&self.processor),
            context: None,
        }
    }
}

/// Request object handed out by [`XhrInterceptor`]
pub struct InterceptedXhr<T: XhrTransport> {
    request: T::Request,
    transport: Arc<T>,
    processor: Arc<RequestBodyProcessor>,
    context: Option<RequestContext>,
}

impl<T: XhrTransport> fmt::Debug for InterceptedXhr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterceptedXhr")
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

impl<T: XhrTransport> InterceptedXhr<T> {
    /// Context captured by the last `open`
    #[inline]
    #[must_use]
    pub fn context(&self) -> Option<&RequestContext> {
        self.context.as_ref()
    }

    /// Native request object being decorated
    #[inline]
    #[must_use]
    pub fn inner(&self) -> &T::Request {
        &self.request
    }

    fn plan(&self, context: &RequestContext, body: Option<&RequestBody>) -> DispatchPlan {
        let Some(body) = body.and_then(RequestBody::as_text) else {
            tracing::debug!("non-string body type, skipping modification");
            return DispatchPlan::Original;
        };

        tracing::info!(url = %context.url, "intercepting XHR request");
        let plan = DispatchPlan::build(&self.processor, body, TransportKind::Xhr, &context.url)
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "error modifying XHR body, sending original");
                DispatchPlan::Original
            });
        tracing::debug!(requests = plan.request_count(), "XHR dispatch planned");
        plan
    }

    async fn dispatch(&mut self, body: Option<RequestBody>) -> Result<(), TransportError> {
        let Some(context) = self
            .context
            .clone()
            .filter(|c| self.processor.is_eligible(&c.method, &c.url))
        else {
            return self.request.send(body).await;
        };

        match self.plan(&context, body.as_ref()) {
            DispatchPlan::Original => self.request.send(body).await,
            DispatchPlan::ReplaceBody(replacement) => {
                self.request.send(Some(RequestBody::Text(replacement))).await
            }
            DispatchPlan::Redirect(request) => {
                tracing::info!(url = %request.url, "redirecting XHR request");
                if let Err(e) = context.open_on(&mut self.request, &request.url) {
                    tracing::warn!(error = %e, "could not re-open XHR, sending original");
                    context.open_on(&mut self.request, &context.url)?;
                    return self.request.send(body).await;
                }
                self.context = Some(RequestContext {
                    url: request.url,
                    ..context
                });
                self.request.send(Some(RequestBody::Text(request.body))).await
            }
            DispatchPlan::Split(requests) => {
                tracing::info!(count = requests.len(), "splitting XHR into requests");
                let transport = Arc::clone(&self.transport);
                match send_sequentially(&*transport, &context, requests).await {
                    Ok(sent) => tracing::info!(sent, "all split XHR requests sent"),
                    Err(e) => tracing::error!(error = %e, "error executing split XHR requests"),
                }
                Ok(())
            }
        }
    }
}

/// Send each request on its own native object, in order
///
/// Stops at the first failure.
async fn send_sequentially<T: XhrTransport>(
    transport: &T,
    context: &RequestContext,
    requests: Vec<RequestDescriptor>,
) -> Result<usize, TransportError> {
    let mut sent = 0;
    for request in requests {
        tracing::debug!(url = %request.url, "sending XHR request");
        let mut native = transport.create();
        context.open_on(&mut native, &request.url)?;
        native.send(Some(RequestBody::Text(request.body))).await?;
        sent += 1;
    }
    Ok(sent)
}

#[async_trait]
impl<T: XhrTransport> XhrRequest for InterceptedXhr<T> {
    fn open(&mut self, method: &str, url: &str) -> Result<(), TransportError> {
        self.request.open(method, url)?;
        self.context = Some(RequestContext::new(method, url));
        Ok(())
    }

    fn set_request_header(&mut self, name: &str, value: &str) -> Result<(), TransportError> {
        self.request.set_request_header(name, value)?;
        if let Some(context) = self.context.as_mut() {
            context.headers.push((name.to_string(), value.to_string()));
        }
        Ok(())
    }

    async fn send(&mut self, body: Option<RequestBody>) -> Result<(), TransportError> {
        let span = tracing::debug_span!("xhr", call_id = %Uuid::new_v4());
        self.dispatch(body).instrument(span).await
    }
}
