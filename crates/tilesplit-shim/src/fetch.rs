//! Fetch interception
//!
//! [`FetchInterceptor`] decorates a [`FetchTransport`] and is itself a
//! `FetchTransport`, so it drops in wherever the native transport was used.

use crate::plan::DispatchPlan;
use crate::transport::{FetchTransport, RequestBody, RequestInit, TransportError};
use async_trait::async_trait;
use futures::future::join_all;
use std::sync::Arc;
use tilesplit_core::{RequestBodyProcessor, TransportKind};
use tracing::Instrument;
use uuid::Uuid;

/// Wrap `inner` so eligible writes go through `processor`
#[must_use]
pub fn install_fetch<T: FetchTransport>(
    inner: T,
    processor: Arc<RequestBodyProcessor>,
) -> FetchInterceptor<T> {
    tracing::info!(prefix = %processor.config().target_prefix, "fetch interceptor installed");
    FetchInterceptor { inner, processor }
}

/// Intercepting decorator over a promise-style transport
#[derive(Debug)]
pub struct FetchInterceptor<T> {
    inner: T,
    processor: Arc<RequestBodyProcessor>,
}

impl<T: FetchTransport> FetchInterceptor<T> {
    /// Native transport being decorated
    #[inline]
    #[must_use]
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Whether a call would be intercepted
    #[must_use]
    pub fn is_eligible(&self, url: &str, init: Option<&RequestInit>) -> bool {
        init.and_then(|init| init.method.as_deref())
            .is_some_and(|method| self.processor.is_eligible(method, url))
    }

    /// Dispatch plan for a call, without sending anything
    ///
    /// Returns `DispatchPlan::Original` for calls that would pass through,
    /// including calls whose planning fails.
    #[must_use]
    pub fn plan(&self, url: &str, init: Option<&RequestInit>) -> DispatchPlan {
        if !self.is_eligible(url, init) {
            return DispatchPlan::Original;
        }
        let Some(body) = init.and_then(|init| init.body.as_ref()).and_then(RequestBody::as_text)
        else {
            tracing::debug!("non-string body type, skipping modification");
            return DispatchPlan::Original;
        };

        tracing::info!(%url, "intercepting fetch request");
        let plan = DispatchPlan::build(&self.processor, body, TransportKind::Fetch, url)
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "error modifying request body, sending original");
                DispatchPlan::Original
            });
        tracing::debug!(requests = plan.request_count(), "fetch dispatch planned");
        plan
    }

    async fn dispatch(
        &self,
        url: String,
        init: Option<RequestInit>,
    ) -> Result<T::Response, TransportError> {
        let (plan, options) = match (self.plan(&url, init.as_ref()), init) {
            (DispatchPlan::Original, init) | (_, init @ None) => {
                return self.inner.fetch(url, init).await;
            }
            (plan, Some(options)) => (plan, options),
        };

        match plan {
            DispatchPlan::ReplaceBody(body) => {
                self.inner.fetch(url, Some(options.replacing_body(body))).await
            }
            DispatchPlan::Redirect(request) => {
                tracing::info!(url = %request.url, "redirecting fetch request");
                self.inner
                    .fetch(request.url, Some(options.replacing_body(request.body)))
                    .await
            }
            DispatchPlan::Split(requests) => {
                tracing::info!(count = requests.len(), "splitting fetch into requests");
                let pending = requests.into_iter().map(|request| {
                    tracing::debug!(url = %request.url, "sending split request");
                    self.inner
                        .fetch(request.url, Some(options.replacing_body(request.body)))
                });

                // Every request runs to completion; the caller only sees the first.
                let mut results = join_all(pending).await.into_iter();
                let first = results.next();
                for (index, result) in results.enumerate() {
                    if let Err(e) = result {
                        tracing::error!(request = index + 1, error = %e, "split request failed");
                    }
                }
                tracing::info!("all split requests completed");

                match first {
                    Some(result) => result,
                    None => self.inner.fetch(url, Some(options)).await,
                }
            }
            DispatchPlan::Original => self.inner.fetch(url, Some(options)).await,
        }
    }
}

#[async_trait]
impl<T: FetchTransport> FetchTransport for FetchInterceptor<T> {
    type Response = T::Response;

    async fn fetch(
        &self,
        url: String,
        init: Option<RequestInit>,
    ) -> Result<Self::Response, TransportError> {
        let span = tracing::debug_span!("fetch", call_id = %Uuid::new_v4());
        self.dispatch(url, init).instrument(span).await
    }
}
