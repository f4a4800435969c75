//! Dispatch planning shared by both interceptors
//!
//! Maps a [`ProcessOutcome`] onto what the transport should do with the
//! caller's request.

use tilesplit_core::{
    InterceptError, ProcessOutcome, RequestBodyProcessor, RequestDescriptor, TransportKind,
};

/// How an intercepted call is dispatched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchPlan {
    /// Send the caller's arguments untouched
    Original,
    /// Same URL, new body
    ReplaceBody(String),
    /// Single request to a different URL
    Redirect(RequestDescriptor),
    /// Several requests, one per tile
    Split(Vec<RequestDescriptor>),
}

impl DispatchPlan {
    /// Classify a processor outcome for a call originally aimed at `url`
    #[must_use]
    pub fn from_outcome(outcome: ProcessOutcome, url: &str) -> Self {
        if outcome.is_split() {
            return Self::Split(outcome.requests);
        }

        let mut requests = outcome.requests;
        match (requests.pop(), requests.is_empty()) {
            (Some(request), true) if request.url == url => Self::ReplaceBody(request.body),
            (Some(request), true) => Self::Redirect(request),
            _ => Self::Original,
        }
    }

    /// Run the processor over `body` and classify the result
    ///
    /// # Errors
    /// - `InterceptError` raised by the processor; callers send the original
    pub fn build(
        processor: &RequestBodyProcessor,
        body: &str,
        kind: TransportKind,
        url: &str,
    ) -> Result<Self, InterceptError> {
        let outcome = processor.process(body, kind, url)?;
        Ok(Self::from_outcome(outcome, url))
    }

    /// Number of requests this plan dispatches
    #[inline]
    #[must_use]
    pub fn request_count(&self) -> usize {
        match self {
            Self::Split(requests) => requests.len(),
            _ => 1,
        }
    }
}
