//! Testing utilities for tilesplit workspace
//!
//! Shared test doubles and fixtures: a scripted operator console and
//! recording transports for both transport styles.

#![allow(missing_docs)]

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Barrier;
use tilesplit_core::{InterceptConfig, OperatorConsole, RequestBodyProcessor};
use tilesplit_shim::{
    FetchTransport, RequestBody, RequestInit, TransportError, XhrRequest, XhrTransport,
};

pub const PIXEL_PREFIX: &str = "https://backend.wplace.live/s0/pixel/";

pub fn pixel_url(x: u64, y: u64) -> String {
    format!("{PIXEL_PREFIX}{x}/{y}")
}

/// Body the page would send for a single pixel write
pub fn original_body() -> String {
    json!({
        "colors": [0],
        "coords": [1, 1],
        "t": "turnstile-token",
        "fp": "fingerprint",
    })
    .to_string()
}

pub fn post_init(body: impl Into<RequestBody>) -> RequestInit {
    RequestInit::new()
        .with_method("POST")
        .with_header("content-type", "text/plain;charset=UTF-8")
        .with_body(body)
}

/// Console answering prompts from a script and recording alerts
#[derive(Debug, Default)]
pub struct ScriptedConsole {
    answers: Mutex<VecDeque<Option<String>>>,
    prompts: Mutex<Vec<String>>,
    alerts: Mutex<Vec<String>>,
}

impl ScriptedConsole {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an answer for the next prompt
    pub fn answer(self, answer: impl Into<String>) -> Self {
        self.answers.lock().push_back(Some(answer.into()));
        self
    }

    /// Queue a cancel for the next prompt
    pub fn cancel(self) -> Self {
        self.answers.lock().push_back(None);
        self
    }

    pub fn prompt_count(&self) -> usize {
        self.prompts.lock().len()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alerts.lock().clone()
    }
}

impl OperatorConsole for ScriptedConsole {
    fn prompt(&self, message: &str) -> Option<String> {
        self.prompts.lock().push(message.to_string());
        // An exhausted script behaves like the operator cancelling
        self.answers.lock().pop_front().flatten()
    }

    fn alert(&self, message: &str) {
        self.alerts.lock().push(message.to_string());
    }
}

pub fn processor_with(console: Arc<ScriptedConsole>) -> Arc<RequestBodyProcessor> {
    processor_with_config(InterceptConfig::new(), console)
}

pub fn processor_with_config(
    config: InterceptConfig,
    console: Arc<ScriptedConsole>,
) -> Arc<RequestBodyProcessor> {
    Arc::new(RequestBodyProcessor::new(config, console).unwrap())
}

/// One call observed by [`RecordingFetchTransport`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchCall {
    pub url: String,
    pub init: Option<RequestInit>,
}

/// Fetch transport that records calls and answers with the call index
#[derive(Debug, Default)]
pub struct RecordingFetchTransport {
    calls: Mutex<Vec<FetchCall>>,
    failing_urls: Vec<String>,
}

impl RecordingFetchTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every request to `url` with a network error
    pub fn failing_on(mut self, url: impl Into<String>) -> Self {
        self.failing_urls.push(url.into());
        self
    }

    pub fn calls(&self) -> Vec<FetchCall> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl FetchTransport for RecordingFetchTransport {
    type Response = usize;

    async fn fetch(
        &self,
        url: String,
        init: Option<RequestInit>,
    ) -> Result<Self::Response, TransportError> {
        let mut calls = self.calls.lock();
        let index = calls.len();
        calls.push(FetchCall {
            url: url.clone(),
            init,
        });
        drop(calls);

        if self.failing_urls.contains(&url) {
            return Err(TransportError::Network(format!("unreachable: {url}")));
        }
        Ok(index)
    }
}

/// Fetch transport whose calls only resolve once `parties` are in flight
///
/// Calls issued one after another never get past the barrier.
#[derive(Debug)]
pub struct BarrierFetchTransport {
    barrier: Barrier,
    urls: Mutex<Vec<String>>,
}

impl BarrierFetchTransport {
    pub fn new(parties: usize) -> Self {
        Self {
            barrier: Barrier::new(parties),
            urls: Mutex::new(Vec::new()),
        }
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().clone()
    }
}

#[async_trait]
impl FetchTransport for BarrierFetchTransport {
    type Response = String;

    async fn fetch(
        &self,
        url: String,
        _init: Option<RequestInit>,
    ) -> Result<Self::Response, TransportError> {
        self.urls.lock().push(url.clone());
        self.barrier.wait().await;
        Ok(url)
    }
}

/// Event observed by [`RecordingXhrTransport`], tagged with the object id
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XhrEvent {
    Open { id: usize, method: String, url: String },
    Header { id: usize, name: String, value: String },
    Send { id: usize, body: Option<RequestBody> },
}

impl XhrEvent {
    pub fn id(&self) -> usize {
        match self {
            Self::Open { id, .. } | Self::Header { id, .. } | Self::Send { id, .. } => *id,
        }
    }
}

#[derive(Debug, Default)]
struct XhrLog {
    events: Vec<XhrEvent>,
    created: usize,
}

/// XHR transport whose request objects all write to one shared log
#[derive(Debug, Clone, Default)]
pub struct RecordingXhrTransport {
    log: Arc<Mutex<XhrLog>>,
    fail_sends_to: Arc<Vec<String>>,
    reject_headers_on: Arc<Vec<String>>,
    reject_opens_on: Arc<Vec<String>>,
}

impl RecordingXhrTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every send on an object opened on `url`
    pub fn failing_on(mut self, url: impl Into<String>) -> Self {
        let mut urls = (*self.fail_sends_to).clone();
        urls.push(url.into());
        self.fail_sends_to = Arc::new(urls);
        self
    }

    /// Reject every header set on an object opened on `url`
    pub fn rejecting_headers_on(mut self, url: impl Into<String>) -> Self {
        let mut urls = (*self.reject_headers_on).clone();
        urls.push(url.into());
        self.reject_headers_on = Arc::new(urls);
        self
    }

    /// Refuse to open any object on `url`
    pub fn rejecting_opens_on(mut self, url: impl Into<String>) -> Self {
        let mut urls = (*self.reject_opens_on).clone();
        urls.push(url.into());
        self.reject_opens_on = Arc::new(urls);
        self
    }

    pub fn events(&self) -> Vec<XhrEvent> {
        self.log.lock().events.clone()
    }

    /// Bodies of every send, in order, with the URL the object was opened on
    pub fn sends(&self) -> Vec<(String, Option<RequestBody>)> {
        let events = self.events();
        events
            .iter()
            .filter_map(|event| match event {
                XhrEvent::Send { id, body } => {
                    let url = events.iter().rev().find_map(|e| match e {
                        XhrEvent::Open { id: open_id, url, .. } if open_id == id => {
                            Some(url.clone())
                        }
                        _ => None,
                    })?;
                    Some((url, body.clone()))
                }
                _ => None,
            })
            .collect()
    }

    pub fn created(&self) -> usize {
        self.log.lock().created
    }
}

impl XhrTransport for RecordingXhrTransport {
    type Request = RecordingXhr;

    fn create(&self) -> Self::Request {
        let mut log = self.log.lock();
        let id = log.created;
        log.created += 1;
        RecordingXhr {
            id,
            url: None,
            log: Arc::clone(&self.log),
            fail_sends_to: Arc::clone(&self.fail_sends_to),
            reject_headers_on: Arc::clone(&self.reject_headers_on),
            reject_opens_on: Arc::clone(&self.reject_opens_on),
        }
    }
}

/// Request object handed out by [`RecordingXhrTransport`]
#[derive(Debug)]
pub struct RecordingXhr {
    id: usize,
    url: Option<String>,
    log: Arc<Mutex<XhrLog>>,
    fail_sends_to: Arc<Vec<String>>,
    reject_headers_on: Arc<Vec<String>>,
    reject_opens_on: Arc<Vec<String>>,
}

impl RecordingXhr {
    pub fn id(&self) -> usize {
        self.id
    }
}

#[async_trait]
impl XhrRequest for RecordingXhr {
    fn open(&mut self, method: &str, url: &str) -> Result<(), TransportError> {
        if self.reject_opens_on.iter().any(|refused| refused == url) {
            return Err(TransportError::Rejected(format!("open refused on {url}")));
        }
        self.url = Some(url.to_string());
        self.log.lock().events.push(XhrEvent::Open {
            id: self.id,
            method: method.to_string(),
            url: url.to_string(),
        });
        Ok(())
    }

    fn set_request_header(&mut self, name: &str, value: &str) -> Result<(), TransportError> {
        let Some(url) = self.url.as_ref() else {
            return Err(TransportError::InvalidState("header before open".to_string()));
        };
        if self.reject_headers_on.contains(url) {
            return Err(TransportError::Rejected(format!("header {name} refused on {url}")));
        }
        self.log.lock().events.push(XhrEvent::Header {
            id: self.id,
            name: name.to_string(),
            value: value.to_string(),
        });
        Ok(())
    }

    async fn send(&mut self, body: Option<RequestBody>) -> Result<(), TransportError> {
        let Some(url) = self.url.clone() else {
            return Err(TransportError::InvalidState("send before open".to_string()));
        };
        self.log.lock().events.push(XhrEvent::Send { id: self.id, body });
        if self.fail_sends_to.contains(&url) {
            return Err(TransportError::Network(format!("unreachable: {url}")));
        }
        Ok(())
    }
}
