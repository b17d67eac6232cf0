#![allow(dead_code)]

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value};

use courier::error::{CourierError, Result};
use courier::interfaces::log::LogSink;
use courier::interfaces::transport::Transport;
use courier::log::LogEvent;
use courier::Envelope;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Sink that records every event for later inspection.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<LogEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<LogEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl LogSink for RecordingSink {
    fn log(&self, event: &LogEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// Transport that answers with a canned envelope after an optional delay.
pub struct CannedTransport {
    pub envelope: Envelope<Value>,
    pub delay: Duration,
    calls: Mutex<Vec<(String, Map<String, Value>)>>,
}

impl CannedTransport {
    pub fn new(envelope: Envelope<Value>) -> Self {
        Self {
            envelope,
            delay: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> Vec<(String, Map<String, Value>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for CannedTransport {
    async fn send(&self, url: &str, params: &Map<String, Value>) -> Result<Envelope<Value>> {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), params.clone()));
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(self.envelope.clone())
    }
}

/// Transport that always fails with a runtime error.
pub struct BrokenTransport;

#[async_trait]
impl Transport for BrokenTransport {
    async fn send(&self, _url: &str, _params: &Map<String, Value>) -> Result<Envelope<Value>> {
        Err(CourierError::Runtime("transport blew up".to_string()))
    }
}
