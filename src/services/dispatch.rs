use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use crate::config::{TestDefaults, TestOverride};
use crate::correlation::{CorrelationCounter, CorrelationId};
use crate::envelope::Envelope;
use crate::error::{CourierError, Result};
use crate::interfaces::log::LogSink;
use crate::interfaces::transport::Transport;
use crate::log::{LogEvent, LogPhase, TracingLogSink};
use crate::services::transport::HttpTransport;

pub const MESSAGE_NO_TEST_DATA: &str = "no test data provided";

/// One outbound call: where to send it, what to send, and how.
pub struct DispatchOptions<T = Value> {
    pub url: String,
    /// Absent params become an empty JSON object before the transport runs.
    pub params: Option<Map<String, Value>>,
    /// Per-call transport, e.g. a GET adapter instead of the engine default.
    pub transport: Option<Arc<dyn Transport>>,
    pub test: Option<TestOverride<T>>,
}

impl<T> DispatchOptions<T> {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            params: None,
            transport: None,
            test: None,
        }
    }

    pub fn params(mut self, params: Map<String, Value>) -> Self {
        self.params = Some(params);
        self
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn test(mut self, test: TestOverride<T>) -> Self {
        self.test = Some(test);
        self
    }
}

/// Request dispatch engine: test defaults, correlation counter, default
/// transport, log sink. Construct one at startup; tests build isolated
/// instances.
pub struct Dispatcher {
    defaults: RwLock<TestDefaults>,
    counter: CorrelationCounter,
    transport: Arc<dyn Transport>,
    sink: Arc<dyn LogSink>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            defaults: RwLock::new(TestDefaults::default()),
            counter: CorrelationCounter::new(),
            transport: Arc::new(HttpTransport::new()),
            sink: Arc::new(TracingLogSink),
        }
    }

    pub fn with_test_defaults(mut self, defaults: TestDefaults) -> Self {
        self.defaults = RwLock::new(defaults);
        self
    }

    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_log_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Replace the process-wide test defaults. Last write wins.
    pub fn set_test_defaults(&self, defaults: TestDefaults) -> Result<()> {
        let mut guard = self
            .defaults
            .try_write()
            .map_err(|_| CourierError::Runtime("test defaults lock busy".to_string()))?;
        *guard = defaults;
        Ok(())
    }

    pub async fn test_defaults(&self) -> TestDefaults {
        self.defaults.read().await.clone()
    }

    /// Dispatch one call and resolve it to exactly one envelope. Never
    /// errors and never panics: all failure comes back as `success: false`.
    pub async fn dispatch<T>(&self, options: DispatchOptions<T>) -> Envelope<T>
    where
        T: Serialize + DeserializeOwned,
    {
        // Captured before the first await so concurrent dispatches get ids
        // in call order.
        let correlation_id = self.counter.next();

        let DispatchOptions {
            url,
            params,
            transport,
            test,
        } = options;
        let params = params.unwrap_or_default();

        let defaults = self.defaults.read().await.clone();
        let resolution = test.unwrap_or_default().resolve(&defaults);

        if resolution.is_test {
            self.emit(
                LogPhase::TestRequestParams,
                &url,
                correlation_id,
                Value::Object(params),
            );

            let Some(result) = resolution.result else {
                // Caller asked for test mode without supplying a mock:
                // fail fast, no simulated latency.
                let envelope = Envelope::fail(MESSAGE_NO_TEST_DATA);
                self.emit(
                    LogPhase::TestRequestResultFail,
                    &url,
                    correlation_id,
                    payload_of(&envelope),
                );
                return envelope;
            };

            tokio::time::sleep(resolution.delay).await;

            let phase = if result.success {
                LogPhase::TestRequestResultSuccess
            } else {
                LogPhase::TestRequestResultFail
            };
            self.emit(phase, &url, correlation_id, payload_of(&result));
            return result;
        }

        self.emit(
            LogPhase::RequestParams,
            &url,
            correlation_id,
            Value::Object(params.clone()),
        );

        let transport = transport.unwrap_or_else(|| self.transport.clone());
        let envelope = match transport.send(&url, &params).await {
            Ok(envelope) => typed(envelope),
            Err(e) => Envelope::fail(e.to_string()),
        };

        let phase = if envelope.success {
            LogPhase::RequestResultSuccess
        } else {
            LogPhase::RequestResultFail
        };
        self.emit(phase, &url, correlation_id, payload_of(&envelope));
        envelope
    }

    fn emit(&self, phase: LogPhase, url: &str, correlation_id: CorrelationId, payload: Value) {
        self.sink.log(&LogEvent {
            phase,
            url: url.to_string(),
            correlation_id,
            payload,
        });
    }
}

/// Narrow a transport envelope's JSON data into the caller's type. A success
/// envelope whose data does not match `T` degrades to a failure envelope; a
/// failure envelope keeps its message and drops unparseable data.
fn typed<T: DeserializeOwned>(envelope: Envelope<Value>) -> Envelope<T> {
    let Envelope {
        success,
        message,
        data,
    } = envelope;
    match data {
        None => Envelope {
            success,
            message,
            data: None,
        },
        Some(value) => match serde_json::from_value::<T>(value) {
            Ok(data) => Envelope {
                success,
                message,
                data: Some(data),
            },
            Err(e) if success => Envelope::fail(format!("serialization error: {e}")),
            Err(_) => Envelope {
                success,
                message,
                data: None,
            },
        },
    }
}

fn payload_of<T: Serialize>(envelope: &Envelope<T>) -> Value {
    serde_json::to_value(envelope).unwrap_or(Value::Null)
}
