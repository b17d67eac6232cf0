use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::correlation::CorrelationId;
use crate::interfaces::log::LogSink;

/// Where in a call's lifecycle a [`LogEvent`] was emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogPhase {
    TestRequestParams,
    TestRequestResultSuccess,
    TestRequestResultFail,
    RequestParams,
    RequestResultSuccess,
    RequestResultFail,
}

impl LogPhase {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            LogPhase::TestRequestResultFail | LogPhase::RequestResultFail
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogPhase::TestRequestParams => "test_request_params",
            LogPhase::TestRequestResultSuccess => "test_request_result_success",
            LogPhase::TestRequestResultFail => "test_request_result_fail",
            LogPhase::RequestParams => "request_params",
            LogPhase::RequestResultSuccess => "request_result_success",
            LogPhase::RequestResultFail => "request_result_fail",
        }
    }
}

/// One structured event in the lifecycle of a dispatched call.
///
/// Produced by the dispatcher, handed to a [`LogSink`], never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEvent {
    pub phase: LogPhase,
    pub url: String,
    pub correlation_id: CorrelationId,
    pub payload: Value,
}

/// Default sink: structured `tracing` output, failures at warn level.
#[derive(Debug, Default)]
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn log(&self, event: &LogEvent) {
        if event.phase.is_failure() {
            tracing::warn!(
                phase = event.phase.as_str(),
                url = %event.url,
                correlation_id = %event.correlation_id,
                payload = %event.payload,
                "request"
            );
        } else {
            tracing::info!(
                phase = event.phase.as_str(),
                url = %event.url,
                correlation_id = %event.correlation_id,
                payload = %event.payload,
                "request"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_serialize_snake_case() {
        let value = serde_json::to_value(LogPhase::TestRequestResultFail).unwrap();
        assert_eq!(value, "test_request_result_fail");
        assert_eq!(LogPhase::RequestParams.as_str(), "request_params");
    }

    #[test]
    fn only_fail_phases_are_failures() {
        assert!(LogPhase::TestRequestResultFail.is_failure());
        assert!(LogPhase::RequestResultFail.is_failure());
        assert!(!LogPhase::RequestParams.is_failure());
        assert!(!LogPhase::TestRequestResultSuccess.is_failure());
    }
}
