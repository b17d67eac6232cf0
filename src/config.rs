use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::envelope::Envelope;
use crate::error::{CourierError, Result};

/// Process-wide test-mode defaults, read by every dispatch and replaced
/// wholesale by [`crate::services::dispatch::Dispatcher::set_test_defaults`].
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct TestDefaults {
    /// Whether calls without a per-call `test` override run in test mode.
    #[serde(default)]
    pub test: bool,
    /// Simulated latency applied to mocked calls, in milliseconds.
    #[serde(default)]
    pub test_delay_ms: u64,
}

impl TestDefaults {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| CourierError::Config(e.to_string()))?;
        let defaults: TestDefaults =
            serde_json::from_str(&content).map_err(|e| CourierError::Config(e.to_string()))?;
        Ok(defaults)
    }

    pub fn test_delay(&self) -> Duration {
        Duration::from_millis(self.test_delay_ms)
    }
}

/// Per-call test configuration. Each field is `None` when the caller left it
/// out, which is distinct from an explicit `Some(false)` or `Some(0)`: only
/// absent fields fall back to the process-wide defaults.
#[derive(Debug, Clone)]
pub struct TestOverride<T> {
    pub test: Option<bool>,
    pub test_delay_ms: Option<u64>,
    pub test_result: Option<Envelope<T>>,
}

// Manual impl: the derive would demand `T: Default` even though every field
// defaults to `None`.
impl<T> Default for TestOverride<T> {
    fn default() -> Self {
        Self {
            test: None,
            test_delay_ms: None,
            test_result: None,
        }
    }
}

impl<T> TestOverride<T> {
    /// Mock the call with `result`, inheriting the default delay.
    pub fn mocked(result: Envelope<T>) -> Self {
        Self {
            test: Some(true),
            test_delay_ms: None,
            test_result: Some(result),
        }
    }

    /// Force the real transport path regardless of the process default.
    pub fn real() -> Self {
        Self {
            test: Some(false),
            test_delay_ms: None,
            test_result: None,
        }
    }

    /// Combine this override with the current defaults. Pure: the per-call
    /// `test` flag wins when present, delay falls back to the default, and
    /// the mock result is never inherited.
    pub fn resolve(self, defaults: &TestDefaults) -> TestResolution<T> {
        TestResolution {
            is_test: self.test.unwrap_or(defaults.test),
            delay: self
                .test_delay_ms
                .map(Duration::from_millis)
                .unwrap_or_else(|| defaults.test_delay()),
            result: self.test_result,
        }
    }
}

/// Outcome of merging a per-call [`TestOverride`] with the [`TestDefaults`].
#[derive(Debug, Clone)]
pub struct TestResolution<T> {
    pub is_test: bool,
    pub delay: Duration,
    pub result: Option<Envelope<T>>,
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serde_json::Value;

    use super::*;

    fn defaults(test: bool, delay_ms: u64) -> TestDefaults {
        TestDefaults {
            test,
            test_delay_ms: delay_ms,
        }
    }

    #[test]
    fn absent_test_flag_falls_back_to_default() {
        let resolution =
            TestOverride::<Value>::default().resolve(&defaults(true, 500));
        assert!(resolution.is_test);
        assert_eq!(resolution.delay, Duration::from_millis(500));
        assert!(resolution.result.is_none());
    }

    #[test]
    fn explicit_false_beats_a_true_default() {
        let resolution = TestOverride::<Value>::real().resolve(&defaults(true, 500));
        assert!(!resolution.is_test);
    }

    #[test]
    fn explicit_zero_delay_is_not_fallback() {
        let over = TestOverride::<Value> {
            test: Some(true),
            test_delay_ms: Some(0),
            test_result: None,
        };
        let resolution = over.resolve(&defaults(false, 500));
        assert!(resolution.is_test);
        assert_eq!(resolution.delay, Duration::ZERO);
    }

    #[test]
    fn mock_result_is_call_specific() {
        let over = TestOverride::mocked(Envelope::<Value>::fail("boom"));
        let resolution = over.resolve(&defaults(false, 0));
        assert!(resolution.is_test);
        assert_eq!(resolution.result.unwrap().message, "boom");
    }

    #[test]
    fn defaults_load_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"test": true, "test_delay_ms": 250}}"#).unwrap();
        let loaded = TestDefaults::from_file(file.path()).unwrap();
        assert_eq!(loaded, defaults(true, 250));
    }

    #[test]
    fn missing_defaults_file_is_a_config_error() {
        let err = TestDefaults::from_file("/nonexistent/defaults.json").unwrap_err();
        assert!(matches!(err, CourierError::Config(_)));
    }
}
