use crate::log::LogEvent;

/// Consumer of request lifecycle events. Formatting and output belong to
/// the sink; the dispatcher only guarantees the event shape.
pub trait LogSink: Send + Sync {
    fn log(&self, event: &LogEvent);
}
