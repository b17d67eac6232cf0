pub mod config;
pub mod correlation;
pub mod envelope;
pub mod error;
pub mod interfaces;
pub mod log;
pub mod services;
pub mod setup;

pub use crate::config::{TestDefaults, TestOverride, TestResolution};
pub use crate::correlation::{CorrelationCounter, CorrelationId};
pub use crate::envelope::Envelope;
pub use crate::error::{CourierError, Result};
pub use crate::log::{LogEvent, LogPhase};
pub use crate::services::dispatch::{DispatchOptions, Dispatcher};
pub use crate::services::transport::{HttpTransport, Verb};
pub use crate::setup::{global, send_request, setup, SetupOptions};
