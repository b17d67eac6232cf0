use std::sync::Arc;

use once_cell::sync::OnceCell;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::TestDefaults;
use crate::envelope::Envelope;
use crate::services::dispatch::{DispatchOptions, Dispatcher};
use crate::services::transport::HttpTransport;

static GLOBAL: OnceCell<Dispatcher> = OnceCell::new();

/// Process-wide dispatcher configuration, applied once at startup.
#[derive(Debug, Default)]
pub struct SetupOptions {
    /// Base URL joined against relative dispatch URLs.
    pub base_url: Option<String>,
    pub test_defaults: TestDefaults,
}

/// Initialize the process-wide dispatcher. The first call wins; later calls
/// are no-ops and return the already-configured instance.
pub fn setup(options: SetupOptions) -> &'static Dispatcher {
    GLOBAL.get_or_init(|| {
        let mut transport = HttpTransport::new();
        if let Some(base_url) = options.base_url {
            transport = transport.with_base_url(base_url);
        }
        Dispatcher::new()
            .with_transport(Arc::new(transport))
            .with_test_defaults(options.test_defaults)
    })
}

/// The process-wide dispatcher, default-configured if [`setup`] never ran.
pub fn global() -> &'static Dispatcher {
    GLOBAL.get_or_init(Dispatcher::new)
}

/// Dispatch through the process-wide dispatcher.
pub async fn send_request<T>(options: DispatchOptions<T>) -> Envelope<T>
where
    T: Serialize + DeserializeOwned,
{
    global().dispatch(options).await
}
