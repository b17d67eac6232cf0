use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::envelope::Envelope;
use crate::error::Result;

/// One outbound HTTP-style call, already normalized: HTTP error classes and
/// connectivity failures come back as `Ok` with `success: false`. `Err` is
/// reserved for request construction problems.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, url: &str, params: &Map<String, Value>) -> Result<Envelope<Value>>;
}
