use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::envelope::Envelope;
use crate::error::{CourierError, Result};
use crate::interfaces::transport::Transport;

pub const MESSAGE_REQUEST_OK: &str = "request ok";
pub const MESSAGE_REQUEST_FAILED: &str = "request failed";
pub const MESSAGE_NETWORK_ERROR: &str = "network error or no response";

/// HTTP verb used for the outbound call. `Post` sends params as a JSON body,
/// `Get` sends them as a query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verb {
    #[default]
    Post,
    Get,
}

/// [`Transport`] over a `reqwest::Client`. Every response class and every
/// connectivity failure is folded into an [`Envelope`] before the dispatcher
/// sees it.
pub struct HttpTransport {
    client: reqwest::Client,
    verb: Verb,
    base_url: Option<String>,
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            verb: Verb::Post,
            base_url: None,
        }
    }

    pub fn post() -> Self {
        Self::new()
    }

    pub fn get() -> Self {
        Self {
            verb: Verb::Get,
            ..Self::new()
        }
    }

    /// Reuse an already-configured client, e.g. one with timeouts set.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Base URL that relative dispatch URLs are joined against.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    fn resolve_url(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            return url.to_string();
        }
        match &self.base_url {
            Some(base) => join_url(base, url),
            None => url.to_string(),
        }
    }

    fn query_pairs(params: &Map<String, Value>) -> Vec<(String, String)> {
        params
            .iter()
            .map(|(k, v)| {
                let value = match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (k.clone(), value)
            })
            .collect()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, url: &str, params: &Map<String, Value>) -> Result<Envelope<Value>> {
        let url = self.resolve_url(url);
        let request = match self.verb {
            Verb::Post => self.client.post(&url).json(params),
            Verb::Get => self.client.get(&url).query(&Self::query_pairs(params)),
        };

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) if e.is_builder() => {
                return Err(CourierError::Http(e.to_string()));
            }
            Err(_) => return Ok(Envelope::fail(MESSAGE_NETWORK_ERROR)),
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(_) => return Ok(Envelope::fail(MESSAGE_NETWORK_ERROR)),
        };
        let data = serde_json::from_str::<Value>(&body).ok();

        let envelope = if status.is_success() {
            Envelope {
                success: true,
                message: status
                    .canonical_reason()
                    .unwrap_or(MESSAGE_REQUEST_OK)
                    .to_string(),
                data,
            }
        } else {
            Envelope {
                success: false,
                message: status
                    .canonical_reason()
                    .unwrap_or(MESSAGE_REQUEST_FAILED)
                    .to_string(),
                data,
            }
        };
        Ok(envelope)
    }
}

fn join_url(base_url: &str, path: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}
