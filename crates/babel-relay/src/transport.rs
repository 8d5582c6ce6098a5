//! Outbound calls to the Babel service.

use crate::config::RelayConfig;
use crate::error::RelayError;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::debug;

/// One JSON POST to a Babel endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayRequest {
    pub url: String,
    /// Headers forwarded from the inbound request.
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

/// Performs one outbound call. Shared by every relay worker.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: RelayRequest) -> Result<RelayResponse, RelayError>;
}

/// Inbound headers that describe the inbound hop or body framing. The
/// client sets its own.
const UNFORWARDED_HEADERS: [&str; 9] = [
    "host",
    "content-type",
    "content-length",
    "connection",
    "keep-alive",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Whether an inbound header may be passed on to the Babel service.
pub fn is_forwarded(name: &str) -> bool {
    let name = name.trim().to_ascii_lowercase();
    !name.starts_with("proxy-") && !UNFORWARDED_HEADERS.contains(&name.as_str())
}

/// [`Transport`] over a pooled keep-alive `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(config: &RelayConfig) -> Result<Self, RelayError> {
        let client = Client::builder()
            .pool_max_idle_per_host(config.pool_size)
            .timeout(config.timeout()?)
            .no_gzip()
            .build()
            .map_err(RelayError::BuildClient)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: RelayRequest) -> Result<RelayResponse, RelayError> {
        let RelayRequest { url, headers, body } = request;
        let failed = |err: reqwest::Error| RelayError::Transport {
            url: url.clone(),
            reason: err.to_string(),
        };

        let mut outbound = self.client.post(&url);
        for (name, value) in headers.iter().filter(|(name, _)| is_forwarded(name)) {
            outbound = outbound.header(name.as_str(), value.as_str());
        }
        let response = outbound
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(failed)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.bytes().await.map_err(failed)?.to_vec();
        debug!(%url, status, bytes = body.len(), "relay call finished");
        Ok(RelayResponse {
            status,
            headers,
            body,
        })
    }
}
