//! Default transport backed by `reqwest`.

use async_trait::async_trait;
use futures_util::{StreamExt, TryStreamExt};
use tracing::debug;

use super::{SseRequest, SseResponse, SseTransport};
use crate::{
    config::SseConfig,
    error::{SseError, SseResult},
};

/// [`SseTransport`] implementation over a [`reqwest::Client`](::reqwest::Client).
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: ::reqwest::Client,
}

impl ReqwestTransport {
    /// Wrap an existing client.
    pub fn with_client(client: ::reqwest::Client) -> Self {
        Self { client }
    }

    /// Build a client suited to `config`.
    ///
    /// `with_credentials` turns on the client's cookie store so cookies set by
    /// the server are replayed on reconnection.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the client cannot be built.
    pub fn from_config(config: &SseConfig) -> SseResult<Self> {
        let mut builder = ::reqwest::Client::builder().cookie_store(config.with_credentials);
        if let Some(timeout) = config.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| SseError::config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl SseTransport for ReqwestTransport {
    async fn open(&self, request: SseRequest) -> SseResult<SseResponse> {
        let mut req = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            req = req.body(body);
        }

        let resp = req.send().await?;
        let status = resp.status();
        let headers = resp.headers().clone();
        debug!(%status, "SSE response received");

        let body = resp.bytes_stream().map_err(SseError::from).boxed();
        Ok(SseResponse {
            status,
            headers,
            body: Some(body),
        })
    }
}
