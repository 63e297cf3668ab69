//! Transport abstraction for opening SSE connections.
//!
//! The connection driver only needs one capability from the network: "send
//! this request and give me the status, headers and a byte stream". That seam
//! is the [`SseTransport`] trait. A `reqwest`-backed implementation ships
//! behind the default `reqwest` feature; tests and embedders can supply their
//! own.

use std::{fmt, pin::Pin, time::Duration};

use async_trait::async_trait;
use bytes::Bytes;
use futures_core::Stream;
use url::Url;

use crate::error::SseResult;

#[cfg(feature = "reqwest")]
mod reqwest;

#[cfg(feature = "reqwest")]
pub use self::reqwest::ReqwestTransport;

/// Response body as a stream of byte chunks.
///
/// The driver polls this only while a consumer is waiting for an event, so a
/// transport that reads lazily gets backpressure for free.
pub type ByteStream = Pin<Box<dyn Stream<Item = SseResult<Bytes>> + Send>>;

/// A single SSE connection request, fully resolved by the driver.
#[derive(Clone, Debug)]
pub struct SseRequest {
    /// Target endpoint.
    pub url: Url,
    /// HTTP method.
    pub method: http::Method,
    /// Custom headers merged with the protocol headers (`Accept`,
    /// `Cache-Control`, `Last-Event-ID`).
    pub headers: http::HeaderMap,
    /// Optional request body.
    pub body: Option<Bytes>,
    /// Whether ambient credentials (cookies) may be attached.
    pub with_credentials: bool,
    /// Connection establishment bound, if configured.
    pub connect_timeout: Option<Duration>,
}

impl SseRequest {
    /// The `Last-Event-ID` header value carried by this request, if any.
    pub fn last_event_id(&self) -> Option<&str> {
        self.headers
            .get(crate::connection::LAST_EVENT_ID)
            .and_then(|value| value.to_str().ok())
    }
}

/// What a transport hands back after sending an [`SseRequest`].
pub struct SseResponse {
    /// HTTP status code.
    pub status: http::StatusCode,
    /// Response headers.
    pub headers: http::HeaderMap,
    /// Response body; `None` when the transport has nothing readable.
    pub body: Option<ByteStream>,
}

impl SseResponse {
    /// A `200 OK` response streaming `body`.
    pub fn ok(body: ByteStream) -> Self {
        Self {
            status: http::StatusCode::OK,
            headers: http::HeaderMap::new(),
            body: Some(body),
        }
    }

    /// A bodiless response with the given status.
    pub fn status(status: http::StatusCode) -> Self {
        Self {
            status,
            headers: http::HeaderMap::new(),
            body: None,
        }
    }
}

impl fmt::Debug for SseResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SseResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("body", &self.body.as_ref().map(|_| "<stream>"))
            .finish()
    }
}

/// Opens SSE connections.
///
/// Implementations must not interpret the status code: non-success responses
/// are returned as-is and the driver decides what they mean. Returning an
/// error signals that no response was obtained at all (refused, reset, DNS).
/// The returned future may be dropped at any time to cancel the call.
#[async_trait]
pub trait SseTransport: Send + Sync + 'static {
    /// Send `request` and return the response head plus body stream.
    async fn open(&self, request: SseRequest) -> SseResult<SseResponse>;
}
