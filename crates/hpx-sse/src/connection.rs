//! Single-attempt SSE connection driver.
//!
//! A [`ConnectionDriver`] owns exactly one physical connection. It opens the
//! request lazily on the first [`next_event()`](ConnectionDriver::next_event)
//! call, pipes the body through the decoding pipeline and reports how the
//! attempt ended through [`state()`](ConnectionDriver::state). Deciding
//! whether to try again is left to [`SseStream`](crate::SseStream).

use std::{collections::VecDeque, fmt, future::Future, sync::Arc, time::Duration};

use futures_util::StreamExt;
use http::{HeaderMap, HeaderValue, header::HeaderName};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::{
    config::SseConfig,
    error::{SseError, SseResult},
    parse::{Event, Framer, Utf8Decoder, parse_frame},
    transport::{ByteStream, SseRequest, SseResponse, SseTransport},
};

/// Resumption header carrying the cursor.
pub const LAST_EVENT_ID: HeaderName = HeaderName::from_static("last-event-id");

// ---------------------------------------------------------------------------
// Connection state
// ---------------------------------------------------------------------------

/// Lifecycle of one connection attempt.
///
/// ```text
/// Idle ─► Connecting ─► Streaming ─► Completed
///             │             │
///             └─► Failed ◄──┘        (any state) ─► Aborted
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SseConnectionState {
    /// Created, no request sent yet.
    Idle,
    /// Request in flight.
    Connecting,
    /// Response accepted, reading the body.
    Streaming,
    /// The server ended the body cleanly.
    Completed,
    /// Connecting or reading failed.
    Failed,
    /// Cancelled through the cancellation token.
    Aborted,
}

impl SseConnectionState {
    /// Returns `true` once the attempt can produce no more events.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Aborted)
    }

    /// Returns `true` if the attempt ended in a way that may be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for SseConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Connecting => write!(f, "Connecting"),
            Self::Streaming => write!(f, "Streaming"),
            Self::Completed => write!(f, "Completed"),
            Self::Failed => write!(f, "Failed"),
            Self::Aborted => write!(f, "Aborted"),
        }
    }
}

// ---------------------------------------------------------------------------
// ConnectionDriver
// ---------------------------------------------------------------------------

/// Drives one SSE connection attempt from request to end of body.
pub struct ConnectionDriver {
    transport: Arc<dyn SseTransport>,
    config: Arc<SseConfig>,
    url: Url,
    cancel: CancellationToken,
    last_event_id: Option<String>,
    state: SseConnectionState,
    body: Option<ByteStream>,
    decoder: Utf8Decoder,
    framer: Framer,
    /// Frames completed by the most recent chunk, not yet parsed.
    frames: VecDeque<String>,
    established: bool,
    last_error: Option<SseError>,
}

impl ConnectionDriver {
    /// Prepare an attempt against `url`, resuming from `last_event_id`.
    pub(crate) fn new(
        transport: Arc<dyn SseTransport>,
        config: Arc<SseConfig>,
        url: Url,
        cancel: CancellationToken,
        last_event_id: Option<String>,
    ) -> Self {
        Self {
            transport,
            config,
            url,
            cancel,
            last_event_id,
            state: SseConnectionState::Idle,
            body: None,
            decoder: Utf8Decoder::new(),
            framer: Framer::new(),
            frames: VecDeque::new(),
            established: false,
            last_error: None,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SseConnectionState {
        self.state
    }

    /// Whether the server accepted this attempt (reached `Streaming`).
    pub fn was_established(&self) -> bool {
        self.established
    }

    /// The error that ended this attempt, if it failed.
    pub fn last_error(&self) -> Option<&SseError> {
        self.last_error.as_ref()
    }

    /// The cursor this attempt was opened with.
    pub fn last_event_id(&self) -> Option<&str> {
        self.last_event_id.as_deref()
    }

    /// Pull the next event from this attempt.
    ///
    /// Returns `None` once the attempt reaches a terminal state; inspect
    /// [`state()`](Self::state) to learn which one. Reads at most one body
    /// chunk per call beyond what is already buffered.
    pub async fn next_event(&mut self) -> Option<Event> {
        loop {
            if !self.state.is_terminal() && self.cancel.is_cancelled() {
                self.abort();
                return None;
            }

            if let Some(event) = self.next_buffered() {
                return Some(event);
            }

            match self.state {
                SseConnectionState::Idle | SseConnectionState::Connecting => self.connect().await,
                SseConnectionState::Streaming => self.read_chunk().await,
                SseConnectionState::Completed
                | SseConnectionState::Failed
                | SseConnectionState::Aborted => return None,
            }
        }
    }

    fn next_buffered(&mut self) -> Option<Event> {
        while let Some(frame) = self.frames.pop_front() {
            if let Some(event) = parse_frame(&frame) {
                debug!(
                    event_type = %event.event_type(),
                    id = ?event.id(),
                    "SSE event received",
                );
                return Some(event);
            }
        }
        None
    }

    async fn connect(&mut self) {
        self.state = SseConnectionState::Connecting;
        let request = self.build_request();
        info!(
            url = %self.url,
            last_event_id = ?self.last_event_id,
            "SSE connecting"
        );

        let transport = Arc::clone(&self.transport);
        let cancel = self.cancel.clone();
        let open = with_timeout(self.config.connect_timeout, transport.open(request));
        let result = tokio::select! {
            biased;

            () = cancel.cancelled() => None,
            result = open => Some(result),
        };

        match result {
            None => self.abort(),
            Some(Ok(response)) => self.accept(response),
            Some(Err(err)) => {
                error!(url = %self.url, error = %err, "SSE connection failed");
                self.fail(err);
            }
        }
    }

    fn accept(&mut self, response: SseResponse) {
        if !response.status.is_success() {
            let err = SseError::invalid_status(response.status);
            error!(url = %self.url, status = %response.status, "SSE connection rejected");
            self.fail(err);
            return;
        }
        let Some(body) = response.body else {
            error!(url = %self.url, "SSE response has no body");
            self.fail(SseError::MissingBody);
            return;
        };

        info!(url = %self.url, status = %response.status, "SSE connection established");
        self.body = Some(body);
        self.established = true;
        self.state = SseConnectionState::Streaming;
    }

    async fn read_chunk(&mut self) {
        let cancel = self.cancel.clone();
        let Some(body) = self.body.as_mut() else {
            self.state = SseConnectionState::Completed;
            return;
        };

        let item = tokio::select! {
            biased;

            () = cancel.cancelled() => None,
            item = body.next() => Some(item),
        };

        match item {
            None => self.abort(),
            Some(Some(Ok(chunk))) => {
                let text = self.decoder.feed(&chunk);
                self.frames.extend(self.framer.feed(&text));
            }
            Some(Some(Err(err))) => {
                error!(url = %self.url, error = %err, "SSE stream error");
                self.fail(err);
            }
            Some(None) => {
                let tail = self.decoder.finish();
                self.frames.extend(self.framer.feed(&tail));
                self.frames.extend(self.framer.finish());
                self.body = None;
                self.state = SseConnectionState::Completed;
                info!(url = %self.url, "SSE stream ended");
            }
        }
    }

    fn build_request(&self) -> SseRequest {
        let mut headers: HeaderMap = self.config.headers.clone();
        headers.insert(
            http::header::ACCEPT,
            HeaderValue::from_static("text/event-stream"),
        );
        headers.insert(
            http::header::CACHE_CONTROL,
            HeaderValue::from_static("no-cache"),
        );

        if let Some(id) = self.last_event_id.as_deref().filter(|id| !id.is_empty()) {
            match HeaderValue::from_str(id) {
                Ok(value) => {
                    headers.insert(LAST_EVENT_ID, value);
                }
                Err(_) => warn!(id, "Last event id is not a valid header value, not sent"),
            }
        }

        SseRequest {
            url: self.url.clone(),
            method: self.config.method.clone(),
            headers,
            body: self.config.body.clone(),
            with_credentials: self.config.with_credentials,
            connect_timeout: self.config.connect_timeout,
        }
    }

    fn fail(&mut self, err: SseError) {
        self.release();
        self.last_error = Some(err);
        self.state = SseConnectionState::Failed;
    }

    fn abort(&mut self) {
        debug!(url = %self.url, "SSE connection aborted");
        self.release();
        self.state = SseConnectionState::Aborted;
    }

    /// Drop the body and every partially decoded byte with it.
    fn release(&mut self) {
        self.body = None;
        self.frames.clear();
        self.decoder = Utf8Decoder::new();
        self.framer = Framer::new();
    }
}

impl fmt::Debug for ConnectionDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionDriver")
            .field("url", &self.url.as_str())
            .field("state", &self.state)
            .field("last_event_id", &self.last_event_id)
            .field("established", &self.established)
            .field("buffered_frames", &self.frames.len())
            .finish()
    }
}

async fn with_timeout<F>(limit: Option<Duration>, open: F) -> SseResult<SseResponse>
where
    F: Future<Output = SseResult<SseResponse>>,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, open)
            .await
            .map_err(|_| SseError::timeout(limit))?,
        None => open.await,
    }
}
