//! Resumable, pull-based SSE event sequence.
//!
//! [`SseStream`] is the consumer-facing handle. Every
//! [`pull()`](SseStream::pull) either returns the next event, transparently
//! (re)connects with exponential backoff, or reports the end of the sequence.
//! Nothing happens between pulls: no background task, no read-ahead.

use std::{sync::Arc, time::Duration};

use futures_util::Stream;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use url::Url;

use crate::{
    config::SseConfig,
    connection::{ConnectionDriver, SseConnectionState},
    error::{SseError, SseResult},
    parse::Event,
    reconnect::calculate_backoff,
    transport::SseTransport,
};

/// Outcome of a single [`SseStream::pull`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Pull {
    /// The next event in the sequence.
    Event(Event),
    /// The sequence is over; every later pull returns `End` too.
    End,
}

impl Pull {
    /// Returns the event, if any.
    pub fn into_event(self) -> Option<Event> {
        match self {
            Self::Event(event) => Some(event),
            Self::End => None,
        }
    }

    /// Returns `true` if this marks the end of the sequence.
    pub fn is_end(&self) -> bool {
        matches!(self, Self::End)
    }
}

// ---------------------------------------------------------------------------
// SseHandle
// ---------------------------------------------------------------------------

/// Clone-able handle for closing an [`SseStream`] from another task.
///
/// Closing wakes any pull suspended on the network or in a backoff wait; that
/// pull resolves as [`Pull::End`].
#[derive(Clone, Debug)]
pub struct SseHandle {
    cancel: CancellationToken,
}

impl SseHandle {
    /// Request the stream to close. Idempotent.
    pub fn close(&self) {
        self.cancel.cancel();
    }

    /// Whether close (or external cancellation) has been requested.
    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

// ---------------------------------------------------------------------------
// SseStream
// ---------------------------------------------------------------------------

/// A resumable sequence of SSE events over repeated connections.
///
/// Only one pull can be outstanding at a time: every pulling method takes
/// `&mut self`.
pub struct SseStream {
    config: Arc<SseConfig>,
    url: Url,
    transport: Arc<dyn SseTransport>,
    cancel: CancellationToken,
    driver: Option<ConnectionDriver>,
    /// Cursor: id of the most recently emitted event.
    last_event_id: Option<String>,
    /// Latest `retry` advertised by the server.
    server_retry: Option<Duration>,
    retry_count: u32,
    attempts: u32,
    finished: bool,
}

impl SseStream {
    /// Create a stream using the default `reqwest` transport.
    ///
    /// No connection is made until the first pull.
    ///
    /// # Errors
    ///
    /// Returns [`SseError::Config`] if the configuration is invalid.
    #[cfg(feature = "reqwest")]
    pub fn new(config: SseConfig) -> SseResult<Self> {
        config.validate().map_err(SseError::config)?;
        let transport = crate::transport::ReqwestTransport::from_config(&config)?;
        Self::with_transport(config, transport)
    }

    /// Create a stream over a custom [`SseTransport`].
    ///
    /// # Errors
    ///
    /// Returns [`SseError::Config`] if the configuration is invalid.
    pub fn with_transport<T: SseTransport>(config: SseConfig, transport: T) -> SseResult<Self> {
        Self::with_shared_transport(config, Arc::new(transport))
    }

    /// Create a stream over a shared [`SseTransport`].
    ///
    /// # Errors
    ///
    /// Returns [`SseError::Config`] if the configuration is invalid.
    pub fn with_shared_transport(
        config: SseConfig,
        transport: Arc<dyn SseTransport>,
    ) -> SseResult<Self> {
        config.validate().map_err(SseError::config)?;
        let url = config.endpoint().map_err(SseError::config)?;
        let cancel = config.cancellation.clone().unwrap_or_default();
        let last_event_id = config.last_event_id.clone();

        Ok(Self {
            config: Arc::new(config),
            url,
            transport,
            cancel,
            driver: None,
            last_event_id,
            server_retry: None,
            retry_count: 0,
            attempts: 0,
            finished: false,
        })
    }

    /// Pull the next event.
    ///
    /// Suspends while connecting, reading or backing off. Returns
    /// [`Pull::End`] after cancellation, or once a connection ends and no
    /// retry is permitted. Transport failures never surface as errors.
    pub async fn pull(&mut self) -> Pull {
        loop {
            if self.finished {
                return Pull::End;
            }
            if self.cancel.is_cancelled() {
                self.finish("cancelled");
                return Pull::End;
            }

            let driver = self.driver.get_or_insert_with(|| {
                self.attempts = self.attempts.saturating_add(1);
                ConnectionDriver::new(
                    Arc::clone(&self.transport),
                    Arc::clone(&self.config),
                    self.url.clone(),
                    self.cancel.clone(),
                    self.last_event_id.clone(),
                )
            });

            if let Some(event) = driver.next_event().await {
                if driver.was_established() {
                    self.retry_count = 0;
                }
                if let Some(id) = event.id() {
                    self.last_event_id = Some(id.to_owned());
                }
                if let Some(retry) = event.retry() {
                    self.server_retry = Some(retry);
                }
                return Pull::Event(event);
            }

            let state = driver.state();
            if driver.was_established() {
                self.retry_count = 0;
            }
            self.driver = None;

            if !state.is_retryable() {
                self.finish("aborted");
                return Pull::End;
            }
            if !self.config.retry_enabled {
                self.finish("retry disabled");
                return Pull::End;
            }
            if let Some(max) = self.config.max_retries
                && self.retry_count >= max
            {
                warn!(max_retries = max, "SSE retry budget exhausted");
                self.finish("retry budget exhausted");
                return Pull::End;
            }

            self.retry_count = self.retry_count.saturating_add(1);
            let delay = self.retry_delay();
            warn!(
                state = %state,
                retry = self.retry_count,
                delay_ms = delay.as_millis() as u64,
                last_event_id = ?self.last_event_id,
                "SSE reconnecting after backoff"
            );
            if !backoff_wait(&self.cancel, delay).await {
                self.finish("cancelled during backoff");
                return Pull::End;
            }
        }
    }

    /// Pull the next event, `None` marking the end of the sequence.
    pub async fn next_event(&mut self) -> Option<Event> {
        self.pull().await.into_event()
    }

    /// Convert into a [`Stream`] of events.
    pub fn into_stream(self) -> impl Stream<Item = Event> + Send {
        futures_util::stream::unfold(self, |mut stream| async move {
            stream.next_event().await.map(|event| (event, stream))
        })
    }

    /// Close the stream: cancel the token, drop the current connection and
    /// end the sequence. Safe to call repeatedly and before the first pull.
    pub fn close(&mut self) {
        self.cancel.cancel();
        self.finish("closed");
    }

    /// A handle that can close this stream from elsewhere.
    pub fn handle(&self) -> SseHandle {
        SseHandle {
            cancel: self.cancel.clone(),
        }
    }

    /// The resumption cursor: id of the most recently emitted event, or the
    /// configured seed before any event carried one.
    pub fn last_event_id(&self) -> Option<&str> {
        self.last_event_id.as_deref()
    }

    /// Consecutive reconnections since the last established connection.
    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    /// Connection attempts made so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// State of the current connection attempt, if one is active.
    pub fn connection_state(&self) -> Option<SseConnectionState> {
        self.driver.as_ref().map(ConnectionDriver::state)
    }

    /// Whether the sequence has ended.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn retry_delay(&self) -> Duration {
        let mut backoff = self.config.backoff();
        if self.config.honor_server_retry
            && let Some(retry) = self.server_retry
        {
            backoff.initial_delay = retry.min(backoff.max_delay);
        }
        calculate_backoff(backoff, self.retry_count)
    }

    fn finish(&mut self, reason: &'static str) {
        if self.finished {
            return;
        }
        self.finished = true;
        self.driver = None;
        info!(url = %self.url, reason, attempts = self.attempts, "SSE stream finished");
    }
}

/// Sleep for `delay` unless cancelled first. Returns `false` on cancel.
async fn backoff_wait(cancel: &CancellationToken, delay: Duration) -> bool {
    if delay.is_zero() {
        return !cancel.is_cancelled();
    }
    tokio::select! {
        biased;

        () = cancel.cancelled() => false,
        () = tokio::time::sleep(delay) => true,
    }
}

impl std::fmt::Debug for SseStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SseStream")
            .field("url", &self.url.as_str())
            .field("last_event_id", &self.last_event_id)
            .field("retry_count", &self.retry_count)
            .field("attempts", &self.attempts)
            .field("finished", &self.finished)
            .field("driver", &self.driver)
            .finish()
    }
}
