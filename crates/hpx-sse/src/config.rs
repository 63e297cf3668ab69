//! SSE stream configuration.

use std::time::Duration;

use bytes::Bytes;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::reconnect::BackoffConfig;

/// Configuration for an [`SseStream`](crate::SseStream).
///
/// Built once, validated when the stream is created and never mutated
/// afterwards. Setters are chainable:
///
/// ```
/// use std::time::Duration;
///
/// use hpx_sse::SseConfig;
///
/// let config = SseConfig::new("https://api.example.com/v1/stream")
///     .initial_retry_delay(Duration::from_millis(500))
///     .max_retries(Some(5))
///     .last_event_id("evt-41");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug)]
pub struct SseConfig {
    /// SSE endpoint URL (http or https).
    pub url: String,
    /// HTTP method (usually GET, some APIs use POST).
    pub method: http::Method,
    /// Additional HTTP headers merged into every request.
    pub headers: http::HeaderMap,
    /// Optional request body (for POST-based SSE).
    pub body: Option<Bytes>,
    /// Send cookies and other ambient credentials with the request.
    pub with_credentials: bool,
    /// Reconnect automatically after the stream ends or fails.
    pub retry_enabled: bool,
    /// Delay before the first reconnection attempt.
    pub initial_retry_delay: Duration,
    /// Upper bound for reconnection delays.
    pub max_retry_delay: Duration,
    /// Backoff multiplier for reconnection delays.
    pub backoff_factor: f64,
    /// Random jitter factor (0.0–1.0) for reconnection delays.
    pub jitter: f64,
    /// Maximum number of consecutive reconnection attempts (None = infinite).
    pub max_retries: Option<u32>,
    /// Use a server-sent `retry` value as the base reconnection delay.
    pub honor_server_retry: bool,
    /// Cursor sent as `Last-Event-ID` on the very first attempt.
    pub last_event_id: Option<String>,
    /// Bound on connection establishment (not on the stream itself).
    pub connect_timeout: Option<Duration>,
    /// External cancellation; a private token is created when absent.
    pub cancellation: Option<CancellationToken>,
}

impl Default for SseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            method: http::Method::GET,
            headers: http::HeaderMap::new(),
            body: None,
            with_credentials: false,
            retry_enabled: true,
            initial_retry_delay: Duration::from_millis(1000),
            max_retry_delay: Duration::from_millis(30_000),
            backoff_factor: 2.0,
            jitter: 0.0,
            max_retries: None,
            honor_server_retry: false,
            last_event_id: None,
            connect_timeout: None,
            cancellation: None,
        }
    }
}

impl SseConfig {
    /// Create a new SSE configuration with the given URL.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set the HTTP method (e.g., `POST` for POST-based SSE).
    #[must_use]
    pub fn method(mut self, method: http::Method) -> Self {
        self.method = method;
        self
    }

    /// Set additional HTTP headers.
    #[must_use]
    pub fn headers(mut self, headers: http::HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Set the request body (for POST-based SSE).
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set whether credentials (cookies) accompany the request.
    #[must_use]
    pub fn with_credentials(mut self, with_credentials: bool) -> Self {
        self.with_credentials = with_credentials;
        self
    }

    /// Enable or disable automatic reconnection.
    #[must_use]
    pub fn retry_enabled(mut self, enabled: bool) -> Self {
        self.retry_enabled = enabled;
        self
    }

    /// Set the initial reconnection delay.
    #[must_use]
    pub fn initial_retry_delay(mut self, delay: Duration) -> Self {
        self.initial_retry_delay = delay;
        self
    }

    /// Set the maximum reconnection delay.
    #[must_use]
    pub fn max_retry_delay(mut self, delay: Duration) -> Self {
        self.max_retry_delay = delay;
        self
    }

    /// Set the reconnection backoff factor.
    #[must_use]
    pub fn backoff_factor(mut self, factor: f64) -> Self {
        self.backoff_factor = factor;
        self
    }

    /// Set the reconnection jitter factor.
    #[must_use]
    pub fn jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter;
        self
    }

    /// Set the maximum number of consecutive reconnection attempts.
    #[must_use]
    pub fn max_retries(mut self, retries: Option<u32>) -> Self {
        self.max_retries = retries;
        self
    }

    /// Let a server-sent `retry` field replace the initial reconnection delay.
    #[must_use]
    pub fn honor_server_retry(mut self, honor: bool) -> Self {
        self.honor_server_retry = honor;
        self
    }

    /// Seed the resumption cursor for the first connection attempt.
    #[must_use]
    pub fn last_event_id(mut self, id: impl Into<String>) -> Self {
        self.last_event_id = Some(id.into());
        self
    }

    /// Set the connection timeout.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Use an externally owned cancellation token.
    #[must_use]
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error message string if any field has an invalid value.
    pub fn validate(&self) -> Result<(), String> {
        self.endpoint()?;
        if self.connect_timeout.is_some_and(|timeout| timeout.is_zero()) {
            return Err("Connect timeout must be > 0".to_string());
        }
        self.backoff().validate()
    }

    /// Parse and check the endpoint URL.
    pub(crate) fn endpoint(&self) -> Result<Url, String> {
        if self.url.is_empty() {
            return Err("URL cannot be empty".to_string());
        }
        let url = Url::parse(&self.url).map_err(|e| format!("Invalid URL {:?}: {e}", self.url))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(format!("Unsupported URL scheme {scheme:?}, expected http or https")),
        }
    }

    pub(crate) fn backoff(&self) -> BackoffConfig {
        BackoffConfig {
            initial_delay: self.initial_retry_delay,
            max_delay: self.max_retry_delay,
            factor: self.backoff_factor,
            jitter: self.jitter,
        }
    }
}
