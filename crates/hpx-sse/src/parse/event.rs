//! Representation of decoded SSE events.

use core::time::Duration;

use super::constants::DEFAULT_EVENT_TYPE;

/// One decoded SSE event.
///
/// Events are immutable once built; fields are exposed through accessors.
/// Two events are equal when all four fields are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Event {
    event: String,
    data: String,
    id: Option<String>,
    retry: Option<Duration>,
}

impl Event {
    /// Create an event with the given type and data payload.
    ///
    /// An empty event type falls back to `"message"`.
    pub fn new(event: impl Into<String>, data: impl Into<String>) -> Self {
        let mut event = event.into();
        if event.is_empty() {
            event.push_str(DEFAULT_EVENT_TYPE);
        }
        Self {
            event,
            data: data.into(),
            id: None,
            retry: None,
        }
    }

    /// Create a default `"message"` event carrying `data`.
    pub fn message(data: impl Into<String>) -> Self {
        Self::new(DEFAULT_EVENT_TYPE, data)
    }

    /// Attach an event id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Attach a server-suggested reconnection delay.
    #[must_use]
    pub fn with_retry(mut self, retry: Duration) -> Self {
        self.retry = Some(retry);
        self
    }

    /// The event type (`"message"` unless the frame named one).
    pub fn event_type(&self) -> &str {
        &self.event
    }

    /// The data payload, multiple `data` lines joined with `\n`.
    pub fn data(&self) -> &str {
        &self.data
    }

    /// The event id, which becomes the resumption cursor once emitted.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// The reconnection delay advertised by the server, if any.
    pub fn retry(&self) -> Option<Duration> {
        self.retry
    }

    /// Consume the event and return its data payload.
    pub fn into_data(self) -> String {
        self.data
    }
}
