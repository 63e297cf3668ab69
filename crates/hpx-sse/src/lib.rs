//! # hpx-sse
//!
//! Resumable, pull-based Server-Sent Events (SSE) client.
//!
//! - **Incremental Parsing**: byte chunks of any size and alignment are decoded
//!   into events, including fields, delimiters and multi-byte characters split
//!   across network reads.
//! - **Auto-Reconnection**: exponential backoff with a configurable cap and
//!   retry budget; a clean end of stream is retried like a failure.
//! - **Resumption**: the `id` of the last emitted event is sent back as
//!   `Last-Event-ID` on every reconnect.
//! - **Backpressure**: nothing is read from the network unless the consumer is
//!   pulling; there is no background task and no unbounded queue.
//! - **Cancellation**: a [`CancellationToken`](tokio_util::sync::CancellationToken)
//!   aborts in-flight requests, reads and backoff waits alike.
//!
//! # Architecture
//!
//! ```text
//! SseStream::pull()
//!   └─ ConnectionDriver (one per attempt) ──► SseTransport::open()
//!        │
//!        └─ body ─► Utf8Decoder ─► Framer ─► parse_frame ─► Event
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::time::Duration;
//!
//! use hpx_sse::{Pull, SseConfig, SseStream};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SseConfig::new("https://api.example.com/v1/stream")
//!     .initial_retry_delay(Duration::from_secs(1))
//!     .max_retries(Some(5));
//!
//! let mut stream = SseStream::new(config)?;
//! while let Pull::Event(event) = stream.pull().await {
//!     println!("type={} data={}", event.event_type(), event.data());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Module Index
//!
//! | Module | Description |
//! |--------|-------------|
//! | `config` | [`SseConfig`] builder for connection settings |
//! | [`connection`] | [`ConnectionDriver`] for a single attempt |
//! | [`parse`] | [`Utf8Decoder`], [`Framer`], [`parse_frame`], [`Event`] |
//! | `stream` | [`SseStream`], [`SseHandle`], [`Pull`] |
//! | [`transport`] | [`SseTransport`] seam and the default transport |

mod config;
pub mod connection;
pub mod error;
pub mod parse;
mod reconnect;
mod stream;
pub mod transport;

// Re-export config types
pub use config::SseConfig;
// Re-export connection types
pub use connection::{ConnectionDriver, LAST_EVENT_ID, SseConnectionState};
pub use error::{SseError, SseResult};
// Re-export parser types
pub use parse::{Event, Framer, Utf8Decoder, parse_frame};
// Re-export stream types
pub use stream::{Pull, SseHandle, SseStream};
#[cfg(feature = "reqwest")]
pub use transport::ReqwestTransport;
pub use transport::{ByteStream, SseRequest, SseResponse, SseTransport};
// Re-export the cancellation primitive used by `SseConfig::cancellation`.
pub use tokio_util::sync::CancellationToken;
