//! Incremental SSE decoding pipeline.
//!
//! Each stage is a narrow `feed` / `finish` state machine with no knowledge of
//! the network, so the stages can be driven (and tested) on plain chunks:
//!
//! ```text
//! bytes ──► Utf8Decoder ──► text ──► Framer ──► frames ──► parse_frame ──► Event
//! ```
//!
//! The wire grammar follows the
//! [HTML Living Standard](https://html.spec.whatwg.org/multipage/server-sent-events.html)
//! with one deliberate simplification: a line without a colon is ignored
//! rather than treated as a field with an empty value.

pub(crate) mod constants;
pub mod decoder;
pub mod event;
pub mod framer;
pub mod parser;

pub use decoder::Utf8Decoder;
pub use event::Event;
pub use framer::Framer;
pub use parser::parse_frame;
