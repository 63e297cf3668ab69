//! Field-level decoding of a single raw frame.

use core::time::Duration;

use super::{
    constants::{CR, LF},
    event::Event,
};

/// A single line of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EventLine<'a> {
    /// Comment line (starts with `:`).
    Comment,
    /// An empty line.
    Empty,
    /// A line without any colon; carries nothing.
    Malformed,
    /// A `name:value` line.
    Field {
        field_name: FieldName,
        field_value: &'a str,
    },
}

/// Field names recognised on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldName {
    Event,
    Data,
    Id,
    Retry,
    Ignored,
}

impl FieldName {
    fn from_name(name: &str) -> Self {
        match name {
            "event" => Self::Event,
            "data" => Self::Data,
            "id" => Self::Id,
            "retry" => Self::Retry,
            _ => Self::Ignored,
        }
    }
}

fn read_line(line: &str) -> EventLine<'_> {
    if line.is_empty() {
        return EventLine::Empty;
    }
    match memchr::memchr(b':', line.as_bytes()) {
        Some(0) => EventLine::Comment,
        Some(colon_pos) => {
            let value = &line[colon_pos + 1..];
            // Strip a single leading space if present.
            let value = value.strip_prefix(' ').unwrap_or(value);
            EventLine::Field {
                field_name: FieldName::from_name(&line[..colon_pos]),
                field_value: value,
            }
        }
        None => EventLine::Malformed,
    }
}

#[derive(Debug, Default)]
struct EventBuilder {
    event: Option<String>,
    data: Option<String>,
    id: Option<String>,
    retry: Option<Duration>,
}

impl EventBuilder {
    fn add(&mut self, line: EventLine<'_>) {
        match line {
            EventLine::Field {
                field_name: FieldName::Event,
                field_value,
            } => self.event = Some(field_value.to_owned()),
            EventLine::Field {
                field_name: FieldName::Data,
                field_value,
            } => match &mut self.data {
                Some(data) => {
                    data.push(LF);
                    data.push_str(field_value);
                }
                None => self.data = Some(field_value.to_owned()),
            },
            EventLine::Field {
                field_name: FieldName::Id,
                field_value,
            } => {
                if memchr::memchr(0, field_value.as_bytes()).is_none() {
                    self.id = Some(field_value.to_owned());
                }
            }
            EventLine::Field {
                field_name: FieldName::Retry,
                field_value,
            } => {
                if let Some(millis) = parse_retry(field_value) {
                    self.retry = Some(Duration::from_millis(millis));
                }
            }
            // Comments, blank lines, colon-less lines and unknown fields carry
            // nothing.
            EventLine::Comment
            | EventLine::Empty
            | EventLine::Malformed
            | EventLine::Field {
                field_name: FieldName::Ignored,
                ..
            } => (),
        }
    }

    fn build(self) -> Option<Event> {
        let data = self.data?;
        let mut event = Event::new(self.event.unwrap_or_default(), data);
        if let Some(id) = self.id {
            event = event.with_id(id);
        }
        if let Some(retry) = self.retry {
            event = event.with_retry(retry);
        }
        Some(event)
    }
}

/// `retry` only accepts ASCII digits; anything else (including a sign) is
/// dropped.
fn parse_retry(value: &str) -> Option<u64> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

/// Decode one raw frame into an [`Event`].
///
/// Returns `None` when the frame has no `data` field: keepalive comments,
/// frames carrying only `id`/`retry`/`event`, or nothing recognisable at all.
/// Malformed lines are dropped individually and never fail the frame.
pub fn parse_frame(frame: &str) -> Option<Event> {
    let mut builder = EventBuilder::default();
    for line in frame.split([LF, CR]) {
        builder.add(read_line(line));
    }
    builder.build()
}
