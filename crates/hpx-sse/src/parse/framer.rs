//! Splits a text stream into raw event frames.

use super::constants::{CR, FRAME_DELIMITER, LF};

/// Incremental frame splitter.
///
/// Text is appended with all line endings (`\r\n`, `\r`, `\n`) normalised to
/// `\n`, then split on blank lines. Only the trailing, still incomplete frame
/// is kept between calls.
#[derive(Debug, Default)]
pub struct Framer {
    buffer: String,
    /// The previous chunk ended in `\r`; a leading `\n` belongs to it.
    pending_cr: bool,
    /// No delimiter starts before this offset of `buffer`.
    scanned: usize,
}

impl Framer {
    /// Create an empty framer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and return every frame it completes.
    pub fn feed(&mut self, chunk: &str) -> Vec<String> {
        if chunk.is_empty() {
            return Vec::new();
        }
        self.push_normalized(chunk);
        self.drain_frames()
    }

    /// Flush the buffered tail at end of stream.
    ///
    /// A server may close the connection without terminating its last record
    /// with a blank line; that record is still returned here.
    pub fn finish(&mut self) -> Option<String> {
        self.pending_cr = false;
        self.scanned = 0;
        let tail = std::mem::take(&mut self.buffer);
        (!is_blank(&tail)).then_some(tail)
    }

    /// The incomplete frame currently held.
    pub fn buffered(&self) -> &str {
        &self.buffer
    }

    fn push_normalized(&mut self, chunk: &str) {
        if !self.pending_cr && memchr::memchr(b'\r', chunk.as_bytes()).is_none() {
            self.buffer.push_str(chunk);
            return;
        }

        self.buffer.reserve(chunk.len());
        for ch in chunk.chars() {
            if std::mem::take(&mut self.pending_cr) && ch == LF {
                continue;
            }
            if ch == CR {
                self.buffer.push(LF);
                self.pending_cr = true;
            } else {
                self.buffer.push(ch);
            }
        }
    }

    /// Split off every complete frame, searching only bytes not already
    /// scanned by an earlier call.
    fn drain_frames(&mut self) -> Vec<String> {
        let mut frames = Vec::new();
        let mut start = 0;
        let mut from = self.scanned;
        while let Some(pos) = memchr::memmem::find(&self.buffer.as_bytes()[from..], FRAME_DELIMITER)
        {
            // The delimiter is ASCII, so both ends are char boundaries.
            let end = from + pos;
            let frame = &self.buffer[start..end];
            if !is_blank(frame) {
                frames.push(frame.to_owned());
            }
            start = end + FRAME_DELIMITER.len();
            from = start;
        }
        self.buffer.drain(..start);
        // A trailing `\n` may still pair with the next chunk.
        self.scanned = self.buffer.len().saturating_sub(FRAME_DELIMITER.len() - 1);
        frames
    }
}

fn is_blank(frame: &str) -> bool {
    frame.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames_of(chunks: &[&str]) -> Vec<String> {
        let mut framer = Framer::new();
        let mut frames = Vec::new();
        for chunk in chunks {
            frames.extend(framer.feed(chunk));
        }
        frames.extend(framer.finish());
        frames
    }

    #[test]
    fn test_single_chunk() {
        assert_eq!(
            frames_of(&["data: a\n\ndata: b\n\n"]),
            vec!["data: a".to_string(), "data: b".to_string()]
        );
    }

    #[test]
    fn test_incomplete_tail_is_retained() {
        let mut framer = Framer::new();
        assert_eq!(framer.feed("data: a\n\ndata: b\n"), vec!["data: a".to_string()]);
        assert_eq!(framer.buffered(), "data: b\n");
        assert_eq!(framer.feed("\n"), vec!["data: b".to_string()]);
        assert_eq!(framer.buffered(), "");
    }

    #[test]
    fn test_delimiter_split_across_chunks() {
        assert_eq!(
            frames_of(&["data: a\n", "\ndata: b", "\n", "\n"]),
            vec!["data: a".to_string(), "data: b".to_string()]
        );
    }

    #[test]
    fn test_chunk_that_is_only_a_delimiter() {
        let mut framer = Framer::new();
        assert!(framer.feed("event: ping\ndata: 1").is_empty());
        assert_eq!(
            framer.feed("\n\n"),
            vec!["event: ping\ndata: 1".to_string()]
        );
    }

    #[test]
    fn test_empty_chunks_contribute_nothing() {
        let mut framer = Framer::new();
        assert!(framer.feed("").is_empty());
        assert!(framer.feed("data: x").is_empty());
        assert!(framer.feed("").is_empty());
        assert_eq!(framer.buffered(), "data: x");
    }

    #[test]
    fn test_crlf_and_cr_line_endings() {
        assert_eq!(
            frames_of(&["data: a\r\n\r\ndata: b\r\rdata: c\n\n"]),
            vec![
                "data: a".to_string(),
                "data: b".to_string(),
                "data: c".to_string()
            ]
        );
    }

    #[test]
    fn test_crlf_split_between_chunks() {
        // The `\n` that completes a `\r\n` must not count as a second line break.
        let mut framer = Framer::new();
        assert!(framer.feed("data: a\r").is_empty());
        assert!(framer.feed("\ndata: b\r").is_empty());
        assert_eq!(framer.buffered(), "data: a\ndata: b\n");
        assert_eq!(
            framer.feed("\n\r\n"),
            vec!["data: a\ndata: b".to_string()]
        );
    }

    #[test]
    fn test_whitespace_only_frames_discarded() {
        assert_eq!(
            frames_of(&["\n\n\n\n  \n\ndata: a\n\n \t\n\n"]),
            vec!["data: a".to_string()]
        );
    }

    #[test]
    fn test_flush_emits_unterminated_tail() {
        assert_eq!(
            frames_of(&["data: a\n\n", "data: last"]),
            vec!["data: a".to_string(), "data: last".to_string()]
        );

        let mut framer = Framer::new();
        framer.feed("   \n");
        assert_eq!(framer.finish(), None);
    }

    #[test]
    fn test_long_frame_fed_bytewise_scans_only_new_bytes() {
        let payload = "a".repeat(64 * 1024);
        let text = format!("data: {payload}\n\n");
        let mut framer = Framer::new();
        let mut frames = Vec::new();

        for (i, ch) in text.char_indices() {
            frames.extend(framer.feed(&text[i..i + ch.len_utf8()]));
            // Everything but the last byte has already been searched.
            assert!(framer.buffer.len() - framer.scanned <= 1, "offset {i}");
        }

        assert_eq!(frames, vec![format!("data: {payload}")]);
        assert!(framer.buffered().is_empty());
        assert_eq!(framer.scanned, 0);
    }

    #[test]
    fn test_delimiter_split_across_chunks_after_scan() {
        let mut framer = Framer::new();
        assert!(framer.feed("data: a\n").is_empty());
        assert!(framer.feed("data: b\n").is_empty());
        assert_eq!(framer.feed("\ndata: c\n"), vec!["data: a\ndata: b".to_string()]);
        assert_eq!(framer.feed("\n"), vec!["data: c".to_string()]);
    }
}
