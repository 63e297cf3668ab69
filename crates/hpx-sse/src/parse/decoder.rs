//! Byte chunk to text chunk decoding.

use bytes::{Buf, BytesMut};

use super::constants::BOM;

/// Streaming UTF-8 decoder.
///
/// Holds back an incomplete multi-byte sequence at the end of a chunk until
/// the next chunk completes it, so a character split across network reads is
/// never mangled. Invalid sequences are replaced with U+FFFD. A byte-order
/// mark at the very start of the stream is dropped, even when it is split
/// across chunks.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: BytesMut,
    started: bool,
}

impl Utf8Decoder {
    /// Create a decoder positioned at the start of a stream.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a chunk, returning every character it completes.
    pub fn feed(&mut self, chunk: &[u8]) -> String {
        if chunk.is_empty() {
            return String::new();
        }
        self.pending.extend_from_slice(chunk);

        if !self.started {
            match starts_with_bom(&self.pending) {
                Some(true) => {
                    self.started = true;
                    self.pending.advance(BOM.len());
                }
                Some(false) => self.started = true,
                None => return String::new(),
            }
        }

        let mut out = String::with_capacity(self.pending.len());
        loop {
            match core::str::from_utf8(&self.pending) {
                Ok(text) => {
                    out.push_str(text);
                    self.pending.clear();
                    break;
                }
                Err(err) => {
                    let valid = err.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&self.pending[..valid]));
                    match err.error_len() {
                        Some(invalid) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            self.pending.advance(valid + invalid);
                        }
                        // Incomplete sequence at the end: wait for more bytes.
                        None => {
                            self.pending.advance(valid);
                            break;
                        }
                    }
                }
            }
        }
        out
    }

    /// Flush whatever is still held back at end of stream.
    pub fn finish(&mut self) -> String {
        let out = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        out
    }

    /// Number of bytes held back waiting for the rest of a character.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

const fn starts_with_bom(buf: &[u8]) -> Option<bool> {
    match buf.len() {
        0 => None,
        1 => {
            if buf[0] == BOM[0] {
                None
            } else {
                Some(false)
            }
        }
        2 => {
            if buf[0] == BOM[0] && buf[1] == BOM[1] {
                None
            } else {
                Some(false)
            }
        }
        _gte_3 => Some(buf[0] == BOM[0] && buf[1] == BOM[1] && buf[2] == BOM[2]),
    }
}
