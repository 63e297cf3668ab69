//! Common constants used across the SSE parser.

/// Newline character.
pub(crate) const LF: char = '\n';
/// Carriage return character.
pub(crate) const CR: char = '\r';

/// Frame delimiter once line endings have been normalised to [`LF`].
pub(crate) const FRAME_DELIMITER: &[u8] = b"\n\n";

/// Byte Order Mark as char
const BOM_CHAR: char = '\u{FEFF}';
const BOM_LEN: usize = BOM_CHAR.len_utf8();
// bom           = %xFEFF ; U+FEFF BYTE ORDER MARK
/// Byte representation of the BOM [`char`]
pub(crate) const BOM: &[u8; BOM_LEN] = &{
    let mut buf = [0u8; BOM_LEN];
    BOM_CHAR.encode_utf8(&mut buf);
    buf
};

/// Default event type (`"message"`) for frames without an `event` field.
pub(crate) const DEFAULT_EVENT_TYPE: &str = "message";
