//! Payload preparation: whitespace normalization and base64 encoding.
//!
//! Source text copied out of a rich-text editor widget can carry non-breaking
//! spaces, zero-width joiners, byte-order marks and mixed line endings. The
//! contents API stores bytes verbatim, so those are cleaned up before encoding.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// Space variants collapsed to U+0020.
fn is_space_variant(c: char) -> bool {
    matches!(
        c,
        '\u{00A0}' | '\u{1680}' | '\u{2000}'..='\u{200A}' | '\u{202F}' | '\u{205F}' | '\u{3000}'
    )
}

/// Zero-width characters and the byte-order mark, dropped entirely.
fn is_invisible(c: char) -> bool {
    matches!(c, '\u{200B}'..='\u{200D}' | '\u{2060}' | '\u{FEFF}')
}

/// Normalize whitespace in editor text.
///
/// - Unicode space variants become a regular space.
/// - Zero-width characters and BOMs are removed.
/// - `\r\n` and lone `\r` become `\n`.
///
/// Idempotent: `normalize_content(&normalize_content(x)) == normalize_content(x)`.
pub fn normalize_content(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\r' {
            if chars.peek() == Some(&'\n') {
                chars.next();
            }
            out.push('\n');
        } else if is_space_variant(c) {
            out.push(' ');
        } else if !is_invisible(c) {
            out.push(c);
        }
    }

    out
}

/// Normalize `text` and encode its UTF-8 bytes as standard padded base64.
pub fn encode_content(text: &str) -> String {
    STANDARD.encode(normalize_content(text).as_bytes())
}

/// Decode a base64 payload back to text. Returns `None` for malformed base64
/// or non-UTF-8 bytes.
pub fn decode_content(encoded: &str) -> Option<String> {
    // The API wraps returned content at 60 columns.
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = STANDARD.decode(compact).ok()?;
    String::from_utf8(bytes).ok()
}
