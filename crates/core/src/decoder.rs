//! Literal decoder: the first stage of the pipeline.
//!
//! Replaces `base64.decode("...")` calls with the string they decode to and turns `\xHH` escapes
//! into the characters they name. Decoding is best-effort: a payload that does not decode is
//! left byte-for-byte as it was and reported as a [`DecodeSkip`].

use crate::{DecodeSkip, SourceBuffer};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use luaclear_utils::errors::DecodeError;
use regex::{Captures, Regex};
use std::sync::LazyLock;

static ENCODED_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bbase64\.decode\(\s*(?:"([^"\n]*)"|'([^'\n]*)')\s*\)"#)
        .expect("encoded call pattern is valid")
});

// a lone digit is matched too, so a truncated escape is reported instead of passing silently
static HEX_ESCAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\x([0-9a-fA-F]{1,2})").expect("hex escape pattern is valid"));

/// Output of [`decode_literals`].
#[derive(Debug, Clone)]
pub struct Decoded {
    pub buffer: SourceBuffer,
    /// encoded calls replaced by their decoded literal
    pub calls_decoded: usize,
    /// `\xHH` escapes replaced by their character
    pub escapes_decoded: usize,
    pub skips: Vec<DecodeSkip>,
}

/// Runs both literal decoders over `source`: encoded calls first, then hex escapes.
pub fn decode_literals(source: &SourceBuffer) -> Decoded {
    let mut skips = Vec::new();
    let (text, calls_decoded) = decode_encoded_calls(source.as_str(), &mut skips);
    let (text, escapes_decoded) = decode_hex_escapes(&text, &mut skips);

    tracing::debug!(
        "literal decoder: {} calls, {} escapes, {} skipped",
        calls_decoded,
        escapes_decoded,
        skips.len()
    );

    Decoded {
        buffer: SourceBuffer::new(text),
        calls_decoded,
        escapes_decoded,
        skips,
    }
}

/// Replaces every well-formed `base64.decode(<quoted payload>)` with a quoted literal.
pub fn decode_encoded_calls(text: &str, skips: &mut Vec<DecodeSkip>) -> (String, usize) {
    let mut count = 0;
    let out = ENCODED_CALL.replace_all(text, |caps: &Captures<'_>| {
        let payload = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map_or("", |m| m.as_str());
        match decode_payload(payload) {
            Ok(decoded) => {
                count += 1;
                quote_literal(&decoded)
            }
            Err(e) => {
                skips.push(DecodeSkip::new("base64", &caps[0], &e));
                caps[0].to_string()
            }
        }
    });
    (out.into_owned(), count)
}

/// Decodes one base64 payload to UTF-8 text.
pub fn decode_payload(payload: &str) -> Result<String, DecodeError> {
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| DecodeError::Base64(e.to_string()))?;
    String::from_utf8(bytes).map_err(|_| DecodeError::Utf8)
}

/// Replaces each `\xHH` with the character whose code point is `HH`.
///
/// An escape with a single hex digit is malformed and kept as written.
pub fn decode_hex_escapes(text: &str, skips: &mut Vec<DecodeSkip>) -> (String, usize) {
    let mut count = 0;
    let out = HEX_ESCAPE.replace_all(text, |caps: &Captures<'_>| {
        match hex::decode(&caps[1]) {
            Ok(bytes) => match bytes.first() {
                Some(&b) => {
                    count += 1;
                    char::from(b).to_string()
                }
                None => caps[0].to_string(),
            },
            Err(e) => {
                skips.push(DecodeSkip::new("hex_escape", &caps[0], &DecodeError::from(e)));
                caps[0].to_string()
            }
        }
    });
    (out.into_owned(), count)
}

/// Wraps `text` in double quotes, escaping what would otherwise end or break the literal.
pub fn quote_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                out.push_str(&format!("\\{:03}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
