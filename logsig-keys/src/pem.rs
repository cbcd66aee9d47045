//! Strict single-block PEM decoding.

use crate::KeyError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

const BEGIN: &str = "-----BEGIN ";
const DASHES: &str = "-----";

/// A decoded PEM block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PemBlock {
    /// Label from the BEGIN line (e.g., "PUBLIC KEY")
    pub label: String,
    /// Base64-decoded contents
    pub contents: Vec<u8>,
}

/// Decode exactly one PEM block.
///
/// Text before the BEGIN line is skipped. Only whitespace may follow the END
/// line; anything else is [`KeyError::TrailingData`].
pub fn decode_single(text: &str) -> Result<PemBlock, KeyError> {
    let start = text
        .find(BEGIN)
        .ok_or_else(|| malformed("no PEM BEGIN line found"))?;
    let after_begin = &text[start + BEGIN.len()..];

    let label_len = after_begin
        .find(DASHES)
        .ok_or_else(|| malformed("unterminated BEGIN line"))?;
    let label = &after_begin[..label_len];
    if label.contains(|c: char| c == '\r' || c == '\n') {
        return Err(malformed("unterminated BEGIN line"));
    }

    let body_and_rest = &after_begin[label_len + DASHES.len()..];
    let end_line = format!("-----END {}-----", label);
    let body_len = body_and_rest
        .find(&end_line)
        .ok_or_else(|| malformed(format!("missing END line for {}", label)))?;

    let body = &body_and_rest[..body_len];
    if body.contains(':') {
        // RFC 1421 headers only appear on encrypted blocks, which public keys never are.
        return Err(malformed("PEM headers are not supported"));
    }

    let encoded: String = body.chars().filter(|c| !c.is_whitespace()).collect();
    let contents = STANDARD
        .decode(encoded)
        .map_err(|e| malformed(format!("base64 decode error: {}", e)))?;

    let rest = &body_and_rest[body_len + end_line.len()..];
    if !rest.trim().is_empty() {
        return Err(KeyError::TrailingData);
    }

    Ok(PemBlock {
        label: label.to_string(),
        contents,
    })
}

fn malformed(message: impl Into<String>) -> KeyError {
    KeyError::MalformedKeyEncoding(message.into())
}
