//! Canonical CBOR wire encoding for tagged signatures.
//!
//! A `TaggedSignature` travels as a CBOR map with integer keys:
//!
//! ```text
//! { 1: hash_algorithm (int), 2: signature_algorithm (int), 3: signature (bytes) }
//! ```
//!
//! ## Canonicalization Rules (RFC 8949 Section 4.2)
//! 1. Keys in maps MUST be sorted by encoded byte string
//! 2. Integers and lengths encoded in minimal form
//! 3. No indefinite-length encoding
//! 4. Exactly one data item, no trailing bytes

use crate::types::TaggedSignature;
use ciborium::value::{Integer, Value};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const KEY_HASH_ALGORITHM: u8 = 1;
const KEY_SIGNATURE_ALGORITHM: u8 = 2;
const KEY_SIGNATURE: u8 = 3;

/// Deepest array/map/tag nesting accepted on the wire.
const MAX_NESTING: usize = 128;

#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("CBOR encoding error: {0}")]
    Encode(#[from] ciborium::ser::Error<std::io::Error>),

    #[error("CBOR decoding error: {0}")]
    Decode(#[from] ciborium::de::Error<std::io::Error>),

    #[error("Non-canonical CBOR: {0}")]
    NonCanonical(String),

    #[error("Invalid tagged signature: {0}")]
    InvalidMessage(String),
}

pub type Result<T> = std::result::Result<T, SerializationError>;

/// Serialize a value to canonical CBOR bytes.
pub fn to_canonical_cbor<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::into_writer(value, &mut buf)?;

    // ciborium writes map entries in the order given; reject anything that
    // would not round-trip byte for byte.
    verify_canonical(&buf)?;

    Ok(buf)
}

/// Deserialize a value from canonical CBOR bytes.
pub fn from_canonical_cbor<T: for<'de> Deserialize<'de>>(bytes: &[u8]) -> Result<T> {
    verify_canonical(bytes)?;
    let value = ciborium::from_reader(bytes)?;
    Ok(value)
}

impl TaggedSignature {
    /// Encode to the canonical CBOR wire form.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let map = Value::Map(vec![
            (
                Value::from(KEY_HASH_ALGORITHM),
                Value::from(i32::from(self.hash_algorithm)),
            ),
            (
                Value::from(KEY_SIGNATURE_ALGORITHM),
                Value::from(i32::from(self.signature_algorithm)),
            ),
            (Value::from(KEY_SIGNATURE), Value::Bytes(self.signature.clone())),
        ]);
        to_canonical_cbor(&map)
    }

    /// Decode from the canonical CBOR wire form.
    ///
    /// Unknown algorithm identifiers are preserved, not rejected; the verifier
    /// decides whether they are usable.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let value: Value = from_canonical_cbor(bytes)?;
        let entries = match value {
            Value::Map(entries) => entries,
            _ => return Err(invalid("expected a map")),
        };

        if entries.len() != 3 {
            return Err(invalid(format!("expected 3 fields, found {}", entries.len())));
        }

        let mut fields = entries.into_iter();
        let hash_algorithm = expect_int(fields.next(), KEY_HASH_ALGORITHM)?;
        let signature_algorithm = expect_int(fields.next(), KEY_SIGNATURE_ALGORITHM)?;
        let signature = match fields.next() {
            Some((key, Value::Bytes(bytes))) if key_is(&key, KEY_SIGNATURE) => bytes,
            _ => return Err(invalid("field 3 must be a byte string")),
        };

        Ok(TaggedSignature::new(
            hash_algorithm.into(),
            signature_algorithm.into(),
            signature,
        ))
    }
}

fn invalid(message: impl Into<String>) -> SerializationError {
    SerializationError::InvalidMessage(message.into())
}

fn key_is(key: &Value, expected: u8) -> bool {
    matches!(key, Value::Integer(i) if *i == Integer::from(expected))
}

fn expect_int(entry: Option<(Value, Value)>, key: u8) -> Result<i32> {
    match entry {
        Some((k, Value::Integer(i))) if key_is(&k, key) => i32::try_from(i128::from(i))
            .map_err(|_| invalid(format!("field {} out of range", key))),
        _ => Err(invalid(format!("field {} must be an integer", key))),
    }
}

/// Verify that `bytes` hold exactly one canonical CBOR data item.
///
/// Checks for:
/// - No indefinite-length encoding (additional info 31)
/// - Minimal integer and length encoding
/// - Map keys in strictly ascending encoded-byte order
/// - No trailing bytes
/// - Nesting no deeper than `MAX_NESTING`
fn verify_canonical(bytes: &[u8]) -> Result<()> {
    let end = verify_canonical_item(bytes, 0, 0)?;
    if end != bytes.len() {
        return Err(non_canonical(format!(
            "{} trailing bytes after data item",
            bytes.len() - end
        )));
    }
    Ok(())
}

fn non_canonical(message: impl Into<String>) -> SerializationError {
    SerializationError::NonCanonical(message.into())
}

fn take(bytes: &[u8], pos: usize, len: usize) -> Result<&[u8]> {
    pos.checked_add(len)
        .and_then(|end| bytes.get(pos..end))
        .ok_or_else(|| non_canonical("unexpected end of input"))
}

/// Verify one item starting at `pos`; returns the offset just past it.
fn verify_canonical_item(bytes: &[u8], pos: usize, depth: usize) -> Result<usize> {
    if depth > MAX_NESTING {
        return Err(non_canonical("nesting too deep"));
    }

    let initial = take(bytes, pos, 1)?[0];
    let major_type = initial >> 5;
    let additional_info = initial & 0x1F;
    let mut pos = pos + 1;

    // Check for indefinite-length encoding (not allowed in canonical form)
    if additional_info == 31 {
        return Err(non_canonical("indefinite-length encoding"));
    }

    let argument = match additional_info {
        0..=23 => u64::from(additional_info),
        24..=27 => {
            let width = 1usize << (additional_info - 24);
            let raw = take(bytes, pos, width)?;
            pos += width;
            let value = raw.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b));
            let minimal = match width {
                1 => value >= 24,
                2 => value > 0xFF,
                4 => value > 0xFFFF,
                _ => value > 0xFFFF_FFFF,
            };
            // Floats (major type 7) carry their payload in the argument bytes.
            if !minimal && major_type != 7 {
                return Err(non_canonical("non-minimal integer encoding"));
            }
            value
        }
        _ => return Err(non_canonical("reserved additional information")),
    };

    let length = usize::try_from(argument).map_err(|_| non_canonical("length overflow"))?;

    match major_type {
        0 | 1 | 7 => Ok(pos),
        2 | 3 => {
            take(bytes, pos, length)?;
            Ok(pos + length)
        }
        4 => {
            for _ in 0..length {
                pos = verify_canonical_item(bytes, pos, depth + 1)?;
            }
            Ok(pos)
        }
        5 => {
            let mut previous_key: Option<&[u8]> = None;
            for _ in 0..length {
                let key_end = verify_canonical_item(bytes, pos, depth + 1)?;
                let key = &bytes[pos..key_end];
                if let Some(previous) = previous_key {
                    if previous >= key {
                        return Err(non_canonical("map keys not in ascending order"));
                    }
                }
                previous_key = Some(key);
                pos = verify_canonical_item(bytes, key_end, depth + 1)?;
            }
            Ok(pos)
        }
        6 => verify_canonical_item(bytes, pos, depth + 1),
        _ => unreachable!("major type is three bits"),
    }
}
