//! Canonical, order-independent hashing of structured values.
//!
//! Values are reduced with the objecthash scheme over the common JSON data
//! model: every node is hashed as `SHA-256(tag || payload)`, so two values that
//! differ only in type never share a payload.
//!
//! ## Hashing Rules
//! 1. `null` -> `n`, booleans -> `b` + `"1"`/`"0"`, strings -> `u` + UTF-8 bytes
//! 2. Numbers are f64 and hashed as `f` + normalized binary form
//! 3. Lists -> `l` + concatenated element hashes (order matters)
//! 4. Maps -> `d` + sorted concatenation of `hash(key) || hash(value)` pairs
//!    (insertion order does not matter)

use crate::lowering;
use crate::types::Hash256;
use serde::Serialize;
use serde_json::{Number, Value};
use sha2::{Digest, Sha256};
use std::fmt::Write as _;
use thiserror::Error;

/// Maximum nesting depth accepted by the hasher.
pub const MAX_DEPTH: usize = 128;

/// Prefix marking a string that stands in for the hash of a hidden value.
pub const REDACTED_PREFIX: &str = "**REDACTED**";

const MAX_FLOAT_REPR: usize = 1000;

#[derive(Debug, Error)]
pub enum HashError {
    #[error("Unhashable input: {0}")]
    UnhashableInput(String),
}

impl serde::ser::Error for HashError {
    fn custom<T: std::fmt::Display>(msg: T) -> Self {
        HashError::UnhashableInput(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, HashError>;

/// Hash any serializable value.
///
/// The value is first lowered to the JSON data model, so struct field order
/// and integer-vs-float representation do not affect the digest. Values nested
/// deeper than [`MAX_DEPTH`], including self-referential `Serialize` impls, are
/// rejected during lowering.
pub fn object_hash<T: Serialize + ?Sized>(object: &T) -> Result<Hash256> {
    hash_value(&lowering::to_value(object)?)
}

/// Hash a JSON value.
pub fn hash_value(value: &Value) -> Result<Hash256> {
    ObjectHasher { redaction: false }.hash(value, 0)
}

/// Hash any serializable value, honouring redaction markers produced by [`redact`].
pub fn object_hash_redactable<T: Serialize + ?Sized>(object: &T) -> Result<Hash256> {
    hash_value_redactable(&lowering::to_value(object)?)
}

/// Hash a JSON value, honouring redaction markers produced by [`redact`].
pub fn hash_value_redactable(value: &Value) -> Result<Hash256> {
    ObjectHasher { redaction: true }.hash(value, 0)
}

/// Replace a value with a marker that hashes identically under
/// [`hash_value_redactable`].
pub fn redact(value: &Value) -> Result<Value> {
    let hash = hash_value_redactable(value)?;
    Ok(Value::String(format!("{}{}", REDACTED_PREFIX, hex::encode(hash))))
}

struct ObjectHasher {
    redaction: bool,
}

impl ObjectHasher {
    fn hash(&self, value: &Value, depth: usize) -> Result<Hash256> {
        if depth > MAX_DEPTH {
            return Err(HashError::UnhashableInput(format!(
                "nesting exceeds {} levels",
                MAX_DEPTH
            )));
        }

        match value {
            Value::Null => Ok(tagged(b'n', b"")),
            Value::Bool(b) => Ok(tagged(b'b', if *b { b"1" } else { b"0" })),
            Value::Number(n) => hash_number(n),
            Value::String(s) => self.hash_string(s),
            Value::Array(items) => {
                let mut buf = Vec::with_capacity(items.len() * 32);
                for item in items {
                    buf.extend_from_slice(&self.hash(item, depth + 1)?);
                }
                Ok(tagged(b'l', &buf))
            }
            Value::Object(map) => {
                let mut entries = Vec::with_capacity(map.len());
                for (key, item) in map {
                    let mut entry = [0u8; 64];
                    entry[..32].copy_from_slice(&hash_unicode(key));
                    entry[32..].copy_from_slice(&self.hash(item, depth + 1)?);
                    entries.push(entry);
                }
                entries.sort_unstable();
                Ok(tagged(b'd', &entries.concat()))
            }
        }
    }

    fn hash_string(&self, s: &str) -> Result<Hash256> {
        if self.redaction {
            if let Some(encoded) = s.strip_prefix(REDACTED_PREFIX) {
                return decode_redacted(encoded);
            }
        }
        Ok(hash_unicode(s))
    }
}

fn decode_redacted(encoded: &str) -> Result<Hash256> {
    let bytes = hex::decode(encoded)
        .map_err(|e| HashError::UnhashableInput(format!("malformed redaction marker: {}", e)))?;
    bytes.try_into().map_err(|_| {
        HashError::UnhashableInput("redaction marker must carry a 32-byte hash".to_string())
    })
}

fn hash_unicode(s: &str) -> Hash256 {
    tagged(b'u', s.as_bytes())
}

fn hash_number(n: &Number) -> Result<Hash256> {
    let f = n
        .as_f64()
        .ok_or_else(|| HashError::UnhashableInput(format!("number {} is not representable", n)))?;
    let normalized = normalize_float(f)?;
    Ok(tagged(b'f', normalized.as_bytes()))
}

/// Render a float as `<sign><exponent>:<mantissa bits>` with the mantissa in (0.5, 1].
fn normalize_float(mut f: f64) -> Result<String> {
    if !f.is_finite() {
        return Err(HashError::UnhashableInput(format!("non-finite float {}", f)));
    }
    if f == 0.0 {
        return Ok("+0:".to_string());
    }

    let mut out = String::new();
    if f < 0.0 {
        out.push('-');
        f = -f;
    } else {
        out.push('+');
    }

    let mut exponent = 0i32;
    while f > 1.0 {
        f /= 2.0;
        exponent += 1;
    }
    while f <= 0.5 {
        f *= 2.0;
        exponent -= 1;
    }
    let _ = write!(out, "{}:", exponent);

    while f != 0.0 {
        if f >= 1.0 {
            out.push('1');
            f -= 1.0;
        } else {
            out.push('0');
        }
        if out.len() >= MAX_FLOAT_REPR {
            return Err(HashError::UnhashableInput("could not normalize float".to_string()));
        }
        f *= 2.0;
    }

    Ok(out)
}

fn tagged(tag: u8, payload: &[u8]) -> Hash256 {
    let mut hasher = Sha256::new();
    hasher.update([tag]);
    hasher.update(payload);
    hasher.finalize().into()
}
