//! Digest primitives for cache key derivation.
//!
//! The primary path serializes the ordered field tuple to a canonical JSON
//! array and hashes it with SHA-256. If serialization ever fails, a
//! colon-delimited render hashed with the standard hasher keeps key
//! derivation deterministic; derivation itself is infallible.

use std::hash::{DefaultHasher, Hash, Hasher};

use sha2::{Digest, Sha256};
use tracing::warn;

use super::Field;

/// Digest an ordered field tuple into lowercase hex.
pub(super) fn digest_fields(fields: &[(&'static str, Field)]) -> String {
    match canonical_json(fields) {
        Ok(text) => sha256_hex(&text),
        Err(err) => {
            warn!(error = %err, "canonical serialization failed, using fallback key digest");
            fallback_digest(fields)
        }
    }
}

/// Canonical textual form: a JSON array of `[name, value]` pairs.
///
/// An array keeps the documented field order in the digest input regardless
/// of how JSON objects happen to order their keys.
fn canonical_json(fields: &[(&'static str, Field)]) -> Result<String, serde_json::Error> {
    serde_json::to_string(fields)
}

fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Deterministic non-cryptographic fallback over the present fields.
pub(super) fn fallback_digest(fields: &[(&'static str, Field)]) -> String {
    let mut rendered = String::new();
    for (name, field) in fields {
        let value = match field {
            Field::Null => continue,
            Field::Text(text) => text.clone(),
            Field::Int(number) => number.to_string(),
            Field::Flag(flag) => flag.to_string(),
        };
        rendered.push(':');
        rendered.push_str(name);
        rendered.push(':');
        rendered.push_str(&value);
    }

    let mut hasher = DefaultHasher::new();
    rendered.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}
