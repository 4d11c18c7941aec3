//! Versioned envelope around every value written to the store.
//!
//! Values are written as `{"version": N, "data": ...}`. Anything else found
//! under a key (a bare JSON document, or plain text that is not JSON at all)
//! predates the envelope and is handed back as version 0 so the caller can
//! migrate it.
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{Error, Result};

/// Version written by this build
pub const SCHEMA_VERSION: u64 = 1;

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    version: u64,
    data: &'a T,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Envelope {
    version: u64,
    data: Value,
}

/// A stored value after the envelope was taken off
#[derive(Debug, PartialEq)]
pub enum Decoded {
    /// Written by this schema version
    Current(Value),
    /// Written before records were versioned
    Legacy(Value),
}

pub fn encode<T: Serialize>(data: &T) -> Result<String> {
    Ok(serde_json::to_string(&EnvelopeRef {
        version: SCHEMA_VERSION,
        data,
    })?)
}

/// Take the envelope off `raw`, the text stored under `key`
pub fn decode(key: &str, raw: &str) -> Result<Decoded> {
    let value = match serde_json::from_str::<Value>(raw) {
        Ok(value) => value,
        Err(_) => return Ok(Decoded::Legacy(Value::String(raw.to_string()))),
    };

    if !is_envelope(&value) {
        return Ok(Decoded::Legacy(value));
    }

    let envelope: Envelope = serde_json::from_value(value)?;
    match envelope.version {
        0 => Ok(Decoded::Legacy(envelope.data)),
        SCHEMA_VERSION => Ok(Decoded::Current(envelope.data)),
        found => Err(Error::UnsupportedVersion {
            key: key.to_string(),
            found,
        }),
    }
}

fn is_envelope(value: &Value) -> bool {
    match value.as_object() {
        Some(map) => {
            map.len() == 2
                && map.get("version").map_or(false, Value::is_u64)
                && map.contains_key("data")
        }
        None => false,
    }
}
