//! The bencode boundary.
//!
//! Bencode only has integers, byte strings, lists and dictionaries, so the
//! richer document model is narrowed on the way out and widened on the way
//! in: byte strings become `Str` when they are UTF-8, except for `pieces`.

use serde_bencode::value::Value as Bencode;
use std::collections::HashMap;
use std::path::Path;

use crate::error::{CodecError, Result};
use crate::hashing::HashOptions;
use crate::models::{Dict, Document, Value};
use crate::reconcile::{Depth, reconcile};
use crate::validate::{Stage, check};

/// Keys whose byte strings are binary data and never text
const BINARY_KEYS: &[&str] = &["pieces"];

/// Parse a bencoded metainfo buffer. The result is not validated.
pub fn decode(bytes: &[u8]) -> Result<Document, CodecError> {
    let value: Bencode = serde_bencode::from_bytes(bytes).map_err(CodecError::Malformed)?;
    match from_bencode(value, None) {
        Value::Dict(root) => Ok(Document::from_dict(root)),
        other => Err(CodecError::NotADict(other.kind())),
    }
}

/// Encode a document as bencode with keys sorted at every level
pub fn encode(doc: &Document) -> Result<Vec<u8>, CodecError> {
    encode_dict(doc.root())
}

/// Encode a single mapping, e.g. `info` for computing the info hash
pub fn encode_dict(dict: &Dict) -> Result<Vec<u8>, CodecError> {
    let value = dict_to_bencode(dict)?;
    serde_bencode::to_bytes(&value).map_err(CodecError::Encode)
}

/// Check a document for completeness, reconcile its sizes against local
/// content when a content path is known, and encode it.
pub fn dump(doc: &Document, content: Option<&Path>) -> Result<Vec<u8>> {
    check(doc, Stage::Complete)?;
    if let Some(content) = content {
        reconcile(doc, content, Depth::Sizes, &HashOptions::default())?;
    }
    Ok(encode(doc)?)
}

fn from_bencode(value: Bencode, key: Option<&str>) -> Value {
    match value {
        Bencode::Int(i) => Value::Int(i),
        Bencode::Bytes(bytes) => {
            if key.is_some_and(|k| BINARY_KEYS.contains(&k)) {
                Value::Bytes(bytes)
            } else {
                match String::from_utf8(bytes) {
                    Ok(s) => Value::Str(s),
                    Err(e) => Value::Bytes(e.into_bytes()),
                }
            }
        }
        Bencode::List(items) => {
            Value::List(items.into_iter().map(|v| from_bencode(v, None)).collect())
        }
        Bencode::Dict(entries) => {
            let mut entries: Vec<(String, Bencode)> = entries
                .into_iter()
                .map(|(k, v)| (String::from_utf8_lossy(&k).into_owned(), v))
                .collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut dict = Dict::new();
            for (k, v) in entries {
                let value = from_bencode(v, Some(&k));
                dict.insert(k, value);
            }
            Value::Dict(dict)
        }
    }
}

fn to_bencode(value: &Value) -> Result<Bencode, CodecError> {
    Ok(match value {
        Value::Dict(dict) => dict_to_bencode(dict)?,
        Value::List(items) => {
            Bencode::List(items.iter().map(to_bencode).collect::<Result<_, _>>()?)
        }
        Value::Str(s) => Bencode::Bytes(s.as_bytes().to_vec()),
        Value::Bytes(b) => Bencode::Bytes(b.clone()),
        Value::Int(i) => Bencode::Int(*i),
        Value::Bool(b) => Bencode::Int(i64::from(*b)),
        // i64::MAX as f64 rounds up to 2^63, which no i64 can hold
        Value::Float(f) if f.fract() == 0.0 && (i64::MIN as f64..i64::MAX as f64).contains(f) => {
            Bencode::Int(*f as i64)
        }
        Value::Float(f) => return Err(CodecError::Float(*f)),
    })
}

fn dict_to_bencode(dict: &Dict) -> Result<Bencode, CodecError> {
    let mut entries = HashMap::with_capacity(dict.len());
    for (key, value) in dict.iter() {
        entries.insert(key.as_bytes().to_vec(), to_bencode(value)?);
    }
    Ok(Bencode::Dict(entries))
}
