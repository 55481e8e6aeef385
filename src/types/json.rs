//! JSON property types.
//!
//! Values are arbitrary JSON documents (scalars included), stored through
//! the binary envelope as compact UTF-8 JSON. The canonical hash input is
//! a stable stringification with recursively sorted object keys, so two
//! structurally equal documents hash alike regardless of insertion order.

use crate::envelope::crypto::{open, require_key, seal, EncryptionKey};
use crate::envelope::{read_chunks, write_chunks};
use crate::errors::{CodecError, Result};
use crate::row::Row;
use crate::types::{type_mismatch, PropertyType, Value, ValueKind};

fn document<'a>(
    type_name: &'static str,
    property: &str,
    value: &'a Value,
) -> Result<&'a serde_json::Value> {
    match value {
        Value::Json(doc) => Ok(doc),
        other => Err(type_mismatch(type_name, property, &[ValueKind::Json], other)),
    }
}

fn document_to_payload(
    type_name: &'static str,
    property: &str,
    doc: &serde_json::Value,
) -> Result<Vec<u8>> {
    serde_json::to_vec(doc).map_err(|e| CodecError::FormatInvalid {
        type_name,
        property: property.to_string(),
        message: format!("JSON encode failed: {e}"),
    })
}

fn document_from_payload(
    type_name: &'static str,
    property: &str,
    payload: &[u8],
) -> Result<Value> {
    let doc = serde_json::from_slice(payload).map_err(|e| CodecError::DecodeFailure {
        type_name,
        property: property.to_string(),
        message: format!("JSON decode failed: {e}"),
    })?;
    Ok(Value::Json(doc))
}

/// Stable stringification: compact JSON with object keys sorted
/// recursively.
pub(crate) fn stable_stringify(value: &serde_json::Value) -> String {
    let mut out = String::new();
    write_stable(value, &mut out);
    out
}

fn write_stable(value: &serde_json::Value, out: &mut String) {
    match value {
        serde_json::Value::Array(items) => {
            out.push('[');
            for (index, item) in items.iter().enumerate() {
                if index > 0 {
                    out.push(',');
                }
                write_stable(item, out);
            }
            out.push(']');
        }
        serde_json::Value::Object(map) => {
            let mut entries: Vec<(&String, &serde_json::Value)> = map.iter().collect();
            entries.sort_by(|(left, _), (right, _)| left.cmp(right));
            out.push('{');
            for (index, (key, item)) in entries.into_iter().enumerate() {
                if index > 0 {
                    out.push(',');
                }
                out.push_str(&serde_json::Value::String(key.clone()).to_string());
                out.push(':');
                write_stable(item, out);
            }
            out.push('}');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

/// JSON document stored through the binary envelope.
#[derive(Debug, Clone)]
pub struct JsonType {
    property: String,
}

impl JsonType {
    pub fn new(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
        }
    }
}

impl PropertyType for JsonType {
    fn property(&self) -> &str {
        &self.property
    }

    fn type_name(&self) -> &'static str {
        "json"
    }

    fn validate(&self, value: &Value) -> Result<()> {
        document(self.type_name(), &self.property, value).map(|_| ())
    }

    fn serialize(&self, row: &mut Row, value: &Value, _key: Option<&EncryptionKey>) -> Result<()> {
        let doc = document(self.type_name(), &self.property, value)?;
        let payload = document_to_payload(self.type_name(), &self.property, doc)?;
        write_chunks(self.type_name(), row, &self.property, &payload)
    }

    fn deserialize(&self, row: &Row, _key: Option<&EncryptionKey>) -> Result<Value> {
        let payload = read_chunks(self.type_name(), row, &self.property)?;
        document_from_payload(self.type_name(), &self.property, &payload)
    }

    fn equal(&self, left: &Value, right: &Value) -> Result<bool> {
        let left = document(self.type_name(), &self.property, left)?;
        let right = document(self.type_name(), &self.property, right)?;
        Ok(left == right)
    }

    fn hash_bytes(&self, value: &Value) -> Result<Vec<u8>> {
        let doc = document(self.type_name(), &self.property, value)?;
        Ok(stable_stringify(doc).into_bytes())
    }
}

/// Encrypted twin of [`JsonType`].
#[derive(Debug, Clone)]
pub struct EncryptedJsonType {
    property: String,
}

impl EncryptedJsonType {
    pub fn new(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
        }
    }
}

impl PropertyType for EncryptedJsonType {
    fn property(&self) -> &str {
        &self.property
    }

    fn type_name(&self) -> &'static str {
        "encrypted json"
    }

    fn is_encrypted(&self) -> bool {
        true
    }

    fn validate(&self, value: &Value) -> Result<()> {
        document(self.type_name(), &self.property, value).map(|_| ())
    }

    fn serialize(&self, row: &mut Row, value: &Value, key: Option<&EncryptionKey>) -> Result<()> {
        let key = require_key(self.type_name(), &self.property, key)?;
        let doc = document(self.type_name(), &self.property, value)?;
        let plain = document_to_payload(self.type_name(), &self.property, doc)?;
        let sealed = seal(self.type_name(), &self.property, key, &plain)?;
        write_chunks(self.type_name(), row, &self.property, &sealed)
    }

    fn deserialize(&self, row: &Row, key: Option<&EncryptionKey>) -> Result<Value> {
        let key = require_key(self.type_name(), &self.property, key)?;
        let sealed = read_chunks(self.type_name(), row, &self.property)?;
        let plain = open(self.type_name(), &self.property, key, &sealed)?;
        document_from_payload(self.type_name(), &self.property, &plain)
    }

    fn equal(&self, left: &Value, right: &Value) -> Result<bool> {
        let left = document(self.type_name(), &self.property, left)?;
        let right = document(self.type_name(), &self.property, right)?;
        Ok(left == right)
    }

    /// Hash over the plaintext so repeated serializations agree.
    fn hash_bytes(&self, value: &Value) -> Result<Vec<u8>> {
        let doc = document(self.type_name(), &self.property, value)?;
        Ok(stable_stringify(doc).into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::KEY_SIZE;
    use serde_json::json;

    #[test]
    fn test_round_trip_object() {
        let descriptor = JsonType::new("d");
        let doc = json!({"route": ["a", "b"], "enabled": true, "retries": 3});
        let mut row = Row::new();
        descriptor
            .serialize(&mut row, &Value::Json(doc.clone()), None)
            .unwrap();

        assert_eq!(descriptor.deserialize(&row, None).unwrap(), Value::Json(doc));
    }

    #[test]
    fn test_scalars_are_valid_documents() {
        let descriptor = JsonType::new("d");
        for doc in [json!("text"), json!(42), json!(true), json!(null), json!([1, 2])] {
            let mut row = Row::new();
            descriptor
                .serialize(&mut row, &Value::Json(doc.clone()), None)
                .unwrap();
            assert_eq!(descriptor.deserialize(&row, None).unwrap(), Value::Json(doc));
        }
    }

    #[test]
    fn test_stable_stringify_sorts_keys_recursively() {
        let doc = json!({"b": {"z": 1, "a": 2}, "a": [{"y": 1, "x": 2}]});
        assert_eq!(
            stable_stringify(&doc),
            r#"{"a":[{"x":2,"y":1}],"b":{"a":2,"z":1}}"#
        );
    }

    #[test]
    fn test_hash_is_insertion_order_independent() {
        let descriptor = JsonType::new("d");
        let first = Value::Json(json!({"a": 1, "b": 2}));
        let second = Value::Json(json!({"b": 2, "a": 1}));

        assert!(descriptor.equal(&first, &second).unwrap());
        assert_eq!(
            descriptor.hash_bytes(&first).unwrap(),
            descriptor.hash_bytes(&second).unwrap()
        );
    }

    #[test]
    fn test_corrupt_payload_is_decode_failure() {
        let descriptor = JsonType::new("d");
        let mut row = Row::new();
        write_chunks("json", &mut row, "d", b"{not json").unwrap();

        let err = descriptor.deserialize(&row, None).unwrap_err();
        assert!(matches!(err, CodecError::DecodeFailure { .. }));
    }

    #[test]
    fn test_encrypted_round_trip_and_stable_hash() {
        let descriptor = EncryptedJsonType::new("d");
        let key = EncryptionKey::from_bytes([3u8; KEY_SIZE]);
        let doc = Value::Json(json!({"user": "alice", "token": "s3cr3t"}));

        let mut first = Row::new();
        let mut second = Row::new();
        descriptor.serialize(&mut first, &doc, Some(&key)).unwrap();
        descriptor.serialize(&mut second, &doc, Some(&key)).unwrap();

        // Fresh IV per serialize: ciphertext differs, hash does not.
        assert_ne!(first, second);
        assert_eq!(
            descriptor.hash_bytes(&doc).unwrap(),
            descriptor
                .hash_bytes(&descriptor.deserialize(&second, Some(&key)).unwrap())
                .unwrap()
        );
        assert_eq!(descriptor.deserialize(&first, Some(&key)).unwrap(), doc);
    }
}
