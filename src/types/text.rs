//! Long-form text property types.
//!
//! Unlike [`StringType`](crate::types::StringType), text rides through the
//! binary envelope as UTF-8 bytes, so it is not bounded by single-cell
//! string limits and is neither ordered nor comparable in filters.

use crate::envelope::crypto::{open, require_key, seal, EncryptionKey};
use crate::envelope::{read_chunks, write_chunks};
use crate::errors::{CodecError, Result};
use crate::row::Row;
use crate::types::{type_mismatch, PropertyType, Value, ValueKind};

fn text<'a>(type_name: &'static str, property: &str, value: &'a Value) -> Result<&'a str> {
    match value {
        Value::Text(s) => Ok(s),
        other => Err(type_mismatch(type_name, property, &[ValueKind::Text], other)),
    }
}

fn text_from_payload(type_name: &'static str, property: &str, payload: Vec<u8>) -> Result<Value> {
    let s = String::from_utf8(payload).map_err(|e| CodecError::DecodeFailure {
        type_name,
        property: property.to_string(),
        message: format!("payload is not valid UTF-8: {e}"),
    })?;
    Ok(Value::Text(s))
}

/// UTF-8 text stored through the binary envelope.
#[derive(Debug, Clone)]
pub struct TextType {
    property: String,
}

impl TextType {
    pub fn new(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
        }
    }
}

impl PropertyType for TextType {
    fn property(&self) -> &str {
        &self.property
    }

    fn type_name(&self) -> &'static str {
        "text"
    }

    fn validate(&self, value: &Value) -> Result<()> {
        text(self.type_name(), &self.property, value).map(|_| ())
    }

    fn serialize(&self, row: &mut Row, value: &Value, _key: Option<&EncryptionKey>) -> Result<()> {
        let payload = text(self.type_name(), &self.property, value)?;
        write_chunks(self.type_name(), row, &self.property, payload.as_bytes())
    }

    fn deserialize(&self, row: &Row, _key: Option<&EncryptionKey>) -> Result<Value> {
        let payload = read_chunks(self.type_name(), row, &self.property)?;
        text_from_payload(self.type_name(), &self.property, payload)
    }

    fn equal(&self, left: &Value, right: &Value) -> Result<bool> {
        let left = text(self.type_name(), &self.property, left)?;
        let right = text(self.type_name(), &self.property, right)?;
        Ok(left == right)
    }

    fn hash_bytes(&self, value: &Value) -> Result<Vec<u8>> {
        text(self.type_name(), &self.property, value).map(|s| s.as_bytes().to_vec())
    }
}

/// Encrypted twin of [`TextType`].
#[derive(Debug, Clone)]
pub struct EncryptedTextType {
    property: String,
}

impl EncryptedTextType {
    pub fn new(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
        }
    }
}

impl PropertyType for EncryptedTextType {
    fn property(&self) -> &str {
        &self.property
    }

    fn type_name(&self) -> &'static str {
        "encrypted text"
    }

    fn is_encrypted(&self) -> bool {
        true
    }

    fn validate(&self, value: &Value) -> Result<()> {
        text(self.type_name(), &self.property, value).map(|_| ())
    }

    fn serialize(&self, row: &mut Row, value: &Value, key: Option<&EncryptionKey>) -> Result<()> {
        let key = require_key(self.type_name(), &self.property, key)?;
        let plain = text(self.type_name(), &self.property, value)?;
        let sealed = seal(self.type_name(), &self.property, key, plain.as_bytes())?;
        write_chunks(self.type_name(), row, &self.property, &sealed)
    }

    fn deserialize(&self, row: &Row, key: Option<&EncryptionKey>) -> Result<Value> {
        let key = require_key(self.type_name(), &self.property, key)?;
        let sealed = read_chunks(self.type_name(), row, &self.property)?;
        let plain = open(self.type_name(), &self.property, key, &sealed)?;
        text_from_payload(self.type_name(), &self.property, plain)
    }

    fn equal(&self, left: &Value, right: &Value) -> Result<bool> {
        let left = text(self.type_name(), &self.property, left)?;
        let right = text(self.type_name(), &self.property, right)?;
        Ok(left == right)
    }

    /// Hash over the plaintext so repeated serializations agree.
    fn hash_bytes(&self, value: &Value) -> Result<Vec<u8>> {
        text(self.type_name(), &self.property, value).map(|s| s.as_bytes().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{IV_SIZE, KEY_SIZE};
    use crate::row::CellValue;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;

    fn test_key() -> EncryptionKey {
        EncryptionKey::from_bytes([0u8; KEY_SIZE])
    }

    #[test]
    fn test_round_trip() {
        let descriptor = TextType::new("body");
        let mut row = Row::new();
        descriptor
            .serialize(&mut row, &Value::from("grüße aus köln"), None)
            .unwrap();

        assert_eq!(
            descriptor.deserialize(&row, None).unwrap(),
            Value::from("grüße aus köln")
        );
    }

    #[test]
    fn test_is_not_filterable() {
        let descriptor = TextType::new("body");
        let err = descriptor
            .filter_condition(crate::filters::FilterOp::Eq, &Value::from("x"))
            .unwrap_err();
        assert!(matches!(err, CodecError::NotComparable { .. }));
    }

    #[test]
    fn test_invalid_utf8_is_decode_failure() {
        let descriptor = TextType::new("body");
        let mut row = Row::new();
        write_chunks("text", &mut row, "body", &[0xFF, 0xFE]).unwrap();

        let err = descriptor.deserialize(&row, None).unwrap_err();
        assert!(matches!(err, CodecError::DecodeFailure { .. }));
    }

    #[test]
    fn test_encrypted_round_trip_and_envelope_shape() {
        let descriptor = EncryptedTextType::new("s");
        let key = test_key();
        let mut row = Row::new();
        descriptor
            .serialize(&mut row, &Value::from("secret"), Some(&key))
            .unwrap();

        // One chunk: 16-byte IV plus one padded cipher block.
        assert_eq!(
            row.get("__bufchunks_s").and_then(CellValue::as_number),
            Some(1.0)
        );
        let sealed = STANDARD
            .decode(row.get("__buf0_s").and_then(CellValue::as_text).unwrap())
            .unwrap();
        assert_eq!(sealed.len(), IV_SIZE + 16);

        assert_eq!(
            descriptor.deserialize(&row, Some(&key)).unwrap(),
            Value::from("secret")
        );
    }

    #[test]
    fn test_encrypted_wrong_key_does_not_recover() {
        let descriptor = EncryptedTextType::new("s");
        let mut row = Row::new();
        descriptor
            .serialize(&mut row, &Value::from("secret"), Some(&test_key()))
            .unwrap();

        let other = EncryptionKey::from_bytes([1u8; KEY_SIZE]);
        match descriptor.deserialize(&row, Some(&other)) {
            Err(err) => assert!(matches!(err, CodecError::DecodeFailure { .. })),
            // Padding (and UTF-8) can survive by chance; the text cannot.
            Ok(recovered) => assert_ne!(recovered, Value::from("secret")),
        }
    }
}
