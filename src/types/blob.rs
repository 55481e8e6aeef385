//! Raw byte property types.

use crate::envelope::crypto::{open, require_key, seal, EncryptionKey};
use crate::envelope::{read_chunks, write_chunks};
use crate::errors::Result;
use crate::row::Row;
use crate::types::{type_mismatch, PropertyType, Value, ValueKind};

fn bytes<'a>(type_name: &'static str, property: &str, value: &'a Value) -> Result<&'a [u8]> {
    match value {
        Value::Bytes(b) => Ok(b),
        other => Err(type_mismatch(type_name, property, &[ValueKind::Bytes], other)),
    }
}

/// Identity codec: the value is the raw bytes.
#[derive(Debug, Clone)]
pub struct BlobType {
    property: String,
}

impl BlobType {
    pub fn new(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
        }
    }
}

impl PropertyType for BlobType {
    fn property(&self) -> &str {
        &self.property
    }

    fn type_name(&self) -> &'static str {
        "blob"
    }

    fn validate(&self, value: &Value) -> Result<()> {
        bytes(self.type_name(), &self.property, value).map(|_| ())
    }

    fn serialize(&self, row: &mut Row, value: &Value, _key: Option<&EncryptionKey>) -> Result<()> {
        let payload = bytes(self.type_name(), &self.property, value)?;
        write_chunks(self.type_name(), row, &self.property, payload)
    }

    fn deserialize(&self, row: &Row, _key: Option<&EncryptionKey>) -> Result<Value> {
        let payload = read_chunks(self.type_name(), row, &self.property)?;
        Ok(Value::Bytes(payload))
    }

    fn equal(&self, left: &Value, right: &Value) -> Result<bool> {
        let left = bytes(self.type_name(), &self.property, left)?;
        let right = bytes(self.type_name(), &self.property, right)?;
        Ok(left == right)
    }

    fn hash_bytes(&self, value: &Value) -> Result<Vec<u8>> {
        bytes(self.type_name(), &self.property, value).map(<[u8]>::to_vec)
    }
}

/// Encrypted twin of [`BlobType`].
#[derive(Debug, Clone)]
pub struct EncryptedBlobType {
    property: String,
}

impl EncryptedBlobType {
    pub fn new(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
        }
    }
}

impl PropertyType for EncryptedBlobType {
    fn property(&self) -> &str {
        &self.property
    }

    fn type_name(&self) -> &'static str {
        "encrypted blob"
    }

    fn is_encrypted(&self) -> bool {
        true
    }

    fn validate(&self, value: &Value) -> Result<()> {
        bytes(self.type_name(), &self.property, value).map(|_| ())
    }

    fn serialize(&self, row: &mut Row, value: &Value, key: Option<&EncryptionKey>) -> Result<()> {
        let key = require_key(self.type_name(), &self.property, key)?;
        let plain = bytes(self.type_name(), &self.property, value)?;
        let sealed = seal(self.type_name(), &self.property, key, plain)?;
        write_chunks(self.type_name(), row, &self.property, &sealed)
    }

    fn deserialize(&self, row: &Row, key: Option<&EncryptionKey>) -> Result<Value> {
        let key = require_key(self.type_name(), &self.property, key)?;
        let sealed = read_chunks(self.type_name(), row, &self.property)?;
        let plain = open(self.type_name(), &self.property, key, &sealed)?;
        Ok(Value::Bytes(plain))
    }

    fn equal(&self, left: &Value, right: &Value) -> Result<bool> {
        let left = bytes(self.type_name(), &self.property, left)?;
        let right = bytes(self.type_name(), &self.property, right)?;
        Ok(left == right)
    }

    /// Hash over the plaintext so repeated serializations agree.
    fn hash_bytes(&self, value: &Value) -> Result<Vec<u8>> {
        bytes(self.type_name(), &self.property, value).map(<[u8]>::to_vec)
    }
}
