//! Schema-validated JSON property types.
//!
//! A schema type is a JSON codec with a JSON-Schema validator compiled
//! once at construction. Validation fills in declared `default`s for
//! missing object members before checking, so optional fields
//! materialize on both write and read.

use crate::envelope::crypto::{open, require_key, seal, EncryptionKey};
use crate::envelope::{read_chunks, write_chunks};
use crate::errors::{CodecError, Result};
use crate::row::Row;
use crate::types::json::stable_stringify;
use crate::types::{type_mismatch, PropertyType, Value, ValueKind};
use jsonschema::JSONSchema;
use std::fmt;

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

/// Fill in `default`s declared for missing object members, recursively.
fn apply_defaults(schema: &serde_json::Value, instance: &mut serde_json::Value) {
    let properties = match schema.get("properties").and_then(serde_json::Value::as_object) {
        Some(p) => p,
        None => return,
    };
    let object = match instance.as_object_mut() {
        Some(o) => o,
        None => return,
    };
    for (name, member_schema) in properties {
        match object.get_mut(name) {
            Some(member) => apply_defaults(member_schema, member),
            None => {
                if let Some(default) = member_schema.get("default") {
                    let mut filled = default.clone();
                    apply_defaults(member_schema, &mut filled);
                    object.insert(name.clone(), filled);
                }
            }
        }
    }
}

/// A schema compiled once and shared by the plain and encrypted variants.
struct CompiledSchema {
    schema: serde_json::Value,
    compiled: JSONSchema,
}

impl CompiledSchema {
    fn new(property: &str, schema: serde_json::Value) -> Result<Self> {
        let compiled = JSONSchema::compile(&schema).map_err(|e| CodecError::SchemaInvalid {
            property: property.to_string(),
            errors: vec![format!("schema does not compile: {e}")],
            value: schema.clone(),
        })?;
        Ok(Self { schema, compiled })
    }

    /// Apply defaults, then validate; returns the defaults-applied
    /// document.
    fn check(&self, property: &str, doc: &serde_json::Value) -> Result<serde_json::Value> {
        let mut instance = doc.clone();
        apply_defaults(&self.schema, &mut instance);

        let errors: Option<Vec<String>> = match self.compiled.validate(&instance) {
            Ok(()) => None,
            Err(errors) => Some(errors.map(|e| e.to_string()).collect()),
        };
        if let Some(errors) = errors {
            return Err(CodecError::SchemaInvalid {
                property: property.to_string(),
                errors,
                value: instance,
            });
        }
        Ok(instance)
    }
}

impl fmt::Debug for CompiledSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledSchema")
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

/// JSON document validated against a schema, stored through the binary
/// envelope.
#[derive(Debug)]
pub struct SchemaType {
    property: String,
    schema: CompiledSchema,
}

impl SchemaType {
    /// Compile `schema` eagerly; a malformed schema fails fast.
    pub fn new(property: impl Into<String>, schema: serde_json::Value) -> Result<Self> {
        let property = property.into();
        let schema = CompiledSchema::new(&property, schema)?;
        Ok(Self { property, schema })
    }

    /// The schema this descriptor validates against.
    pub fn schema(&self) -> &serde_json::Value {
        &self.schema.schema
    }
}

impl PropertyType for SchemaType {
    fn property(&self) -> &str {
        &self.property
    }

    fn type_name(&self) -> &'static str {
        "schema"
    }

    fn validate(&self, value: &Value) -> Result<()> {
        let doc = document(self.type_name(), &self.property, value)?;
        self.schema.check(&self.property, doc).map(|_| ())
    }

    fn serialize(&self, row: &mut Row, value: &Value, _key: Option<&EncryptionKey>) -> Result<()> {
        let doc = document(self.type_name(), &self.property, value)?;
        let applied = self.schema.check(&self.property, doc)?;
        let payload = serde_json::to_vec(&applied).map_err(|e| CodecError::FormatInvalid {
            type_name: self.type_name(),
            property: self.property.clone(),
            message: format!("JSON encode failed: {e}"),
        })?;
        write_chunks(self.type_name(), row, &self.property, &payload)
    }

    fn deserialize(&self, row: &Row, _key: Option<&EncryptionKey>) -> Result<Value> {
        let payload = read_chunks(self.type_name(), row, &self.property)?;
        let doc: serde_json::Value =
            serde_json::from_slice(&payload).map_err(|e| CodecError::DecodeFailure {
                type_name: self.type_name(),
                property: self.property.clone(),
                message: format!("JSON decode failed: {e}"),
            })?;
        let applied = self.schema.check(&self.property, &doc)?;
        Ok(Value::Json(applied))
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

/// Encrypted twin of [`SchemaType`].
#[derive(Debug)]
pub struct EncryptedSchemaType {
    property: String,
    schema: CompiledSchema,
}

impl EncryptedSchemaType {
    /// Compile `schema` eagerly; a malformed schema fails fast.
    pub fn new(property: impl Into<String>, schema: serde_json::Value) -> Result<Self> {
        let property = property.into();
        let schema = CompiledSchema::new(&property, schema)?;
        Ok(Self { property, schema })
    }

    /// The schema this descriptor validates against.
    pub fn schema(&self) -> &serde_json::Value {
        &self.schema.schema
    }
}

impl PropertyType for EncryptedSchemaType {
    fn property(&self) -> &str {
        &self.property
    }

    fn type_name(&self) -> &'static str {
        "encrypted schema"
    }

    fn is_encrypted(&self) -> bool {
        true
    }

    fn validate(&self, value: &Value) -> Result<()> {
        let doc = document(self.type_name(), &self.property, value)?;
        self.schema.check(&self.property, doc).map(|_| ())
    }

    fn serialize(&self, row: &mut Row, value: &Value, key: Option<&EncryptionKey>) -> Result<()> {
        let key = require_key(self.type_name(), &self.property, key)?;
        let doc = document(self.type_name(), &self.property, value)?;
        let applied = self.schema.check(&self.property, doc)?;
        let plain = serde_json::to_vec(&applied).map_err(|e| CodecError::FormatInvalid {
            type_name: self.type_name(),
            property: self.property.clone(),
            message: format!("JSON encode failed: {e}"),
        })?;
        let sealed = seal(self.type_name(), &self.property, key, &plain)?;
        write_chunks(self.type_name(), row, &self.property, &sealed)
    }

    fn deserialize(&self, row: &Row, key: Option<&EncryptionKey>) -> Result<Value> {
        let key = require_key(self.type_name(), &self.property, key)?;
        let sealed = read_chunks(self.type_name(), row, &self.property)?;
        let plain = open(self.type_name(), &self.property, key, &sealed)?;
        let doc: serde_json::Value =
            serde_json::from_slice(&plain).map_err(|e| CodecError::DecodeFailure {
                type_name: self.type_name(),
                property: self.property.clone(),
                message: format!("JSON decode failed: {e}"),
            })?;
        let applied = self.schema.check(&self.property, &doc)?;
        Ok(Value::Json(applied))
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
