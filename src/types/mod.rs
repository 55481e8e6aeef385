//! Type descriptors for entity properties.
//!
//! Every property is bound to a type descriptor that validates domain
//! values, serializes them into row cells, deserializes them back, and
//! renders server-side filter operands. Descriptors are immutable after
//! construction and safe to share across threads; each call owns its input
//! value and output row.

pub mod blob;
pub mod boolean;
pub mod date;
pub mod guid;
pub mod json;
pub mod number;
pub mod schema;
pub mod slug;
pub mod string;
pub mod text;

pub use blob::{BlobType, EncryptedBlobType};
pub use boolean::BooleanType;
pub use date::DateType;
pub use guid::UuidType;
pub use json::{EncryptedJsonType, JsonType};
pub use number::{NumberType, PositiveIntegerType};
pub use schema::{EncryptedSchemaType, SchemaType};
pub use slug::{SlugIdArrayType, SlugIdType};
pub use string::StringType;
pub use text::{EncryptedTextType, TextType};

use crate::envelope::crypto::EncryptionKey;
use crate::errors::{CodecError, Result};
use crate::filters::FilterOp;
use crate::row::Row;
use crate::slugid::{SlugId, SlugIdArray};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use uuid::Uuid;

/// A domain value accepted by the property type codecs.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Bool(bool),
    Number(f64),
    Date(DateTime<Utc>),
    Uuid(Uuid),
    SlugId(SlugId),
    Bytes(Vec<u8>),
    Json(serde_json::Value),
    SlugIdArray(SlugIdArray),
}

impl Value {
    /// The primitive category of this value, used in diagnostics.
    pub const fn kind(&self) -> ValueKind {
        match self {
            Value::Text(_) => ValueKind::Text,
            Value::Bool(_) => ValueKind::Bool,
            Value::Number(_) => ValueKind::Number,
            Value::Date(_) => ValueKind::Date,
            Value::Uuid(_) => ValueKind::Uuid,
            Value::SlugId(_) => ValueKind::SlugId,
            Value::Bytes(_) => ValueKind::Bytes,
            Value::Json(_) => ValueKind::Json,
            Value::SlugIdArray(_) => ValueKind::SlugIdArray,
        }
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Date(v)
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Uuid(v)
    }
}

impl From<SlugId> for Value {
    fn from(v: SlugId) -> Self {
        Value::SlugId(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::Json(v)
    }
}

impl From<SlugIdArray> for Value {
    fn from(v: SlugIdArray) -> Self {
        Value::SlugIdArray(v)
    }
}

/// Primitive category names for the uniform type-check diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    Bool,
    Number,
    Date,
    Uuid,
    SlugId,
    Bytes,
    Json,
    SlugIdArray,
}

impl ValueKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            ValueKind::Text => "string",
            ValueKind::Bool => "boolean",
            ValueKind::Number => "number",
            ValueKind::Date => "date",
            ValueKind::Uuid => "uuid",
            ValueKind::SlugId => "slugid",
            ValueKind::Bytes => "buffer",
            ValueKind::Json => "json",
            ValueKind::SlugIdArray => "slugid array",
        }
    }
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build the uniform mismatch diagnostic naming the type, the property,
/// and both category sets. Every validator routes its primitive checks
/// through this so diagnostics read alike across types.
pub(crate) fn type_mismatch(
    type_name: &'static str,
    property: &str,
    expected: &[ValueKind],
    actual: &Value,
) -> CodecError {
    let expected = expected
        .iter()
        .map(|kind| kind.as_str())
        .collect::<Vec<_>>()
        .join(" or ");
    CodecError::TypeMismatch {
        type_name,
        property: property.to_string(),
        expected,
        actual: actual.kind().as_str().to_string(),
    }
}

/// Reject filter operators the type's capability flags do not allow.
pub(crate) fn check_operator(descriptor: &dyn PropertyType, op: FilterOp) -> Result<()> {
    let allowed = if op.is_ordering() {
        descriptor.is_ordered()
    } else {
        descriptor.is_comparable()
    };
    if allowed {
        Ok(())
    } else {
        Err(CodecError::NotComparable {
            type_name: descriptor.type_name(),
            property: descriptor.property().to_string(),
            operation: if op.is_ordering() {
                "range filters"
            } else {
                "equality filters"
            },
        })
    }
}

/// The uniform operation surface every property codec honors.
///
/// Descriptors are bound to a single property name at construction. The
/// cipher key is borrowed per call and only consulted by encrypted types.
pub trait PropertyType: Send + Sync {
    /// The logical column this descriptor is bound to.
    fn property(&self) -> &str;

    /// Variant name used in diagnostics.
    fn type_name(&self) -> &'static str;

    /// Usable with `<`, `<=`, `>`, `>=` filters.
    fn is_ordered(&self) -> bool {
        false
    }

    /// Usable with `=` and `!=` filters.
    fn is_comparable(&self) -> bool {
        false
    }

    /// Requires a cipher key on serialize and deserialize.
    fn is_encrypted(&self) -> bool {
        false
    }

    /// Check that `value` is acceptable to this type.
    fn validate(&self, value: &Value) -> Result<()>;

    /// Validate `value` and write its cells (plus annotations) onto `row`.
    fn serialize(&self, row: &mut Row, value: &Value, key: Option<&EncryptionKey>) -> Result<()>;

    /// Read this property's cells from `row` and rebuild the domain value,
    /// revalidating on the way out.
    fn deserialize(&self, row: &Row, key: Option<&EncryptionKey>) -> Result<Value>;

    /// Domain equality for this type.
    fn equal(&self, left: &Value, right: &Value) -> Result<bool>;

    /// In-memory ordering for this type.
    ///
    /// Only meaningful for ordered scalar types; identifier types fail
    /// with `NotComparable` even though they accept range filters.
    fn compare(&self, _left: &Value, _right: &Value) -> Result<Ordering> {
        Err(CodecError::NotComparable {
            type_name: self.type_name(),
            property: self.property().to_string(),
            operation: "in-memory comparison",
        })
    }

    /// Deep copy of a domain value.
    fn clone_value(&self, value: &Value) -> Value {
        value.clone()
    }

    /// Canonical stringification suitable for key derivation.
    fn canonical_string(&self, _value: &Value) -> Result<String> {
        Err(CodecError::NotImplemented {
            type_name: self.type_name(),
            operation: "canonical stringification",
        })
    }

    /// Canonical hash input for this value.
    ///
    /// Encrypted types hash the plaintext form, so two serializations of
    /// the same value hash equal despite differing IVs.
    fn hash_bytes(&self, value: &Value) -> Result<Vec<u8>> {
        self.canonical_string(value).map(String::into_bytes)
    }

    /// Render `<property> <op-token> <rendered-operand>` for a scan.
    fn filter_condition(&self, _op: FilterOp, _operand: &Value) -> Result<String> {
        Err(CodecError::NotComparable {
            type_name: self.type_name(),
            property: self.property().to_string(),
            operation: "filter conditions",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_mismatch_names_type_and_property() {
        let err = type_mismatch("string", "name", &[ValueKind::Text], &Value::Bool(true));
        assert_eq!(err.to_string(), "string 'name': expected string, got boolean");
    }

    #[test]
    fn test_type_mismatch_joins_expected_set() {
        let err = type_mismatch(
            "json",
            "data",
            &[ValueKind::Json, ValueKind::Text],
            &Value::Number(3.0),
        );
        assert_eq!(err.to_string(), "json 'data': expected json or string, got number");
    }

    #[test]
    fn test_value_kind_reporting() {
        assert_eq!(Value::from(1.5).kind(), ValueKind::Number);
        assert_eq!(Value::from("x").kind(), ValueKind::Text);
        assert_eq!(Value::from(vec![1u8]).kind(), ValueKind::Bytes);
        assert_eq!(Value::from(serde_json::json!({})).kind(), ValueKind::Json);
    }
}
