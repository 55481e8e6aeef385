//! UUID property type.

use crate::envelope::crypto::EncryptionKey;
use crate::errors::{CodecError, Result};
use crate::filters::{self, FilterOp};
use crate::row::{Row, WireTag};
use crate::types::{check_operator, type_mismatch, PropertyType, Value, ValueKind};
use std::cmp::Ordering;
use uuid::Uuid;

const TYPE_NAME: &str = "uuid";

/// GUID stored as a canonical lowercase text cell tagged `Edm.Guid`.
///
/// Equality is case-insensitive (the parsed form is canonical). Range
/// filters are delegated to the store; in-memory ordering is refused.
#[derive(Debug, Clone)]
pub struct UuidType {
    property: String,
}

impl UuidType {
    pub fn new(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
        }
    }

    fn uuid(&self, value: &Value) -> Result<Uuid> {
        match value {
            Value::Uuid(u) => Ok(*u),
            other => Err(type_mismatch(TYPE_NAME, &self.property, &[ValueKind::Uuid], other)),
        }
    }
}

impl PropertyType for UuidType {
    fn property(&self) -> &str {
        &self.property
    }

    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn is_ordered(&self) -> bool {
        true
    }

    fn is_comparable(&self) -> bool {
        true
    }

    fn validate(&self, value: &Value) -> Result<()> {
        self.uuid(value).map(|_| ())
    }

    fn serialize(&self, row: &mut Row, value: &Value, _key: Option<&EncryptionKey>) -> Result<()> {
        let uuid = self.uuid(value)?;
        row.insert_annotated(&self.property, uuid.to_string(), WireTag::Guid);
        Ok(())
    }

    fn deserialize(&self, row: &Row, _key: Option<&EncryptionKey>) -> Result<Value> {
        let decode_failure = |message: String| CodecError::DecodeFailure {
            type_name: TYPE_NAME,
            property: self.property.clone(),
            message,
        };

        let text = row
            .get(&self.property)
            .ok_or_else(|| decode_failure("missing cell".to_string()))?
            .as_text()
            .ok_or_else(|| decode_failure("expected a string cell".to_string()))?;
        let uuid = Uuid::parse_str(text)
            .map_err(|e| decode_failure(format!("'{text}' is not a UUID: {e}")))?;
        Ok(Value::Uuid(uuid))
    }

    fn equal(&self, left: &Value, right: &Value) -> Result<bool> {
        Ok(self.uuid(left)? == self.uuid(right)?)
    }

    // In-memory ordering is deliberately unsupported even though the store
    // accepts range filters on GUID cells.
    fn compare(&self, _left: &Value, _right: &Value) -> Result<Ordering> {
        Err(CodecError::NotComparable {
            type_name: TYPE_NAME,
            property: self.property.clone(),
            operation: "in-memory comparison",
        })
    }

    fn canonical_string(&self, value: &Value) -> Result<String> {
        self.uuid(value).map(|uuid| uuid.to_string())
    }

    fn filter_condition(&self, op: FilterOp, operand: &Value) -> Result<String> {
        check_operator(self, op)?;
        let operand = self.uuid(operand)?;
        Ok(format!(
            "{} {} {}",
            self.property,
            op.token(),
            filters::guid_literal(&operand)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::CellValue;

    const SAMPLE: &str = "550e8400-e29b-41d4-a716-446655440000";

    #[test]
    fn test_round_trip_is_lowercase() {
        let descriptor = UuidType::new("id");
        let uuid = Uuid::parse_str(SAMPLE).unwrap();
        let mut row = Row::new();
        descriptor.serialize(&mut row, &Value::Uuid(uuid), None).unwrap();

        assert_eq!(row.get("id").and_then(CellValue::as_text), Some(SAMPLE));
        assert_eq!(row.annotation("id"), Some(WireTag::Guid));
        assert_eq!(descriptor.deserialize(&row, None).unwrap(), Value::Uuid(uuid));
    }

    #[test]
    fn test_deserialize_accepts_uppercase_cells() {
        let descriptor = UuidType::new("id");
        let mut row = Row::new();
        row.insert_annotated("id", SAMPLE.to_uppercase(), WireTag::Guid);

        let value = descriptor.deserialize(&row, None).unwrap();
        assert_eq!(value, Value::Uuid(Uuid::parse_str(SAMPLE).unwrap()));
        assert_eq!(descriptor.canonical_string(&value).unwrap(), SAMPLE);
    }

    #[test]
    fn test_filter_renders_guid_literal() {
        let descriptor = UuidType::new("id");
        let uuid = Uuid::parse_str(SAMPLE).unwrap();
        assert_eq!(
            descriptor
                .filter_condition(FilterOp::Ge, &Value::Uuid(uuid))
                .unwrap(),
            format!("id ge guid'{SAMPLE}'")
        );
    }

    #[test]
    fn test_compare_is_refused() {
        let descriptor = UuidType::new("id");
        let uuid = Uuid::parse_str(SAMPLE).unwrap();
        let err = descriptor
            .compare(&Value::Uuid(uuid), &Value::Uuid(uuid))
            .unwrap_err();
        assert!(matches!(err, CodecError::NotComparable { .. }));
    }
}
