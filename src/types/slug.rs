//! Slug identifier property types.
//!
//! A single slug rides as a GUID cell (the decoded 16 bytes in canonical
//! UUID form, tagged `Edm.Guid`). A slug array rides through the binary
//! envelope as its packed live region.

use crate::envelope::crypto::EncryptionKey;
use crate::envelope::{read_chunks, write_chunks};
use crate::errors::{CodecError, Result};
use crate::filters::{self, FilterOp};
use crate::row::{Row, WireTag};
use crate::slugid::{SlugId, SlugIdArray};
use crate::types::{check_operator, type_mismatch, PropertyType, Value, ValueKind};
use std::cmp::Ordering;
use uuid::Uuid;

/// Slug stored as a GUID cell. Equality is slug-exact; the canonical
/// string is the slug form.
#[derive(Debug, Clone)]
pub struct SlugIdType {
    property: String,
}

impl SlugIdType {
    pub fn new(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
        }
    }

    fn slug(&self, value: &Value) -> Result<SlugId> {
        match value {
            Value::SlugId(s) => Ok(*s),
            other => Err(type_mismatch("slugid", &self.property, &[ValueKind::SlugId], other)),
        }
    }
}

impl PropertyType for SlugIdType {
    fn property(&self) -> &str {
        &self.property
    }

    fn type_name(&self) -> &'static str {
        "slugid"
    }

    fn is_ordered(&self) -> bool {
        true
    }

    fn is_comparable(&self) -> bool {
        true
    }

    fn validate(&self, value: &Value) -> Result<()> {
        self.slug(value).map(|_| ())
    }

    fn serialize(&self, row: &mut Row, value: &Value, _key: Option<&EncryptionKey>) -> Result<()> {
        let slug = self.slug(value)?;
        row.insert_annotated(&self.property, slug.to_uuid().to_string(), WireTag::Guid);
        Ok(())
    }

    fn deserialize(&self, row: &Row, _key: Option<&EncryptionKey>) -> Result<Value> {
        let decode_failure = |message: String| CodecError::DecodeFailure {
            type_name: "slugid",
            property: self.property.clone(),
            message,
        };

        let text = row
            .get(&self.property)
            .ok_or_else(|| decode_failure("missing cell".to_string()))?
            .as_text()
            .ok_or_else(|| decode_failure("expected a string cell".to_string()))?;
        let uuid = Uuid::parse_str(text)
            .map_err(|e| decode_failure(format!("'{text}' is not a GUID: {e}")))?;
        Ok(Value::SlugId(SlugId::from_uuid(uuid)))
    }

    fn equal(&self, left: &Value, right: &Value) -> Result<bool> {
        Ok(self.slug(left)? == self.slug(right)?)
    }

    // Same stance as UuidType: server-side range filters are fine,
    // in-memory ordering is refused.
    fn compare(&self, _left: &Value, _right: &Value) -> Result<Ordering> {
        Err(CodecError::NotComparable {
            type_name: "slugid",
            property: self.property.clone(),
            operation: "in-memory comparison",
        })
    }

    fn canonical_string(&self, value: &Value) -> Result<String> {
        self.slug(value).map(|slug| slug.to_string())
    }

    fn filter_condition(&self, op: FilterOp, operand: &Value) -> Result<String> {
        check_operator(self, op)?;
        let operand = self.slug(operand)?;
        Ok(format!(
            "{} {} {}",
            self.property,
            op.token(),
            filters::guid_literal(&operand.to_uuid())
        ))
    }
}

/// Packed slug array stored through the binary envelope.
#[derive(Debug, Clone)]
pub struct SlugIdArrayType {
    property: String,
}

impl SlugIdArrayType {
    pub fn new(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
        }
    }

    fn array<'a>(&self, value: &'a Value) -> Result<&'a SlugIdArray> {
        match value {
            Value::SlugIdArray(a) => Ok(a),
            other => Err(type_mismatch(
                "slugid array",
                &self.property,
                &[ValueKind::SlugIdArray],
                other,
            )),
        }
    }
}

impl PropertyType for SlugIdArrayType {
    fn property(&self) -> &str {
        &self.property
    }

    fn type_name(&self) -> &'static str {
        "slugid array"
    }

    fn validate(&self, value: &Value) -> Result<()> {
        self.array(value).map(|_| ())
    }

    fn serialize(&self, row: &mut Row, value: &Value, _key: Option<&EncryptionKey>) -> Result<()> {
        let array = self.array(value)?;
        write_chunks(self.type_name(), row, &self.property, array.as_bytes())
    }

    fn deserialize(&self, row: &Row, _key: Option<&EncryptionKey>) -> Result<Value> {
        let payload = read_chunks(self.type_name(), row, &self.property)?;
        let array = SlugIdArray::from_buffer(payload).map_err(|e| CodecError::DecodeFailure {
            type_name: "slugid array",
            property: self.property.clone(),
            message: e.to_string(),
        })?;
        Ok(Value::SlugIdArray(array))
    }

    fn equal(&self, left: &Value, right: &Value) -> Result<bool> {
        Ok(self.array(left)? == self.array(right)?)
    }

    fn hash_bytes(&self, value: &Value) -> Result<Vec<u8>> {
        Ok(self.array(value)?.as_bytes().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::CellValue;

    fn fresh_slug() -> SlugId {
        SlugId::from_uuid(Uuid::new_v4())
    }

    #[test]
    fn test_slugid_rides_as_guid_cell() {
        let descriptor = SlugIdType::new("taskId");
        let slug = fresh_slug();
        let mut row = Row::new();
        descriptor.serialize(&mut row, &Value::SlugId(slug), None).unwrap();

        assert_eq!(
            row.get("taskId").and_then(CellValue::as_text),
            Some(slug.to_uuid().to_string().as_str())
        );
        assert_eq!(row.annotation("taskId"), Some(WireTag::Guid));
        assert_eq!(descriptor.deserialize(&row, None).unwrap(), Value::SlugId(slug));
    }

    #[test]
    fn test_slugid_canonical_string_is_slug_form() {
        let descriptor = SlugIdType::new("taskId");
        let slug = fresh_slug();
        assert_eq!(
            descriptor.canonical_string(&Value::SlugId(slug)).unwrap(),
            slug.to_string()
        );
    }

    #[test]
    fn test_slugid_filter_renders_guid_form() {
        let descriptor = SlugIdType::new("taskId");
        let slug = fresh_slug();
        assert_eq!(
            descriptor
                .filter_condition(FilterOp::Eq, &Value::SlugId(slug))
                .unwrap(),
            format!("taskId eq guid'{}'", slug.to_uuid())
        );
    }

    #[test]
    fn test_slugid_compare_is_refused() {
        let descriptor = SlugIdType::new("taskId");
        let slug = fresh_slug();
        let err = descriptor
            .compare(&Value::SlugId(slug), &Value::SlugId(slug))
            .unwrap_err();
        assert!(matches!(err, CodecError::NotComparable { .. }));
    }

    #[test]
    fn test_array_round_trip() {
        let descriptor = SlugIdArrayType::new("tasks");
        let mut array = SlugIdArray::new();
        for _ in 0..5 {
            array.push(fresh_slug());
        }

        let mut row = Row::new();
        descriptor
            .serialize(&mut row, &Value::SlugIdArray(array.clone()), None)
            .unwrap();
        assert_eq!(
            row.get("__bufchunks_tasks").and_then(CellValue::as_number),
            Some(1.0)
        );

        let value = descriptor.deserialize(&row, None).unwrap();
        assert!(descriptor.equal(&value, &Value::SlugIdArray(array)).unwrap());
    }

    #[test]
    fn test_array_hash_is_packed_bytes() {
        let descriptor = SlugIdArrayType::new("tasks");
        let mut array = SlugIdArray::new();
        let slug = fresh_slug();
        array.push(slug);

        assert_eq!(
            descriptor
                .hash_bytes(&Value::SlugIdArray(array.clone()))
                .unwrap(),
            slug.as_bytes().to_vec()
        );
    }

    #[test]
    fn test_array_is_not_filterable() {
        let descriptor = SlugIdArrayType::new("tasks");
        let err = descriptor
            .filter_condition(FilterOp::Eq, &Value::SlugIdArray(SlugIdArray::new()))
            .unwrap_err();
        assert!(matches!(err, CodecError::NotComparable { .. }));

        let err = descriptor
            .canonical_string(&Value::SlugIdArray(SlugIdArray::new()))
            .unwrap_err();
        assert!(matches!(err, CodecError::NotImplemented { .. }));
    }

    #[test]
    fn test_array_corrupt_payload_is_decode_failure() {
        let descriptor = SlugIdArrayType::new("tasks");
        let mut row = Row::new();
        // 17 bytes is not a whole number of slots.
        write_chunks("slugid array", &mut row, "tasks", &[0u8; 17]).unwrap();

        let err = descriptor.deserialize(&row, None).unwrap_err();
        assert!(matches!(err, CodecError::DecodeFailure { .. }));
    }
}
