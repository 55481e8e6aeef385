//! String property type.

use crate::envelope::crypto::EncryptionKey;
use crate::errors::{CodecError, Result};
use crate::filters::{self, FilterOp};
use crate::row::Row;
use crate::types::{check_operator, type_mismatch, PropertyType, Value, ValueKind};
use std::cmp::Ordering;

const TYPE_NAME: &str = "string";

/// Plain string stored as a single text cell, no annotation.
#[derive(Debug, Clone)]
pub struct StringType {
    property: String,
}

impl StringType {
    pub fn new(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
        }
    }

    fn text<'a>(&self, value: &'a Value) -> Result<&'a str> {
        match value {
            Value::Text(s) => Ok(s),
            other => Err(type_mismatch(TYPE_NAME, &self.property, &[ValueKind::Text], other)),
        }
    }
}

impl PropertyType for StringType {
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
        self.text(value).map(|_| ())
    }

    fn serialize(&self, row: &mut Row, value: &Value, _key: Option<&EncryptionKey>) -> Result<()> {
        let text = self.text(value)?;
        row.insert(&self.property, text);
        Ok(())
    }

    fn deserialize(&self, row: &Row, _key: Option<&EncryptionKey>) -> Result<Value> {
        let cell = row.get(&self.property).ok_or_else(|| CodecError::DecodeFailure {
            type_name: TYPE_NAME,
            property: self.property.clone(),
            message: "missing cell".to_string(),
        })?;
        let text = cell.as_text().ok_or_else(|| CodecError::DecodeFailure {
            type_name: TYPE_NAME,
            property: self.property.clone(),
            message: format!("expected a string cell, got {}", cell.kind_name()),
        })?;
        Ok(Value::Text(text.to_string()))
    }

    fn equal(&self, left: &Value, right: &Value) -> Result<bool> {
        Ok(self.text(left)? == self.text(right)?)
    }

    fn compare(&self, left: &Value, right: &Value) -> Result<Ordering> {
        Ok(self.text(left)?.cmp(self.text(right)?))
    }

    fn canonical_string(&self, value: &Value) -> Result<String> {
        self.text(value).map(str::to_string)
    }

    fn filter_condition(&self, op: FilterOp, operand: &Value) -> Result<String> {
        check_operator(self, op)?;
        let operand = self.text(operand)?;
        Ok(format!(
            "{} {} {}",
            self.property,
            op.token(),
            filters::string_literal(operand)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::CellValue;

    #[test]
    fn test_round_trip() {
        let descriptor = StringType::new("name");
        let mut row = Row::new();
        descriptor
            .serialize(&mut row, &Value::from("hello"), None)
            .unwrap();

        assert_eq!(
            row.get("name").and_then(CellValue::as_text),
            Some("hello")
        );
        assert_eq!(row.annotation("name"), None);
        assert_eq!(
            descriptor.deserialize(&row, None).unwrap(),
            Value::from("hello")
        );
    }

    #[test]
    fn test_rejects_non_string_values() {
        let descriptor = StringType::new("name");
        let err = descriptor.validate(&Value::Number(3.0)).unwrap_err();
        assert!(matches!(err, CodecError::TypeMismatch { .. }));
    }

    #[test]
    fn test_filter_condition_quotes_operand() {
        let descriptor = StringType::new("name");
        assert_eq!(
            descriptor
                .filter_condition(FilterOp::Eq, &Value::from("hello"))
                .unwrap(),
            "name eq 'hello'"
        );
        assert_eq!(
            descriptor
                .filter_condition(FilterOp::Gt, &Value::from("it's"))
                .unwrap(),
            "name gt 'it''s'"
        );
    }

    #[test]
    fn test_compare_and_equal() {
        let descriptor = StringType::new("name");
        assert_eq!(
            descriptor
                .compare(&Value::from("apple"), &Value::from("banana"))
                .unwrap(),
            Ordering::Less
        );
        assert!(descriptor
            .equal(&Value::from("same"), &Value::from("same"))
            .unwrap());
        assert_eq!(
            descriptor.canonical_string(&Value::from("key")).unwrap(),
            "key"
        );
    }

    #[test]
    fn test_missing_cell_is_decode_failure() {
        let descriptor = StringType::new("name");
        let err = descriptor.deserialize(&Row::new(), None).unwrap_err();
        assert!(matches!(err, CodecError::DecodeFailure { .. }));
    }
}
