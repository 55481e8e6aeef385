//! Numeric property types.
//!
//! Numbers ride in a plain double cell. Integers whose magnitude reaches
//! 2^31 cannot be trusted to survive the store's numeric cell, so they are
//! written as strings tagged `Edm.Int64` and parsed back on read.

use crate::envelope::crypto::EncryptionKey;
use crate::errors::{CodecError, Result};
use crate::filters::{self, FilterOp};
use crate::row::{CellValue, Row, WireTag};
use crate::types::{check_operator, type_mismatch, PropertyType, Value, ValueKind};
use std::cmp::Ordering;

/// Integers at or beyond this magnitude are stored as tagged strings.
const INT64_THRESHOLD: f64 = 2_147_483_648.0; // 2^31

/// Exclusive upper bound for [`PositiveIntegerType`]: 2^32 is rejected,
/// 2^32 - 1 is accepted.
const POSITIVE_INTEGER_LIMIT: f64 = 4_294_967_296.0; // 2^32

fn numeric(type_name: &'static str, property: &str, value: &Value) -> Result<f64> {
    match value {
        Value::Number(n) => {
            if n.is_finite() {
                Ok(*n)
            } else {
                Err(CodecError::FormatInvalid {
                    type_name,
                    property: property.to_string(),
                    message: format!("{n} has no wire rendering"),
                })
            }
        }
        other => Err(type_mismatch(type_name, property, &[ValueKind::Number], other)),
    }
}

fn write_number_cell(row: &mut Row, property: &str, value: f64) {
    if value.fract() == 0.0 && value.abs() >= INT64_THRESHOLD {
        row.insert_annotated(property, format!("{value:.0}"), WireTag::Int64);
    } else {
        row.insert(property, value);
    }
}

fn read_number_cell(type_name: &'static str, row: &Row, property: &str) -> Result<f64> {
    let decode_failure = |message: String| CodecError::DecodeFailure {
        type_name,
        property: property.to_string(),
        message,
    };

    let cell = row
        .get(property)
        .ok_or_else(|| decode_failure("missing cell".to_string()))?;
    match cell {
        CellValue::Number(n) => Ok(*n),
        CellValue::Text(s) => s
            .parse::<f64>()
            .map_err(|e| decode_failure(format!("numeric cell '{s}' does not parse: {e}"))),
        CellValue::Bool(_) => Err(decode_failure("expected a numeric cell, got boolean".to_string())),
    }
}

/// Double-or-integer stored in a single cell.
#[derive(Debug, Clone)]
pub struct NumberType {
    property: String,
}

impl NumberType {
    pub fn new(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
        }
    }
}

impl PropertyType for NumberType {
    fn property(&self) -> &str {
        &self.property
    }

    fn type_name(&self) -> &'static str {
        "number"
    }

    fn is_ordered(&self) -> bool {
        true
    }

    fn is_comparable(&self) -> bool {
        true
    }

    fn validate(&self, value: &Value) -> Result<()> {
        numeric(self.type_name(), &self.property, value).map(|_| ())
    }

    fn serialize(&self, row: &mut Row, value: &Value, _key: Option<&EncryptionKey>) -> Result<()> {
        let number = numeric(self.type_name(), &self.property, value)?;
        write_number_cell(row, &self.property, number);
        Ok(())
    }

    fn deserialize(&self, row: &Row, _key: Option<&EncryptionKey>) -> Result<Value> {
        let number = read_number_cell(self.type_name(), row, &self.property)?;
        let value = Value::Number(number);
        self.validate(&value)?;
        Ok(value)
    }

    fn equal(&self, left: &Value, right: &Value) -> Result<bool> {
        let left = numeric(self.type_name(), &self.property, left)?;
        let right = numeric(self.type_name(), &self.property, right)?;
        Ok(left == right)
    }

    fn compare(&self, left: &Value, right: &Value) -> Result<Ordering> {
        let left = numeric(self.type_name(), &self.property, left)?;
        let right = numeric(self.type_name(), &self.property, right)?;
        Ok(left.total_cmp(&right))
    }

    fn canonical_string(&self, value: &Value) -> Result<String> {
        numeric(self.type_name(), &self.property, value).map(filters::number_literal)
    }

    fn filter_condition(&self, op: FilterOp, operand: &Value) -> Result<String> {
        check_operator(self, op)?;
        let operand = numeric(self.type_name(), &self.property, operand)?;
        Ok(format!(
            "{} {} {}",
            self.property,
            op.token(),
            filters::number_literal(operand)
        ))
    }
}

/// Non-negative integer below 2^32, stored like [`NumberType`].
#[derive(Debug, Clone)]
pub struct PositiveIntegerType {
    property: String,
}

impl PositiveIntegerType {
    pub fn new(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
        }
    }

    fn checked(&self, value: &Value) -> Result<f64> {
        let number = numeric(self.type_name(), &self.property, value)?;
        let format_invalid = |message: String| CodecError::FormatInvalid {
            type_name: self.type_name(),
            property: self.property.clone(),
            message,
        };
        if number.fract() != 0.0 {
            return Err(format_invalid(format!("{number} is not an integer")));
        }
        if number < 0.0 {
            return Err(format_invalid(format!("{number} is negative")));
        }
        if number >= POSITIVE_INTEGER_LIMIT {
            return Err(format_invalid(format!("{number} is out of range (max 2^32 - 1)")));
        }
        Ok(number)
    }
}

impl PropertyType for PositiveIntegerType {
    fn property(&self) -> &str {
        &self.property
    }

    fn type_name(&self) -> &'static str {
        "positive integer"
    }

    fn is_ordered(&self) -> bool {
        true
    }

    fn is_comparable(&self) -> bool {
        true
    }

    fn validate(&self, value: &Value) -> Result<()> {
        self.checked(value).map(|_| ())
    }

    fn serialize(&self, row: &mut Row, value: &Value, _key: Option<&EncryptionKey>) -> Result<()> {
        let number = self.checked(value)?;
        write_number_cell(row, &self.property, number);
        Ok(())
    }

    fn deserialize(&self, row: &Row, _key: Option<&EncryptionKey>) -> Result<Value> {
        let number = read_number_cell(self.type_name(), row, &self.property)?;
        let value = Value::Number(number);
        self.validate(&value)?;
        Ok(value)
    }

    fn equal(&self, left: &Value, right: &Value) -> Result<bool> {
        Ok(self.checked(left)? == self.checked(right)?)
    }

    fn compare(&self, left: &Value, right: &Value) -> Result<Ordering> {
        Ok(self.checked(left)?.total_cmp(&self.checked(right)?))
    }

    fn canonical_string(&self, value: &Value) -> Result<String> {
        self.checked(value).map(filters::number_literal)
    }

    fn filter_condition(&self, op: FilterOp, operand: &Value) -> Result<String> {
        check_operator(self, op)?;
        let operand = self.checked(operand)?;
        Ok(format!(
            "{} {} {}",
            self.property,
            op.token(),
            filters::number_literal(operand)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_number_stays_numeric() {
        let descriptor = NumberType::new("n");
        let mut row = Row::new();
        descriptor.serialize(&mut row, &Value::Number(42.5), None).unwrap();

        assert_eq!(row.get("n").and_then(CellValue::as_number), Some(42.5));
        assert_eq!(row.annotation("n"), None);
        assert_eq!(descriptor.deserialize(&row, None).unwrap(), Value::Number(42.5));
    }

    #[test]
    fn test_big_integer_goes_through_int64_cell() {
        let descriptor = NumberType::new("n");
        let mut row = Row::new();
        descriptor
            .serialize(&mut row, &Value::Number(9_000_000_000.0), None)
            .unwrap();

        assert_eq!(
            row.get("n").and_then(CellValue::as_text),
            Some("9000000000")
        );
        assert_eq!(row.annotation("n"), Some(WireTag::Int64));
        assert_eq!(
            descriptor.deserialize(&row, None).unwrap(),
            Value::Number(9_000_000_000.0)
        );
    }

    #[test]
    fn test_int64_threshold_boundary() {
        let descriptor = NumberType::new("n");

        // Just below 2^31: plain numeric cell.
        let mut row = Row::new();
        descriptor
            .serialize(&mut row, &Value::Number(2_147_483_647.0), None)
            .unwrap();
        assert_eq!(row.annotation("n"), None);

        // Exactly 2^31 and negatives of the same magnitude: tagged string.
        for value in [2_147_483_648.0, -2_147_483_648.0] {
            let mut row = Row::new();
            descriptor.serialize(&mut row, &Value::Number(value), None).unwrap();
            assert_eq!(row.annotation("n"), Some(WireTag::Int64));
            assert_eq!(
                descriptor.deserialize(&row, None).unwrap(),
                Value::Number(value)
            );
        }
    }

    #[test]
    fn test_non_finite_numbers_are_rejected() {
        let descriptor = NumberType::new("n");
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = descriptor.validate(&Value::Number(value)).unwrap_err();
            assert!(matches!(err, CodecError::FormatInvalid { .. }));
        }
    }

    #[test]
    fn test_number_filter_renders_bare_literal() {
        let descriptor = NumberType::new("n");
        assert_eq!(
            descriptor
                .filter_condition(FilterOp::Ge, &Value::Number(42.0))
                .unwrap(),
            "n ge 42"
        );
    }

    #[test]
    fn test_positive_integer_boundaries() {
        let descriptor = PositiveIntegerType::new("count");

        assert!(descriptor.validate(&Value::Number(0.0)).is_ok());
        assert!(descriptor.validate(&Value::Number(4_294_967_295.0)).is_ok());

        for bad in [4_294_967_296.0, -1.0, 1.5] {
            let err = descriptor.validate(&Value::Number(bad)).unwrap_err();
            assert!(matches!(err, CodecError::FormatInvalid { .. }), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_positive_integer_round_trip() {
        let descriptor = PositiveIntegerType::new("count");
        let mut row = Row::new();
        descriptor
            .serialize(&mut row, &Value::Number(4_294_967_295.0), None)
            .unwrap();

        // Above the 2^31 threshold, so it rides the Int64 path.
        assert_eq!(row.annotation("count"), Some(WireTag::Int64));
        assert_eq!(
            descriptor.deserialize(&row, None).unwrap(),
            Value::Number(4_294_967_295.0)
        );
    }

    #[test]
    fn test_compare() {
        let descriptor = NumberType::new("n");
        assert_eq!(
            descriptor
                .compare(&Value::Number(1.0), &Value::Number(2.0))
                .unwrap(),
            Ordering::Less
        );
        assert!(descriptor
            .equal(&Value::Number(3.0), &Value::Number(3.0))
            .unwrap());
    }
}
