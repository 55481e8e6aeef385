//! Boolean property type.

use crate::envelope::crypto::EncryptionKey;
use crate::errors::{CodecError, Result};
use crate::filters::{self, FilterOp};
use crate::row::Row;
use crate::types::{check_operator, type_mismatch, PropertyType, Value, ValueKind};

const TYPE_NAME: &str = "boolean";

/// Boolean stored as a single boolean cell. Comparable but not ordered.
#[derive(Debug, Clone)]
pub struct BooleanType {
    property: String,
}

impl BooleanType {
    pub fn new(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
        }
    }

    fn flag(&self, value: &Value) -> Result<bool> {
        match value {
            Value::Bool(b) => Ok(*b),
            other => Err(type_mismatch(TYPE_NAME, &self.property, &[ValueKind::Bool], other)),
        }
    }
}

impl PropertyType for BooleanType {
    fn property(&self) -> &str {
        &self.property
    }

    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn is_comparable(&self) -> bool {
        true
    }

    fn validate(&self, value: &Value) -> Result<()> {
        self.flag(value).map(|_| ())
    }

    fn serialize(&self, row: &mut Row, value: &Value, _key: Option<&EncryptionKey>) -> Result<()> {
        let flag = self.flag(value)?;
        row.insert(&self.property, flag);
        Ok(())
    }

    fn deserialize(&self, row: &Row, _key: Option<&EncryptionKey>) -> Result<Value> {
        let cell = row.get(&self.property).ok_or_else(|| CodecError::DecodeFailure {
            type_name: TYPE_NAME,
            property: self.property.clone(),
            message: "missing cell".to_string(),
        })?;
        let flag = cell.as_bool().ok_or_else(|| CodecError::DecodeFailure {
            type_name: TYPE_NAME,
            property: self.property.clone(),
            message: format!("expected a boolean cell, got {}", cell.kind_name()),
        })?;
        Ok(Value::Bool(flag))
    }

    fn equal(&self, left: &Value, right: &Value) -> Result<bool> {
        Ok(self.flag(left)? == self.flag(right)?)
    }

    fn canonical_string(&self, value: &Value) -> Result<String> {
        Ok(filters::bool_literal(self.flag(value)?).to_string())
    }

    fn filter_condition(&self, op: FilterOp, operand: &Value) -> Result<String> {
        check_operator(self, op)?;
        let operand = self.flag(operand)?;
        Ok(format!(
            "{} {} {}",
            self.property,
            op.token(),
            filters::bool_literal(operand)
        ))
    }
}
