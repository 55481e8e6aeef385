//! Date property type.
//!
//! Dates ride as ISO-8601 strings with millisecond precision, tagged
//! `Edm.DateTime`. Equality and ordering are at millisecond resolution to
//! match the wire form.

use crate::envelope::crypto::EncryptionKey;
use crate::errors::{CodecError, Result};
use crate::filters::{self, FilterOp};
use crate::row::{Row, WireTag};
use crate::types::{check_operator, type_mismatch, PropertyType, Value, ValueKind};
use chrono::{DateTime, SecondsFormat, Utc};
use std::cmp::Ordering;

const TYPE_NAME: &str = "date";

/// The wire rendering of an instant: `2020-01-02T03:04:05.006Z`.
pub(crate) fn iso_string(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Instant stored as an ISO-8601 text cell tagged `Edm.DateTime`.
#[derive(Debug, Clone)]
pub struct DateType {
    property: String,
}

impl DateType {
    pub fn new(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
        }
    }

    fn instant(&self, value: &Value) -> Result<DateTime<Utc>> {
        match value {
            Value::Date(d) => Ok(*d),
            other => Err(type_mismatch(TYPE_NAME, &self.property, &[ValueKind::Date], other)),
        }
    }
}

impl PropertyType for DateType {
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
        self.instant(value).map(|_| ())
    }

    fn serialize(&self, row: &mut Row, value: &Value, _key: Option<&EncryptionKey>) -> Result<()> {
        let instant = self.instant(value)?;
        row.insert_annotated(&self.property, iso_string(&instant), WireTag::DateTime);
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
        let instant = DateTime::parse_from_rfc3339(text)
            .map_err(|e| decode_failure(format!("'{text}' is not an ISO-8601 instant: {e}")))?;
        Ok(Value::Date(instant.with_timezone(&Utc)))
    }

    fn equal(&self, left: &Value, right: &Value) -> Result<bool> {
        let left = self.instant(left)?;
        let right = self.instant(right)?;
        Ok(left.timestamp_millis() == right.timestamp_millis())
    }

    fn compare(&self, left: &Value, right: &Value) -> Result<Ordering> {
        let left = self.instant(left)?;
        let right = self.instant(right)?;
        Ok(left.timestamp_millis().cmp(&right.timestamp_millis()))
    }

    fn canonical_string(&self, value: &Value) -> Result<String> {
        self.instant(value).map(|instant| iso_string(&instant))
    }

    fn filter_condition(&self, op: FilterOp, operand: &Value) -> Result<String> {
        check_operator(self, op)?;
        let operand = self.instant(operand)?;
        Ok(format!(
            "{} {} {}",
            self.property,
            op.token(),
            filters::datetime_literal(&operand)
        ))
    }
}
