//! Row map model.
//!
//! A [`Row`] is the flat name-to-primitive mapping accepted by the target
//! table store. Cells hold only strings, doubles, and booleans; a cell may
//! carry a companion `<cell>@odata.type` annotation naming its wire type.
//! Rows serialize to clean JSON maps so callers can hand them to an HTTP
//! client directly.

use crate::constants::ANNOTATION_SUFFIX;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Primitive wire value held by a single cell.
///
/// Variant order matters for untagged deserialization: booleans and numbers
/// must be tried before the catch-all string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Returns the string payload, if this cell holds one.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the numeric payload, if this cell holds one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the boolean payload, if this cell holds one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CellValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Wire category name used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            CellValue::Bool(_) => "boolean",
            CellValue::Number(_) => "number",
            CellValue::Text(_) => "string",
        }
    }
}

impl From<&str> for CellValue {
    fn from(v: &str) -> Self {
        CellValue::Text(v.to_string())
    }
}

impl From<String> for CellValue {
    fn from(v: String) -> Self {
        CellValue::Text(v)
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Number(v)
    }
}

impl From<bool> for CellValue {
    fn from(v: bool) -> Self {
        CellValue::Bool(v)
    }
}

/// Wire type tag carried by an `@odata.type` annotation cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireTag {
    Int64,
    DateTime,
    Guid,
    Binary,
}

impl WireTag {
    /// The exact annotation string emitted on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            WireTag::Int64 => "Edm.Int64",
            WireTag::DateTime => "Edm.DateTime",
            WireTag::Guid => "Edm.Guid",
            WireTag::Binary => "Edm.Binary",
        }
    }

    /// Parse an annotation string back into a tag.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Edm.Int64" => Some(WireTag::Int64),
            "Edm.DateTime" => Some(WireTag::DateTime),
            "Edm.Guid" => Some(WireTag::Guid),
            "Edm.Binary" => Some(WireTag::Binary),
            _ => None,
        }
    }
}

impl fmt::Display for WireTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flat cell map for one stored row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    cells: BTreeMap<String, CellValue>,
}

impl Row {
    /// Create an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a plain cell.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<CellValue>) {
        self.cells.insert(name.into(), value.into());
    }

    /// Insert a cell together with its `@odata.type` annotation.
    pub fn insert_annotated(&mut self, name: &str, value: impl Into<CellValue>, tag: WireTag) {
        self.cells.insert(name.to_string(), value.into());
        self.cells.insert(
            format!("{name}{ANNOTATION_SUFFIX}"),
            CellValue::Text(tag.as_str().to_string()),
        );
    }

    /// Look up a cell by name.
    pub fn get(&self, name: &str) -> Option<&CellValue> {
        self.cells.get(name)
    }

    /// Returns the wire tag annotated on `name`, if any.
    pub fn annotation(&self, name: &str) -> Option<WireTag> {
        self.cells
            .get(&format!("{name}{ANNOTATION_SUFFIX}"))
            .and_then(CellValue::as_text)
            .and_then(WireTag::parse)
    }

    /// Returns true if a cell named `name` exists.
    pub fn contains(&self, name: &str) -> bool {
        self.cells.contains_key(name)
    }

    /// Number of cells, annotations included.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns true if the row has no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterate over cells in name order.
    pub fn iter(&self) -> std::collections::btree_map::Iter<'_, String, CellValue> {
        self.cells.iter()
    }

    /// Render the row as a plain JSON map.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    /// Rebuild a row from a plain JSON map.
    pub fn from_json(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}
