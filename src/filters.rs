//! Filter operator vocabulary.
//!
//! The six comparison operators understood by the table store, their
//! server-side tokens, and the operand renderings for each wire category.
//! Types own operand rendering; callers own composition with `and`/`or`.

use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::fmt;
use uuid::Uuid;

/// Comparison operator usable in a server-side filter expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl FilterOp {
    /// Server-side operator token.
    pub const fn token(self) -> &'static str {
        match self {
            FilterOp::Eq => "eq",
            FilterOp::Ne => "ne",
            FilterOp::Lt => "lt",
            FilterOp::Le => "le",
            FilterOp::Gt => "gt",
            FilterOp::Ge => "ge",
        }
    }

    /// Parse a server token or a conventional symbolic form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "eq" | "=" | "==" => Some(FilterOp::Eq),
            "ne" | "!=" | "<>" => Some(FilterOp::Ne),
            "lt" | "<" => Some(FilterOp::Lt),
            "le" | "<=" => Some(FilterOp::Le),
            "gt" | ">" => Some(FilterOp::Gt),
            "ge" | ">=" => Some(FilterOp::Ge),
            _ => None,
        }
    }

    /// Returns true for the four range operators.
    ///
    /// Range operators require an `ordered` type; `Eq`/`Ne` only require
    /// `comparable`.
    pub const fn is_ordering(self) -> bool {
        !matches!(self, FilterOp::Eq | FilterOp::Ne)
    }

    /// In-memory comparator: does `left <op> right` hold given the
    /// ordering of `left` relative to `right`?
    pub fn matches(self, ordering: Ordering) -> bool {
        match self {
            FilterOp::Eq => ordering == Ordering::Equal,
            FilterOp::Ne => ordering != Ordering::Equal,
            FilterOp::Lt => ordering == Ordering::Less,
            FilterOp::Le => ordering != Ordering::Greater,
            FilterOp::Gt => ordering == Ordering::Greater,
            FilterOp::Ge => ordering != Ordering::Less,
        }
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Render a string operand: single-quoted, embedded quotes doubled.
pub(crate) fn string_literal(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Render a numeric operand as a bare literal.
pub(crate) fn number_literal(v: f64) -> String {
    v.to_string()
}

/// Render a boolean operand as a bare literal.
pub(crate) fn bool_literal(v: bool) -> &'static str {
    if v {
        "true"
    } else {
        "false"
    }
}

/// Render a date operand: `datetime'<ISO-8601>'`.
pub(crate) fn datetime_literal(v: &DateTime<Utc>) -> String {
    format!("datetime'{}'", crate::types::date::iso_string(v))
}

/// Render a GUID operand: `guid'<canonical-uuid>'`.
pub(crate) fn guid_literal(v: &Uuid) -> String {
    format!("guid'{v}'")
}
