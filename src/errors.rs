//! Shared error types for cellcodec.
//!
//! All codec failures are surfaced through a single [`CodecError`] taxonomy.
//! Errors are raised synchronously, never retried, and every message names
//! the type variant and the property (or offending literal) involved.

use thiserror::Error;

/// Error type for all codec operations.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Value's primitive category does not match the expected set.
    #[error("{type_name} '{property}': expected {expected}, got {actual}")]
    TypeMismatch {
        type_name: &'static str,
        property: String,
        expected: String,
        actual: String,
    },

    /// Structural check failed (slug or UUID shape, non-integer where an
    /// integer is required, out-of-range value, wrong key length).
    ///
    /// `property` carries the property name when raised by a type
    /// descriptor, or the rejected literal when raised by a standalone
    /// parser.
    #[error("{type_name} '{property}': {message}")]
    FormatInvalid {
        type_name: &'static str,
        property: String,
        message: String,
    },

    /// JSON-Schema validation failed; carries the validator's error list
    /// and the offending value.
    #[error("schema '{property}': value does not match schema: {}", .errors.join("; "))]
    SchemaInvalid {
        property: String,
        errors: Vec<String>,
        value: serde_json::Value,
    },

    /// Payload exceeds the per-property size ceiling.
    #[error("{type_name} '{property}': payload of {size} bytes exceeds limit of {limit} bytes")]
    SizeExceeded {
        type_name: &'static str,
        property: String,
        size: usize,
        limit: usize,
    },

    /// Operation invoked on a type that does not support it.
    #[error("{type_name} '{property}' does not support {operation}")]
    NotComparable {
        type_name: &'static str,
        property: String,
        operation: &'static str,
    },

    /// Base operation with no meaningful implementation for this type.
    #[error("{type_name} does not implement {operation}")]
    NotImplemented {
        type_name: &'static str,
        operation: &'static str,
    },

    /// Corrupted envelope encountered on deserialize (missing chunk count,
    /// malformed base64, truncated ciphertext, padding failure).
    #[error("{type_name} '{property}': {message}")]
    DecodeFailure {
        type_name: &'static str,
        property: String,
        message: String,
    },
}

/// Result type alias using [`CodecError`].
pub type Result<T> = std::result::Result<T, CodecError>;
