//! # cellcodec
//!
//! Typed property codecs for row-oriented cloud table stores.
//!
//! The target store accepts rows as flat name-to-primitive maps whose cells
//! hold only strings, doubles, and booleans, optionally annotated with a
//! companion `<cell>@odata.type` tag (`Edm.Int64`, `Edm.DateTime`,
//! `Edm.Guid`, `Edm.Binary`). This crate maps application-level values onto
//! that model: every entity property is bound to a [`PropertyType`]
//! descriptor that validates domain values, serializes them into cells,
//! deserializes them back, compares them, and renders server-side filter
//! expressions for scans.
//!
//! Three pieces carry most of the weight:
//!
//! - the uniform [`PropertyType`] contract with its `ordered` /
//!   `comparable` / `encrypted` capability flags,
//! - the chunked binary envelope packing arbitrary byte payloads into the
//!   store's fixed-size binary cells (optionally wrapped in AES-256-CBC
//!   under a caller-supplied key), and
//! - [`SlugIdArray`], a packed dynamic array of 128-bit identifiers with
//!   amortized growth and an exact slug ⇄ raw-bytes codec.
//!
//! ## Example
//!
//! ```rust
//! use cellcodec::{FilterOp, PropertyType, Row, StringType, Value};
//!
//! let name = StringType::new("name");
//! let mut row = Row::new();
//! name.serialize(&mut row, &Value::from("hello"), None)?;
//!
//! assert_eq!(name.deserialize(&row, None)?, Value::from("hello"));
//! assert_eq!(
//!     name.filter_condition(FilterOp::Eq, &Value::from("hello"))?,
//!     "name eq 'hello'"
//! );
//! # Ok::<(), cellcodec::CodecError>(())
//! ```
//!
//! The codec layer is synchronous and stateless per call: descriptors are
//! immutable after construction and safe to share across threads, rows and
//! cipher keys are owned by the caller, and nothing is retried or
//! swallowed. Every failure surfaces as a [`CodecError`].

pub mod constants;
pub mod envelope;
pub mod errors;
pub mod filters;
pub mod row;
pub mod slugid;
pub mod types;

// Re-export the working surface at the crate root.
pub use envelope::crypto::EncryptionKey;
pub use errors::{CodecError, Result};
pub use filters::FilterOp;
pub use row::{CellValue, Row, WireTag};
pub use slugid::{SlugId, SlugIdArray};
pub use types::{
    BlobType, BooleanType, DateType, EncryptedBlobType, EncryptedJsonType, EncryptedSchemaType,
    EncryptedTextType, JsonType, NumberType, PositiveIntegerType, PropertyType, SchemaType,
    SlugIdArrayType, SlugIdType, StringType, TextType, UuidType, Value, ValueKind,
};
