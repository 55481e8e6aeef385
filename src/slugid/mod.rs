//! Slug identifiers.
//!
//! A slug is the 22-character URL-safe base64 form of a 128-bit identifier
//! (no padding, `-`/`_` in place of `+`/`/`). [`SlugId`] holds the raw 16
//! bytes and converts losslessly to and from both the slug form and the
//! canonical GUID form used on the wire.

mod array;

pub use array::SlugIdArray;

use crate::constants::{SLUG_CHARS, SLUG_SIZE};
use crate::errors::{CodecError, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Shape of a valid slug over its 22 characters.
static SLUG_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new("^[A-Za-z0-9_-]{8}[Q-T][A-Za-z0-9_-][CGKOSWaeimquy26-][A-Za-z0-9_-]{10}[AQgw]$")
        .expect("slug pattern is a valid regex")
});

/// A 128-bit identifier with a 22-character URL-safe base64 text form.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlugId([u8; SLUG_SIZE]);

impl SlugId {
    /// Wrap 16 raw bytes.
    pub const fn from_bytes(bytes: [u8; SLUG_SIZE]) -> Self {
        Self(bytes)
    }

    /// Wrap a byte slice, rejecting any length other than 16.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let raw: [u8; SLUG_SIZE] =
            bytes
                .try_into()
                .map_err(|_| CodecError::FormatInvalid {
                    type_name: "slugid",
                    property: format!("{} bytes", bytes.len()),
                    message: format!("raw slug must be exactly {SLUG_SIZE} bytes"),
                })?;
        Ok(Self(raw))
    }

    /// Borrow the raw 16 bytes.
    pub const fn as_bytes(&self) -> &[u8; SLUG_SIZE] {
        &self.0
    }

    /// View the identifier as a canonical GUID.
    pub const fn to_uuid(self) -> Uuid {
        Uuid::from_bytes(self.0)
    }

    /// Adopt the bytes of a GUID.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid.into_bytes())
    }

    /// Parse the 22-character slug form, strictly.
    ///
    /// Rejects wrong lengths and any string outside the slug shape. Errors
    /// carry the rejected input.
    pub fn parse(s: &str) -> Result<Self> {
        if s.len() != SLUG_CHARS {
            return Err(CodecError::FormatInvalid {
                type_name: "slugid",
                property: s.to_string(),
                message: format!("slug must be exactly {SLUG_CHARS} characters, got {}", s.len()),
            });
        }
        if !SLUG_PATTERN.is_match(s) {
            return Err(CodecError::FormatInvalid {
                type_name: "slugid",
                property: s.to_string(),
                message: "not a valid slug".to_string(),
            });
        }
        let raw = URL_SAFE_NO_PAD.decode(s).map_err(|e| CodecError::FormatInvalid {
            type_name: "slugid",
            property: s.to_string(),
            message: format!("base64 decode failed: {e}"),
        })?;
        Self::from_slice(&raw)
    }
}

impl fmt::Display for SlugId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&URL_SAFE_NO_PAD.encode(self.0))
    }
}

impl fmt::Debug for SlugId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SlugId({self})")
    }
}

impl FromStr for SlugId {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<Uuid> for SlugId {
    fn from(uuid: Uuid) -> Self {
        Self::from_uuid(uuid)
    }
}
