//! Wire-level constants for cellcodec.
//!
//! This module centralizes the size limits and cell-naming conventions used
//! by the codecs. The cell names are part of the wire format and must be
//! reproduced exactly to round-trip with existing data.

/// Maximum raw bytes carried by a single binary chunk cell (64 KiB).
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Maximum raw payload for a single buffer-typed property (256 KiB).
pub const MAX_PAYLOAD_SIZE: usize = 256 * 1024;

/// Maximum number of binary chunk cells per property.
pub const MAX_CHUNKS: usize = MAX_PAYLOAD_SIZE / CHUNK_SIZE;

/// Maximum plaintext for an encrypted property.
///
/// One block of headroom is reserved for the prepended IV plus PKCS#7
/// padding so that `IV || ciphertext` still fits under
/// [`MAX_PAYLOAD_SIZE`].
pub const MAX_ENCRYPTED_PLAINTEXT: usize = MAX_PAYLOAD_SIZE - 32;

/// AES-CBC initialization vector size in bytes.
pub const IV_SIZE: usize = 16;

/// Symmetric cipher key size in bytes (AES-256).
pub const KEY_SIZE: usize = 32;

/// Raw byte width of a decoded slug (128 bits).
pub const SLUG_SIZE: usize = 16;

/// Character length of the encoded slug form.
pub const SLUG_CHARS: usize = 22;

/// Initial slot capacity of a [`SlugIdArray`](crate::SlugIdArray).
///
/// Also the floor below which the array never shrinks.
pub const INITIAL_SLOTS: usize = 32;

/// Suffix of the companion cell carrying a wire type tag.
pub const ANNOTATION_SUFFIX: &str = "@odata.type";
