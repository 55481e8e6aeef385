//! Chunked binary envelope.
//!
//! A buffer-typed property named `P` is stored as up to four binary cells
//! `__buf0_P` .. `__buf3_P` (base64 text tagged `Edm.Binary`, at most
//! 64 KiB of raw bytes each) plus one numeric cell `__bufchunks_P`
//! recording the chunk count. Chunk boundaries are purely size-driven and
//! reassembly is byte-concatenation in index order.

pub mod crypto;

use crate::constants::{CHUNK_SIZE, MAX_CHUNKS, MAX_PAYLOAD_SIZE};
use crate::errors::{CodecError, Result};
use crate::row::{Row, WireTag};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Name of binary chunk cell `i` for `property`.
pub fn chunk_cell_name(property: &str, index: usize) -> String {
    format!("__buf{index}_{property}")
}

/// Name of the chunk-count cell for `property`.
pub fn chunk_count_cell_name(property: &str) -> String {
    format!("__bufchunks_{property}")
}

/// Split `payload` into chunk cells on `row`.
pub(crate) fn write_chunks(
    type_name: &'static str,
    row: &mut Row,
    property: &str,
    payload: &[u8],
) -> Result<()> {
    if payload.len() > MAX_PAYLOAD_SIZE {
        return Err(CodecError::SizeExceeded {
            type_name,
            property: property.to_string(),
            size: payload.len(),
            limit: MAX_PAYLOAD_SIZE,
        });
    }

    let mut chunks = 0;
    for (index, chunk) in payload.chunks(CHUNK_SIZE).enumerate() {
        row.insert_annotated(
            &chunk_cell_name(property, index),
            STANDARD.encode(chunk),
            WireTag::Binary,
        );
        chunks = index + 1;
    }
    row.insert(chunk_count_cell_name(property), chunks as f64);

    tracing::trace!(property, size = payload.len(), chunks, "Packed binary envelope");
    Ok(())
}

/// Reassemble the payload for `property` from chunk cells on `row`.
pub(crate) fn read_chunks(type_name: &'static str, row: &Row, property: &str) -> Result<Vec<u8>> {
    let decode_failure = |message: String| CodecError::DecodeFailure {
        type_name,
        property: property.to_string(),
        message,
    };

    let count_cell = chunk_count_cell_name(property);
    let count = row
        .get(&count_cell)
        .ok_or_else(|| decode_failure(format!("missing chunk count cell '{count_cell}'")))?
        .as_number()
        .ok_or_else(|| decode_failure(format!("chunk count cell '{count_cell}' is not numeric")))?;

    if count.fract() != 0.0 || !(0.0..=MAX_CHUNKS as f64).contains(&count) {
        return Err(decode_failure(format!("invalid chunk count {count}")));
    }

    let mut payload = Vec::new();
    for index in 0..count as usize {
        let cell_name = chunk_cell_name(property, index);
        let encoded = row
            .get(&cell_name)
            .ok_or_else(|| decode_failure(format!("missing chunk cell '{cell_name}'")))?
            .as_text()
            .ok_or_else(|| decode_failure(format!("chunk cell '{cell_name}' is not a string")))?;
        let chunk = STANDARD
            .decode(encoded)
            .map_err(|e| decode_failure(format!("chunk cell '{cell_name}': {e}")))?;
        payload.extend_from_slice(&chunk);
    }

    if payload.len() > MAX_PAYLOAD_SIZE {
        return Err(decode_failure(format!(
            "reassembled payload of {} bytes exceeds limit of {MAX_PAYLOAD_SIZE} bytes",
            payload.len()
        )));
    }

    Ok(payload)
}
