//! Payload codec for inventory snapshots
//!
//! Agents write a snapshot as:
//! 1. Serialize the document to JSON
//! 2. Gzip the JSON text
//! 3. Split the compressed bytes into chunks (see `chunker`)
//! 4. Base64-encode each chunk into a string data point
//!
//! This module holds steps 2 and 4 in both directions.

use crate::snapshot::error::{SnapshotError, SnapshotResult};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{Read, Write};

/// Gzip a document's text
pub fn compress(text: &str) -> SnapshotResult<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(text.as_bytes())
        .map_err(encode_error)?;
    encoder.finish().map_err(encode_error)
}

fn encode_error(err: std::io::Error) -> SnapshotError {
    SnapshotError::Encode(format!("gzip: {}", err))
}

/// Gunzip assembled bytes back to text
///
/// An empty payload decompresses to an empty string.
pub fn decompress(data: &[u8]) -> SnapshotResult<String> {
    if data.is_empty() {
        return Ok(String::new());
    }

    let mut decoder = GzDecoder::new(data);
    let mut text = String::new();
    decoder
        .read_to_string(&mut text)
        .map_err(|e| SnapshotError::Decode(format!("gzip decompression failed: {}", e)))?;

    Ok(text)
}

/// Decode one data point value
pub fn decode_base64(value: &str) -> SnapshotResult<Vec<u8>> {
    Ok(STANDARD.decode(value.as_bytes())?)
}

/// Encode one chunk into a data point value
pub fn encode_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}
