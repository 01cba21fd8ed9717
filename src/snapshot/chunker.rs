//! Snapshot Chunker
//!
//! The producer side of the snapshot wire format: serializes a document,
//! compresses it and splits the compressed bytes into data points small
//! enough for a single store record.

use crate::snapshot::compression::{compress, encode_base64};
use crate::snapshot::error::SnapshotResult;
use crate::snapshot::types::{AssembledDocument, DataPoint, CHUNKS_TAG, SIZE_TAG};

/// Serialize and gzip a document
pub fn encode_document(doc: &AssembledDocument) -> SnapshotResult<Vec<u8>> {
    let json = serde_json::to_string(doc)?;
    compress(&json)
}

/// Split a compressed payload into data points, master first
///
/// A payload that fits in one record yields a single untagged point.
/// Otherwise the master is tagged with the chunk count and the total size
/// and chunk `i` is stamped `timestamp - i`.
pub fn split_payload(compressed: &[u8], max_chunk_bytes: usize, timestamp: i64) -> Vec<DataPoint> {
    let max_chunk_bytes = max_chunk_bytes.max(1);

    if compressed.len() <= max_chunk_bytes {
        return vec![DataPoint::new(timestamp, encode_base64(compressed))];
    }

    let pieces: Vec<&[u8]> = compressed.chunks(max_chunk_bytes).collect();
    let count = pieces.len();

    pieces
        .into_iter()
        .enumerate()
        .map(|(i, piece)| {
            let point = DataPoint::new(timestamp - i as i64, encode_base64(piece));
            if i == 0 {
                point
                    .tag(CHUNKS_TAG, count.to_string())
                    .tag(SIZE_TAG, compressed.len().to_string())
            } else {
                point
            }
        })
        .collect()
}

/// Encode a document into the data points an agent would write
pub fn split_snapshot(
    doc: &AssembledDocument,
    max_chunk_bytes: usize,
    timestamp: i64,
) -> SnapshotResult<Vec<DataPoint>> {
    let compressed = encode_document(doc)?;
    let points = split_payload(&compressed, max_chunk_bytes, timestamp);

    tracing::trace!(
        compressed_bytes = compressed.len(),
        chunks = points.len(),
        "Split snapshot into data points"
    );

    Ok(points)
}
