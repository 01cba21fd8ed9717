//! Snapshot Assembler
//!
//! Rebuilds one inventory document from the descending data point history
//! of a series.
//!
//! # Chunk layout
//!
//! ```text
//! points[0]  ts=T    tags{chunks=3, size=N}  base64(bytes[0..a])   ← master
//! points[1]  ts=T-1                          base64(bytes[a..b])
//! points[2]  ts=T-2                          base64(bytes[b..N])
//! points[3]  ts=T'   ...                                          ← older history, ignored
//! ```
//!
//! A master without the `chunks` tag carries the whole payload on its own.
//! Any integrity failure rejects the whole attempt; there is no partial
//! document.

use crate::snapshot::compression::{decode_base64, decompress};
use crate::snapshot::error::{SnapshotError, SnapshotResult};
use crate::snapshot::types::{AssembledDocument, DataPoint, CHUNKS_TAG, SIZE_TAG};

/// Upper bounds on what a master data point may declare
///
/// Checked before the reassembly buffer is allocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssemblerLimits {
    /// Maximum declared chunk count
    pub max_chunks: usize,
    /// Maximum declared total size in bytes
    pub max_size_bytes: usize,
}

impl Default for AssemblerLimits {
    fn default() -> Self {
        Self {
            max_chunks: 100_000,
            max_size_bytes: 512 * 1024 * 1024, // 512 MB
        }
    }
}

/// Fragmentation metadata read from a master data point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ChunkHeader {
    chunks: usize,
    size: usize,
}

/// Reassembles chunk sets into documents
#[derive(Debug, Clone, Default)]
pub struct Assembler {
    limits: AssemblerLimits,
}

impl Assembler {
    /// Create an assembler with custom limits
    pub fn new(limits: AssemblerLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> AssemblerLimits {
        self.limits
    }

    /// Reassemble, decompress and parse a chunk set
    pub fn assemble(&self, points: &[DataPoint]) -> SnapshotResult<AssembledDocument> {
        let bytes = self.assemble_bytes(points)?;
        let text = decompress(&bytes)?;
        parse_document(&text)
    }

    /// Reassemble the compressed payload without decoding it further
    pub fn assemble_bytes(&self, points: &[DataPoint]) -> SnapshotResult<Vec<u8>> {
        let master = points.first().ok_or(SnapshotError::Missing)?;

        let header = match read_header(master)? {
            Some(header) => header,
            None => return decode_base64(&master.value),
        };
        self.check_limits(header)?;

        let master_bytes = decode_base64(&master.value)?;
        if master_bytes.is_empty() {
            return Err(SnapshotError::Invalid(
                "master datapoint exists but is empty".to_string(),
            ));
        }

        // Older chunks may have left the store's retention window
        if header.chunks > points.len() {
            return Err(SnapshotError::Invalid(format!(
                "{} chunks expected, only {} are available",
                header.chunks,
                points.len()
            )));
        }

        let mut buffer = Vec::with_capacity(header.size);
        append_chunk(&mut buffer, &master_bytes, header.size, 0)?;

        for (index, fragment) in points.iter().enumerate().take(header.chunks).skip(1) {
            let expected = master.timestamp.checked_sub(index as i64).ok_or_else(|| {
                SnapshotError::Invalid(format!(
                    "master timestamp {} too small for {} chunks",
                    master.timestamp, header.chunks
                ))
            })?;

            if fragment.timestamp != expected {
                return Err(SnapshotError::ChunkOrder {
                    index,
                    observed: fragment.timestamp,
                    expected,
                });
            }

            let bytes = decode_base64(&fragment.value)?;
            append_chunk(&mut buffer, &bytes, header.size, index)?;
        }

        if buffer.len() != header.size {
            return Err(SnapshotError::Invalid(format!(
                "assembled {} bytes, declared size is {}",
                buffer.len(),
                header.size
            )));
        }

        tracing::debug!(
            chunks = header.chunks,
            size = header.size,
            master_timestamp = master.timestamp,
            "Reassembled fragmented snapshot"
        );

        Ok(buffer)
    }

    fn check_limits(&self, header: ChunkHeader) -> SnapshotResult<()> {
        if header.chunks == 0 {
            return Err(SnapshotError::Invalid(
                "master declares zero chunks".to_string(),
            ));
        }
        if header.chunks > self.limits.max_chunks {
            return Err(SnapshotError::Invalid(format!(
                "{} chunks declared, limit is {}",
                header.chunks, self.limits.max_chunks
            )));
        }
        if header.size > self.limits.max_size_bytes {
            return Err(SnapshotError::Invalid(format!(
                "{} bytes declared, limit is {}",
                header.size, self.limits.max_size_bytes
            )));
        }
        Ok(())
    }
}

/// Reassemble a chunk set with default limits
pub fn assemble(points: &[DataPoint]) -> SnapshotResult<AssembledDocument> {
    Assembler::default().assemble(points)
}

/// Parse decompressed document text
pub fn parse_document(text: &str) -> SnapshotResult<AssembledDocument> {
    Ok(serde_json::from_str(text)?)
}

fn read_header(master: &DataPoint) -> SnapshotResult<Option<ChunkHeader>> {
    let Some(chunks) = master.tags.get(CHUNKS_TAG) else {
        return Ok(None);
    };

    let chunks = chunks.trim().parse::<usize>().map_err(|_| {
        SnapshotError::Invalid(format!("unreadable '{}' tag: '{}'", CHUNKS_TAG, chunks))
    })?;

    let size = master.tags.get(SIZE_TAG).ok_or_else(|| {
        SnapshotError::Invalid(format!("'{}' tag missing on chunked master", SIZE_TAG))
    })?;
    let size = size.trim().parse::<usize>().map_err(|_| {
        SnapshotError::Invalid(format!("unreadable '{}' tag: '{}'", SIZE_TAG, size))
    })?;

    Ok(Some(ChunkHeader { chunks, size }))
}

/// Append one decoded chunk, refusing to grow past the declared size
fn append_chunk(
    buffer: &mut Vec<u8>,
    chunk: &[u8],
    declared_size: usize,
    index: usize,
) -> SnapshotResult<()> {
    if buffer.len() + chunk.len() > declared_size {
        return Err(SnapshotError::Invalid(format!(
            "chunk n°{} overflows declared size {} ({} bytes already assembled, {} more)",
            index,
            declared_size,
            buffer.len(),
            chunk.len()
        )));
    }
    buffer.extend_from_slice(chunk);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::chunker::{encode_document, split_payload, split_snapshot};
    use crate::snapshot::compression::encode_base64;
    use crate::snapshot::types::{
        MetricBlueprint, MetricTypeBlueprint, MetricUnit, ResourceBlueprint,
    };

    fn sample_document() -> AssembledDocument {
        let mut doc = AssembledDocument::new(ResourceBlueprint {
            id: "eap".to_string(),
            name: Some("EAP server".to_string()),
            ..Default::default()
        });
        for i in 0..50 {
            let path = format!("m;metric{}", i);
            doc = doc
                .child(
                    path.clone(),
                    MetricBlueprint {
                        id: format!("metric{}", i),
                        name: Some(format!("Metric {}", i)),
                        metric_type_path: Some("/t;tenant/f;feed/mt;heap".to_string()),
                        ..Default::default()
                    },
                )
                .index_metric("heap", path);
        }
        doc
    }

    fn fragmented_points(doc: &AssembledDocument, pieces: usize, timestamp: i64) -> Vec<DataPoint> {
        let compressed = encode_document(doc).unwrap();
        let chunk_size = compressed.len().div_ceil(pieces);
        let points = split_payload(&compressed, chunk_size, timestamp);
        assert_eq!(points.len(), pieces);
        points
    }

    #[test]
    fn test_unfragmented_round_trip() {
        let doc = AssembledDocument::new(MetricTypeBlueprint {
            id: "heap".to_string(),
            unit: MetricUnit::Bytes,
            collection_interval: Some(60),
            ..Default::default()
        });
        let value = encode_base64(&encode_document(&doc).unwrap());

        let restored = assemble(&[DataPoint::new(1000, value)]).unwrap();
        assert_eq!(restored, doc);
    }

    #[test]
    fn test_fragmented_round_trip() {
        let doc = sample_document();
        let points = fragmented_points(&doc, 4, 10_000);

        assert!(points[0].is_chunk_master());
        assert_eq!(points[3].timestamp, 9_997);

        let restored = assemble(&points).unwrap();
        assert_eq!(restored, doc);
    }

    #[test]
    fn test_older_history_is_ignored() {
        let doc = sample_document();
        let mut points = split_snapshot(&doc, 64, 50_000).unwrap();

        let older = AssembledDocument::new(ResourceBlueprint {
            id: "old".to_string(),
            ..Default::default()
        });
        points.extend(split_snapshot(&older, 64, 20_000).unwrap());

        assert_eq!(assemble(&points).unwrap(), doc);
    }

    #[test]
    fn test_empty_chunk_set() {
        assert_eq!(assemble(&[]), Err(SnapshotError::Missing));
    }

    #[test]
    fn test_missing_fragments() {
        let doc = sample_document();
        let mut points = fragmented_points(&doc, 5, 10_000);
        points.truncate(3);

        let err = assemble(&points).unwrap_err();
        assert!(matches!(err, SnapshotError::Invalid(ref msg) if msg.contains("5 chunks expected")));
    }

    #[test]
    fn test_broken_contiguity() {
        let doc = sample_document();

        for delta in [-1, 1] {
            let mut points = fragmented_points(&doc, 4, 10_000);
            points[2].timestamp += delta;

            let err = assemble(&points).unwrap_err();
            assert_eq!(
                err,
                SnapshotError::ChunkOrder {
                    index: 2,
                    observed: 9_998 + delta,
                    expected: 9_998,
                }
            );
        }
    }

    #[test]
    fn test_empty_master() {
        let points = vec![
            DataPoint::new(1000, "")
                .tag(CHUNKS_TAG, "2")
                .tag(SIZE_TAG, "10"),
            DataPoint::new(999, encode_base64(b"0123456789")),
        ];

        let err = assemble(&points).unwrap_err();
        assert!(matches!(err, SnapshotError::Invalid(ref msg) if msg.contains("empty")));
    }

    #[test]
    fn test_fragments_overflow_declared_size() {
        let points = vec![
            DataPoint::new(1000, encode_base64(b"01234"))
                .tag(CHUNKS_TAG, "2")
                .tag(SIZE_TAG, "8"),
            DataPoint::new(999, encode_base64(b"56789")),
        ];

        let err = assemble(&points).unwrap_err();
        assert!(matches!(err, SnapshotError::Invalid(ref msg) if msg.contains("overflows")));
    }

    #[test]
    fn test_master_larger_than_declared_size() {
        let points = vec![DataPoint::new(1000, encode_base64(b"0123456789"))
            .tag(CHUNKS_TAG, "1")
            .tag(SIZE_TAG, "4")];

        assert!(matches!(
            assemble(&points),
            Err(SnapshotError::Invalid(_))
        ));
    }

    #[test]
    fn test_fragments_undersize_declared_size() {
        let doc = sample_document();
        let mut points = fragmented_points(&doc, 3, 10_000);
        let declared: usize = points[0].tags[SIZE_TAG].parse().unwrap();
        points[0]
            .tags
            .insert(SIZE_TAG.to_string(), (declared + 16).to_string());

        let err = assemble(&points).unwrap_err();
        assert!(matches!(err, SnapshotError::Invalid(ref msg) if msg.contains("declared size")));
    }

    #[test]
    fn test_unreadable_tags() {
        let value = encode_base64(b"abc");

        let bad_chunks = DataPoint::new(1000, value.clone())
            .tag(CHUNKS_TAG, "many")
            .tag(SIZE_TAG, "3");
        assert!(matches!(
            assemble(&[bad_chunks]),
            Err(SnapshotError::Invalid(_))
        ));

        let no_size = DataPoint::new(1000, value.clone()).tag(CHUNKS_TAG, "1");
        assert!(matches!(
            assemble(&[no_size]),
            Err(SnapshotError::Invalid(_))
        ));

        let zero_chunks = DataPoint::new(1000, value)
            .tag(CHUNKS_TAG, "0")
            .tag(SIZE_TAG, "3");
        assert!(matches!(
            assemble(&[zero_chunks]),
            Err(SnapshotError::Invalid(_))
        ));
    }

    #[test]
    fn test_limits() {
        let assembler = Assembler::new(AssemblerLimits {
            max_chunks: 2,
            max_size_bytes: 1024,
        });
        let value = encode_base64(b"abc");

        let too_many = DataPoint::new(1000, value.clone())
            .tag(CHUNKS_TAG, "3")
            .tag(SIZE_TAG, "9");
        assert!(matches!(
            assembler.assemble(&[too_many]),
            Err(SnapshotError::Invalid(ref msg)) if msg.contains("limit")
        ));

        let too_big = DataPoint::new(1000, value)
            .tag(CHUNKS_TAG, "1")
            .tag(SIZE_TAG, "4096");
        assert!(matches!(
            assembler.assemble(&[too_big]),
            Err(SnapshotError::Invalid(ref msg)) if msg.contains("limit")
        ));
    }

    #[test]
    fn test_decode_failures() {
        let not_base64 = DataPoint::new(1000, "%%%");
        assert!(matches!(
            assemble(&[not_base64]),
            Err(SnapshotError::Decode(_))
        ));

        // Empty payload decompresses to "", which is not a document
        let empty = DataPoint::new(1000, "");
        assert!(matches!(assemble(&[empty]), Err(SnapshotError::Decode(_))));

        let not_gzip = DataPoint::new(1000, encode_base64(b"plain text"));
        assert!(matches!(
            assemble(&[not_gzip]),
            Err(SnapshotError::Decode(_))
        ));
    }

    #[test]
    fn test_malformed_document() {
        let compressed = crate::snapshot::compression::compress(r#"{"structure": {}}"#).unwrap();
        let point = DataPoint::new(1000, encode_base64(&compressed));

        assert!(matches!(assemble(&[point]), Err(SnapshotError::Decode(_))));
    }
}
