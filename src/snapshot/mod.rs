//! Inventory snapshots
//!
//! This module turns the string series written by monitoring agents back
//! into inventory documents:
//!
//! - **types**: Core data structures (DataPoint, AssembledDocument, blueprints)
//! - **path**: Relative path parsing
//! - **compression**: Gzip + base64 payload codec
//! - **assembler**: Chunk set → document, with integrity checks
//! - **extractor**: Blueprint lookups inside a document
//! - **chunker**: Document → chunk set (producer side)
//! - **error**: Error types
//!
//! # Architecture
//!
//! ```text
//! Read Path:
//!   [DataPoint] (desc) → Verify chunks → Concatenate → Gunzip → JSON → AssembledDocument
//!
//! Write Path (agents, tests):
//!   AssembledDocument → JSON → Gzip → Split → Base64 → [DataPoint]
//! ```
//!
//! # Example
//!
//! ```rust
//! use strata::snapshot::*;
//!
//! let doc = AssembledDocument::new(MetricTypeBlueprint {
//!     id: "heap".to_string(),
//!     unit: MetricUnit::Bytes,
//!     ..Default::default()
//! });
//!
//! let points = split_snapshot(&doc, 1024, 1_700_000_000_000).unwrap();
//! let restored = assemble(&points).unwrap();
//!
//! assert_eq!(as_metric_type_blueprint(&restored).map(|mt| mt.id.as_str()), Some("heap"));
//! ```

pub mod assembler;
pub mod chunker;
pub mod compression;
pub mod error;
pub mod extractor;
pub mod path;
pub mod types;

// Re-export commonly used types
pub use assembler::{assemble, parse_document, Assembler, AssemblerLimits};
pub use chunker::{encode_document, split_payload, split_snapshot};
pub use compression::{compress, decode_base64, decompress, encode_base64};
pub use error::{SnapshotError, SnapshotResult};
pub use extractor::{as_metric_type_blueprint, metrics_for_type, resources_for_type};
pub use path::{PathParseError, PathSegment, RelativePath, SegmentKind};
pub use types::{
    AssembledDocument, DataPoint, EntityBlueprint, MetricBlueprint, MetricDataType,
    MetricTypeBlueprint, MetricUnit, ResourceBlueprint, ResourceTypeBlueprint, CHUNKS_TAG,
    SIZE_TAG,
};
