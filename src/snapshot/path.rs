//! Relative Path Parser
//!
//! Parses relative entity paths used as keys inside an inventory document.
//!
//! # Syntax
//!
//! ```text
//! path    := "" | segment ("/" segment)*
//! segment := kind ";" id
//! kind    := "r" | "rt" | "m" | "mt" | "ot" | "d"
//! ```
//!
//! Leading and trailing slashes are ignored, so `/r;eap/m;heap/` and
//! `r;eap/m;heap` name the same entity.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::char,
    combinator::{all_consuming, value},
    multi::separated_list1,
    sequence::separated_pair,
    IResult,
};
use std::fmt;
use std::str::FromStr;

/// Kind of entity a path segment addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    Resource,
    ResourceType,
    Metric,
    MetricType,
    OperationType,
    DataEntity,
}

impl SegmentKind {
    fn code(&self) -> &'static str {
        match self {
            SegmentKind::Resource => "r",
            SegmentKind::ResourceType => "rt",
            SegmentKind::Metric => "m",
            SegmentKind::MetricType => "mt",
            SegmentKind::OperationType => "ot",
            SegmentKind::DataEntity => "d",
        }
    }
}

/// One `kind;id` step of a relative path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathSegment {
    pub kind: SegmentKind,
    pub id: String,
}

/// Structural address of an entity relative to a document root
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct RelativePath {
    segments: Vec<PathSegment>,
}

/// Error returned for strings that are not relative paths
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid relative path: '{0}'")]
pub struct PathParseError(pub String);

impl RelativePath {
    /// The empty path, addressing the document root
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a path string
    pub fn parse(input: &str) -> Result<Self, PathParseError> {
        let trimmed = input.trim_matches('/');
        if trimmed.is_empty() {
            return Ok(Self::root());
        }

        match all_consuming(parse_segments)(trimmed) {
            Ok((_, segments)) => Ok(Self { segments }),
            Err(_) => Err(PathParseError(input.to_string())),
        }
    }

    /// Builder: append a segment
    pub fn push(mut self, kind: SegmentKind, id: impl Into<String>) -> Self {
        self.segments.push(PathSegment {
            kind,
            id: id.into(),
        });
        self
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// The last segment, i.e. the addressed entity
    pub fn leaf(&self) -> Option<&PathSegment> {
        self.segments.last()
    }
}

impl FromStr for RelativePath {
    type Err = PathParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "/")?;
            }
            write!(f, "{};{}", segment.kind.code(), segment.id)?;
        }
        Ok(())
    }
}

fn parse_segments(input: &str) -> IResult<&str, Vec<PathSegment>> {
    separated_list1(char('/'), parse_segment)(input)
}

fn parse_segment(input: &str) -> IResult<&str, PathSegment> {
    let (input, (kind, id)) = separated_pair(
        parse_kind,
        char(';'),
        take_while1(|c: char| c != '/'),
    )(input)?;

    Ok((
        input,
        PathSegment {
            kind,
            id: id.to_string(),
        },
    ))
}

/// Two-letter codes must be tried before their one-letter prefixes
fn parse_kind(input: &str) -> IResult<&str, SegmentKind> {
    alt((
        value(SegmentKind::ResourceType, tag("rt")),
        value(SegmentKind::MetricType, tag("mt")),
        value(SegmentKind::OperationType, tag("ot")),
        value(SegmentKind::Resource, tag("r")),
        value(SegmentKind::Metric, tag("m")),
        value(SegmentKind::DataEntity, tag("d")),
    ))(input)
}
