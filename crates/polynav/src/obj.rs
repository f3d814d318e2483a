//! Reading navmeshes from line-oriented `.obj`-style mesh files.
//!
//! Only two record types matter, every other line is ignored:
//!
//! - `v <x> <y2> <y>`: a vertex. With the default [`VertexPlane::XZ`](crate::VertexPlane::XZ)
//!   the 2D position is `(x, y)`, taken from the first and third field.
//! - `f <i1> <i2> ... <in>`: a face, as 1-based vertex references. A reference may be a
//!   compound `index/aux` token, of which only `index` is used.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::LoadConfig;
use crate::face::{FaceError, VertexId};
use crate::graph::GraphError;
use crate::math::Point;

/// Loading a navmesh failed. No partial navmesh is ever produced.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The mesh file could not be opened or read.
    #[error("failed to read mesh file {path}")]
    Io {
        /// The file that was being read.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },
    /// Reading from the source stream failed.
    #[error("failed to read mesh data")]
    Read(#[from] io::Error),
    /// A record could not be parsed.
    #[error("line {line}: {kind}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// What was wrong with the record.
        kind: ParseErrorKind,
    },
    /// A face record describes an invalid polygon.
    #[error("line {line}: invalid face")]
    InvalidFace {
        /// 1-based line number.
        line: usize,
        /// Why the face was rejected.
        #[source]
        source: FaceError,
    },
    /// Linking the graph failed, which means the geometry produced a non-finite distance.
    #[error("line {line}: failed to link face")]
    Graph {
        /// 1-based line number of the face being linked.
        line: usize,
        /// The underlying error.
        #[source]
        source: GraphError,
    },
}

/// What was wrong with a single record.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    /// A vertex record has fewer coordinates than the configured plane needs.
    #[error("vertex record needs {required} coordinates, found {found}")]
    MissingCoordinate {
        /// How many fields the plane reads.
        required: usize,
        /// How many fields the record had.
        found: usize,
    },
    /// A coordinate is not a finite number.
    #[error("invalid coordinate {0:?}")]
    InvalidCoordinate(String),
    /// Scaling and translating a vertex pushed it out of the representable range.
    #[error("vertex {raw} is not finite after scaling and translating")]
    TransformOverflow {
        /// The position as read from the record.
        raw: Point,
    },
    /// A face record lists no vertices at all.
    #[error("face record without vertex references")]
    EmptyFace,
    /// A face token is not a positive integer index.
    #[error("invalid vertex reference {0:?}")]
    InvalidIndex(String),
    /// A face references a vertex that has not been defined yet.
    #[error("vertex {index} referenced, but only {count} vertices are defined so far")]
    VertexOutOfRange {
        /// The 1-based index as written in the file.
        index: usize,
        /// How many vertices were defined before this line.
        count: usize,
    },
}

/// One parsed line.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Record {
    /// A vertex, already transformed by the [`LoadConfig`].
    Vertex(Point),
    /// A face ring.
    Face(Vec<VertexId>),
    /// Anything that is neither a vertex nor a face.
    Ignored,
}

/// Parses a single line. `vertex_count` is the number of vertices defined so far.
pub(crate) fn parse_record(
    line: &str,
    config: &LoadConfig,
    vertex_count: usize,
) -> Result<Record, ParseErrorKind> {
    let mut tokens = line.split_whitespace();
    match tokens.next() {
        Some("v") => parse_vertex(tokens, config).map(Record::Vertex),
        Some("f") => parse_face(tokens, vertex_count).map(Record::Face),
        _ => Ok(Record::Ignored),
    }
}

fn parse_vertex<'a>(
    tokens: impl Iterator<Item = &'a str>,
    config: &LoadConfig,
) -> Result<Point, ParseErrorKind> {
    let required = config.plane.required_fields();
    let fields = tokens
        .take(required)
        .map(|token| match token.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(ParseErrorKind::InvalidCoordinate(token.to_owned())),
        })
        .collect::<Result<Vec<_>, _>>()?;
    let raw = config
        .plane
        .project(&fields)
        .ok_or(ParseErrorKind::MissingCoordinate {
            required,
            found: fields.len(),
        })?;
    let point = config.transform(raw);
    if !point.is_finite() {
        return Err(ParseErrorKind::TransformOverflow { raw });
    }
    Ok(point)
}

fn parse_face<'a>(
    tokens: impl Iterator<Item = &'a str>,
    vertex_count: usize,
) -> Result<Vec<VertexId>, ParseErrorKind> {
    let ring = tokens
        .map(|token| {
            let index_part = token.split('/').next().unwrap_or_default();
            let index = index_part
                .parse::<usize>()
                .ok()
                .filter(|index| *index > 0)
                .ok_or_else(|| ParseErrorKind::InvalidIndex(token.to_owned()))?;
            if index > vertex_count {
                return Err(ParseErrorKind::VertexOutOfRange {
                    index,
                    count: vertex_count,
                });
            }
            u32::try_from(index - 1)
                .map(VertexId::new)
                .map_err(|_| ParseErrorKind::InvalidIndex(token.to_owned()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    if ring.is_empty() {
        return Err(ParseErrorKind::EmptyFace);
    }
    Ok(ring)
}
