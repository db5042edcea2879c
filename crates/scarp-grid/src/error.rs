//! Error types for grid construction and queries.

use scarp_core::NodeStatus;
use std::fmt;

/// Errors arising from grid construction.
///
/// All variants are construction-time: once a grid exists, its topology,
/// geometry, and statuses are valid and immutable.
#[derive(Debug, Clone, PartialEq)]
pub enum GridError {
    /// Attempted to construct a grid with zero nodes.
    EmptyGrid,
    /// A spacing or length value is not finite and positive.
    InvalidSpacing {
        /// The offending value.
        value: f64,
    },
    /// A `Looped` border is paired against a non-`Looped` opposite border.
    LoopedPairMismatch {
        /// Name of the axis with the broken pairing ("x" or "y").
        axis: &'static str,
    },
    /// A per-node status override targets a node outside `[0, size)`.
    StatusIndexOutOfBounds {
        /// The offending node index.
        index: usize,
        /// Number of nodes in the grid.
        size: usize,
    },
    /// A status is not supported at this position on this grid kind.
    UnsupportedStatus {
        /// The rejected status.
        status: NodeStatus,
        /// What made it invalid here.
        reason: &'static str,
    },
    /// A triangle references a vertex outside `[0, n_points)`.
    TriangleIndexOutOfBounds {
        /// Index of the offending triangle.
        triangle: usize,
        /// The out-of-bounds vertex index.
        vertex: usize,
    },
    /// A mesh vertex is referenced by no triangle.
    DisconnectedVertex {
        /// The isolated vertex index.
        vertex: usize,
    },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyGrid => write!(f, "grid must have at least one node"),
            Self::InvalidSpacing { value } => {
                write!(f, "spacing must be finite and positive, got {value}")
            }
            Self::LoopedPairMismatch { axis } => {
                write!(
                    f,
                    "looped border on axis {axis} must be paired with a looped opposite border"
                )
            }
            Self::StatusIndexOutOfBounds { index, size } => {
                write!(f, "status override index {index} out of bounds [0, {size})")
            }
            Self::UnsupportedStatus { status, reason } => {
                write!(f, "unsupported node status {status}: {reason}")
            }
            Self::TriangleIndexOutOfBounds { triangle, vertex } => {
                write!(f, "triangle {triangle} references out-of-bounds vertex {vertex}")
            }
            Self::DisconnectedVertex { vertex } => {
                write!(f, "vertex {vertex} is referenced by no triangle")
            }
        }
    }
}

impl std::error::Error for GridError {}
