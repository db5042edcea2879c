//! Error types for the eroders.

use std::fmt;

/// Errors from eroder construction or per-step execution.
///
/// Numerical non-convergence of the stream-power Newton iteration is
/// deliberately NOT an error: it is logged as a warning and counted, and
/// the best estimate is kept.
#[derive(Debug, Clone, PartialEq)]
pub enum EroderError {
    /// An input array does not match the grid size.
    ShapeMismatch {
        /// Expected number of nodes.
        expected: usize,
        /// Length of the offending input.
        actual: usize,
    },
    /// A per-node erodibility array has the wrong length.
    KCoefLength {
        /// Expected number of nodes.
        expected: usize,
        /// Length of the given array.
        actual: usize,
    },
    /// A constructor or step parameter is out of its valid range.
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },
    /// The flow graph routes have not been computed yet.
    GraphNotComputed,
}

impl fmt::Display for EroderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShapeMismatch { expected, actual } => {
                write!(f, "array length {actual} does not match grid size {expected}")
            }
            Self::KCoefLength { expected, actual } => {
                write!(f, "per-node k_coef length {actual}, expected {expected}")
            }
            Self::InvalidParameter { name, value } => {
                write!(f, "invalid parameter {name} = {value}")
            }
            Self::GraphNotComputed => {
                write!(f, "flow graph routes have not been computed yet")
            }
        }
    }
}

impl std::error::Error for EroderError {}
