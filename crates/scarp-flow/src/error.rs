//! Error types for the flow routing subsystem.
//!
//! Three enums, one per failure surface: [`PipelineError`] for operator
//! sequence validation at construction, [`OperatorError`] for individual
//! operator execution, and [`FlowError`] for the outer flow graph API.

use scarp_core::FlowDirection;
use std::error::Error;
use std::fmt;

/// Errors from validating an operator sequence at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// The operator sequence is empty.
    EmptyPipeline,
    /// No operator in the sequence updates the flow graph.
    NoGraphUpdate,
    /// No operator defines the output flow direction type.
    UndefinedOutputFlow,
    /// An operator's expected input flow direction does not match what
    /// the preceding operators produce.
    IncompatibleFlowDirections {
        /// Name of the rejecting operator.
        operator: String,
        /// The direction it expects on input.
        expected: FlowDirection,
        /// The direction produced so far.
        found: FlowDirection,
    },
    /// Two snapshot operators share the same name.
    DuplicateSnapshot {
        /// The repeated snapshot name.
        name: String,
    },
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPipeline => write!(f, "operator sequence is empty"),
            Self::NoGraphUpdate => {
                write!(f, "must have at least one operator that updates the flow graph")
            }
            Self::UndefinedOutputFlow => write!(
                f,
                "must have at least one operator that defines the output flow direction"
            ),
            Self::IncompatibleFlowDirections {
                operator,
                expected,
                found,
            } => write!(
                f,
                "operator '{operator}' expects {expected} flow on input, got {found}"
            ),
            Self::DuplicateSnapshot { name } => {
                write!(f, "duplicate snapshot name '{name}'")
            }
        }
    }
}

impl Error for PipelineError {}

/// Errors from individual flow operator execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorError {
    /// The basin graph has no basin draining to a base level; nothing
    /// can be resolved.
    NoOutlet,
    /// The operator requires a single-flow graph on input.
    SingleFlowRequired,
    /// The operator's apply function failed.
    ExecutionFailed {
        /// Human-readable description of the failure.
        reason: String,
    },
}

impl fmt::Display for OperatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoOutlet => write!(f, "no basin drains to a base level"),
            Self::SingleFlowRequired => write!(f, "single-flow graph required"),
            Self::ExecutionFailed { reason } => write!(f, "execution failed: {reason}"),
        }
    }
}

impl Error for OperatorError {}

/// Errors from the outer flow graph API during a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowError {
    /// An input array does not match the grid size.
    ShapeMismatch {
        /// Expected number of nodes.
        expected: usize,
        /// Length of the offending input.
        actual: usize,
    },
    /// A derived quantity (order, basins) was requested before the
    /// receivers were populated.
    GraphNotComputed,
    /// Basin computation or an operator requires single flow.
    SingleFlowRequired,
    /// An operator returned an error during `update_routes`.
    OperatorFailed {
        /// Name of the failing operator.
        name: String,
        /// The underlying operator error.
        reason: OperatorError,
    },
}

impl fmt::Display for FlowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShapeMismatch { expected, actual } => {
                write!(f, "array length {actual} does not match grid size {expected}")
            }
            Self::GraphNotComputed => {
                write!(f, "flow graph receivers have not been computed yet")
            }
            Self::SingleFlowRequired => write!(f, "single-flow graph required"),
            Self::OperatorFailed { name, reason } => {
                write!(f, "operator '{name}' failed: {reason}")
            }
        }
    }
}

impl Error for FlowError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::OperatorFailed { reason, .. } => Some(reason),
            _ => None,
        }
    }
}
