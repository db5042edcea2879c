//! Operator sequence validation.
//!
//! [`validate_operators`] runs once when a flow graph is built. It checks
//! the sequence for structural errors and returns the summary the flow
//! graph needs to pre-allocate its working buffers and snapshot stores.

use crate::error::PipelineError;
use crate::operator::FlowOperator;
use crate::snapshot::FlowSnapshot;
use scarp_core::FlowDirection;

/// Structural summary of a validated operator sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct PipelinePlan {
    /// Flow direction kind after the last operator.
    pub out_flowdir: FlowDirection,
    /// Whether any operator rewrites the working elevation.
    pub elevation_updated: bool,
    /// Whether any operator produces multiple flow (sizes the receiver
    /// storage fan-out).
    pub multi_capable: bool,
    /// Names of snapshots saving the graph, in sequence order.
    pub graph_snapshot_keys: Vec<String>,
    /// Names of snapshots saving the elevation, in sequence order.
    pub elevation_snapshot_keys: Vec<String>,
}

/// Validate an operator sequence.
///
/// Checks performed (all at construction, not per step):
///
/// 1. The sequence is non-empty.
/// 2. At least one operator updates the flow graph.
/// 3. Each operator's expected input flow direction matches the direction
///    produced by the preceding operators (`Undefined` accepts any).
/// 4. The final flow direction is defined.
/// 5. Snapshot names are unique.
pub fn validate_operators(
    operators: &[Box<dyn FlowOperator>],
) -> Result<PipelinePlan, PipelineError> {
    if operators.is_empty() {
        return Err(PipelineError::EmptyPipeline);
    }
    if !operators.iter().any(|op| op.graph_updated()) {
        return Err(PipelineError::NoGraphUpdate);
    }

    let mut current = FlowDirection::Undefined;
    let mut multi_capable = false;
    for op in operators {
        let expected = op.in_flowdir();
        if expected != FlowDirection::Undefined && expected != current {
            return Err(PipelineError::IncompatibleFlowDirections {
                operator: op.name().to_string(),
                expected,
                found: current,
            });
        }
        if op.out_flowdir() != FlowDirection::Undefined {
            current = op.out_flowdir();
        }
        if op.out_flowdir() == FlowDirection::Multi {
            multi_capable = true;
        }
    }
    if current == FlowDirection::Undefined {
        return Err(PipelineError::UndefinedOutputFlow);
    }

    let mut graph_snapshot_keys = Vec::new();
    let mut elevation_snapshot_keys = Vec::new();
    for op in operators {
        if let Some(snapshot) = op.downcast_ref::<FlowSnapshot>() {
            let name = snapshot.snapshot_name();
            if graph_snapshot_keys.iter().any(|k| k == name)
                || elevation_snapshot_keys.iter().any(|k| k == name)
            {
                return Err(PipelineError::DuplicateSnapshot {
                    name: name.to_string(),
                });
            }
            if snapshot.save_graph() {
                graph_snapshot_keys.push(name.to_string());
            }
            if snapshot.save_elevation() {
                elevation_snapshot_keys.push(name.to_string());
            }
        }
    }

    Ok(PipelinePlan {
        out_flowdir: current,
        elevation_updated: operators.iter().any(|op| op.elevation_updated()),
        multi_capable,
        graph_snapshot_keys,
        elevation_snapshot_keys,
    })
}
