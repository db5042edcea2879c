//! Named snapshot operator.

use crate::error::OperatorError;
use crate::operator::{FlowOperator, OperatorContext};

/// Marks a point in the operator sequence where the current graph state
/// and/or working elevation is deep-copied into the keyed snapshot
/// stores of the owning [`FlowGraph`](crate::FlowGraph).
///
/// The copy itself is performed by the flow graph right after this
/// operator runs; `apply` is a no-op. Snapshots are immutable until the
/// next route update rewrites them.
#[derive(Debug, Clone)]
pub struct FlowSnapshot {
    name: String,
    save_graph: bool,
    save_elevation: bool,
}

impl FlowSnapshot {
    /// Snapshot saving the graph only (the common case).
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            save_graph: true,
            save_elevation: false,
        }
    }

    /// Select whether the graph state is saved.
    pub fn with_save_graph(mut self, save: bool) -> Self {
        self.save_graph = save;
        self
    }

    /// Select whether the working elevation is saved.
    pub fn with_save_elevation(mut self, save: bool) -> Self {
        self.save_elevation = save;
        self
    }

    /// The snapshot key.
    pub fn snapshot_name(&self) -> &str {
        &self.name
    }

    /// Whether the graph state is saved.
    pub fn save_graph(&self) -> bool {
        self.save_graph
    }

    /// Whether the working elevation is saved.
    pub fn save_elevation(&self) -> bool {
        self.save_elevation
    }
}

impl FlowOperator for FlowSnapshot {
    fn name(&self) -> &str {
        "flow_snapshot"
    }

    fn apply(&self, _ctx: &mut OperatorContext<'_>) -> Result<(), OperatorError> {
        Ok(())
    }
}
