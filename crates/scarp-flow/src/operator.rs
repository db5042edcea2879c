//! The [`FlowOperator`] trait and execution context.
//!
//! Flow operators are modular, stateless stages executed in sequence by
//! [`FlowGraph::update_routes`](crate::FlowGraph::update_routes). They
//! declare their capabilities (graph/elevation updates, expected and
//! produced flow direction) at registration, enabling pipeline
//! validation at construction.

use crate::error::OperatorError;
use crate::graph_impl::FlowGraphImpl;
use scarp_core::FlowDirection;
use scarp_grid::Grid;
use std::any::Any;

/// Execution context passed to each operator's `apply` method.
///
/// Bundles the mutable graph storage, the mutable working elevation, and
/// the read-only grid topology.
pub struct OperatorContext<'a> {
    graph: &'a mut FlowGraphImpl,
    elevation: &'a mut [f64],
    grid: &'a dyn Grid,
}

impl<'a> OperatorContext<'a> {
    /// Construct a context. Typically called by the flow graph, not by
    /// operators; tests build one directly around a bare impl.
    pub fn new(
        graph: &'a mut FlowGraphImpl,
        elevation: &'a mut [f64],
        grid: &'a dyn Grid,
    ) -> Self {
        Self {
            graph,
            elevation,
            grid,
        }
    }

    /// Mutable flow graph storage.
    pub fn graph(&mut self) -> &mut FlowGraphImpl {
        self.graph
    }

    /// The working (hydrologically corrected) elevation.
    pub fn elevation(&mut self) -> &mut [f64] {
        self.elevation
    }

    /// Read-only grid topology.
    pub fn grid(&self) -> &dyn Grid {
        self.grid
    }

    /// Split the context into its three parts for simultaneous borrows.
    pub fn parts(&mut self) -> (&mut FlowGraphImpl, &mut [f64], &dyn Grid) {
        (self.graph, self.elevation, self.grid)
    }
}

/// A modular stage in the flow route update sequence.
///
/// # Contract
///
/// - `apply()` MUST be deterministic: same graph, elevation, and grid
///   produce identical results.
/// - `&self`: operators are stateless; mutable state lives in the graph
///   and the working elevation.
/// - Capability flags are read once at pipeline construction, not per
///   step.
///
/// # Object safety
///
/// The trait is object-safe; the flow graph stores operators as
/// `Vec<Box<dyn FlowOperator>>`. Use `downcast_ref` on `dyn FlowOperator`
/// for opt-in specialization (the snapshot save path relies on it).
pub trait FlowOperator: Any + Send + Sync + 'static {
    /// Human-readable name for error reporting.
    fn name(&self) -> &str;

    /// Whether `apply` mutates the flow graph.
    fn graph_updated(&self) -> bool {
        false
    }

    /// Whether `apply` mutates the working elevation.
    fn elevation_updated(&self) -> bool {
        false
    }

    /// Flow direction kind expected on input (`Undefined` accepts any).
    fn in_flowdir(&self) -> FlowDirection {
        FlowDirection::Undefined
    }

    /// Flow direction kind produced (`Undefined` leaves it unchanged).
    fn out_flowdir(&self) -> FlowDirection {
        FlowDirection::Undefined
    }

    /// Execute the operator for one route update.
    fn apply(&self, ctx: &mut OperatorContext<'_>) -> Result<(), OperatorError>;
}

impl dyn FlowOperator {
    /// Attempt to downcast a trait object to a concrete operator type.
    pub fn downcast_ref<T: FlowOperator>(&self) -> Option<&T> {
        (self as &dyn Any).downcast_ref::<T>()
    }
}
