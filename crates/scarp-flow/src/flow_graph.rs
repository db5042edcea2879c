//! The outer flow graph handle.

use crate::error::{FlowError, PipelineError};
use crate::graph_impl::FlowGraphImpl;
use crate::operator::{FlowOperator, OperatorContext};
use crate::pipeline::{validate_operators, PipelinePlan};
use crate::snapshot::FlowSnapshot;
use indexmap::IndexMap;
use scarp_core::FlowDirection;
use scarp_grid::Grid;
use std::sync::Arc;

/// Computes and stores flow routes on a topographic surface.
///
/// A `FlowGraph` ties together a shared read-only [`Grid`], the
/// receiver/donor storage ([`FlowGraphImpl`]), an ordered operator
/// sequence validated at construction, and keyed snapshot stores.
///
/// Per simulation step, [`update_routes`](Self::update_routes) applies
/// the operators in insertion order against the working elevation and
/// returns the hydrologically corrected surface.
///
/// # Examples
///
/// ```
/// use scarp_core::NodeStatus;
/// use scarp_flow::{FlowGraph, MstSinkResolver, SingleFlowRouter};
/// use scarp_grid::ProfileGrid;
/// use std::sync::Arc;
///
/// let grid = ProfileGrid::new(
///     5,
///     100.0,
///     [NodeStatus::FixedValue, NodeStatus::Core],
///     &[],
/// )
/// .unwrap();
/// let mut flow = FlowGraph::new(
///     Arc::new(grid),
///     vec![
///         Box::new(SingleFlowRouter::new()),
///         Box::new(MstSinkResolver::default()),
///     ],
/// )
/// .unwrap();
///
/// let elevation: Vec<f64> = vec![0.0, 1.0, 2.0, 3.0, 4.0];
/// flow.update_routes(&elevation).unwrap();
/// let drainage = flow.accumulate_scalar(1.0).unwrap();
/// // The base level drains the whole profile (5 nodes x 100 spacing).
/// assert_eq!(drainage[0], 500.0);
/// ```
pub struct FlowGraph {
    grid: Arc<dyn Grid>,
    graph: FlowGraphImpl,
    operators: Vec<Box<dyn FlowOperator>>,
    plan: PipelinePlan,
    work_elevation: Vec<f64>,
    graph_snapshots: IndexMap<String, FlowGraphImpl>,
    elevation_snapshots: IndexMap<String, Vec<f64>>,
}

impl FlowGraph {
    /// Build a flow graph over `grid` with the given operator sequence.
    ///
    /// The sequence is validated here (see
    /// [`PipelineError`]); snapshot stores are pre-allocated for every
    /// [`FlowSnapshot`] operator.
    pub fn new(
        grid: Arc<dyn Grid>,
        operators: Vec<Box<dyn FlowOperator>>,
    ) -> Result<Self, PipelineError> {
        let plan = validate_operators(&operators)?;
        let graph = FlowGraphImpl::new(grid.as_ref(), plan.multi_capable);
        let size = grid.size();

        let mut graph_snapshots = IndexMap::new();
        for key in &plan.graph_snapshot_keys {
            graph_snapshots.insert(key.clone(), graph.clone());
        }
        let mut elevation_snapshots = IndexMap::new();
        for key in &plan.elevation_snapshot_keys {
            elevation_snapshots.insert(key.clone(), vec![0.0; size]);
        }

        Ok(Self {
            grid,
            graph,
            operators,
            plan,
            work_elevation: vec![0.0; size],
            graph_snapshots,
            elevation_snapshots,
        })
    }

    /// The grid this graph routes over.
    pub fn grid(&self) -> &Arc<dyn Grid> {
        &self.grid
    }

    /// Number of nodes.
    pub fn size(&self) -> usize {
        self.graph.size()
    }

    /// Grid shape, for building output arrays.
    pub fn grid_shape(&self) -> &[usize] {
        self.grid.shape()
    }

    /// Flow direction kind produced by the operator sequence.
    pub fn out_flowdir(&self) -> FlowDirection {
        self.plan.out_flowdir
    }

    /// Read access to the receiver/donor storage.
    pub fn graph_impl(&self) -> &FlowGraphImpl {
        &self.graph
    }

    /// Replace the base-level node set derived from the grid statuses.
    pub fn set_base_levels(&mut self, nodes: &[usize]) {
        self.graph.set_base_levels(nodes);
    }

    /// Apply the operator sequence to `elevation`.
    ///
    /// Operators run in insertion order; writes by one operator are
    /// visible to the next. Returns the final working elevation (equal
    /// to the input where no operator rewrote it). On error the graph
    /// reflects the operators applied before the failure; callers must
    /// not rely on partial updates.
    pub fn update_routes(&mut self, elevation: &[f64]) -> Result<&[f64], FlowError> {
        if elevation.len() != self.graph.size() {
            return Err(FlowError::ShapeMismatch {
                expected: self.graph.size(),
                actual: elevation.len(),
            });
        }
        self.work_elevation.copy_from_slice(elevation);

        for i in 0..self.operators.len() {
            let op = &self.operators[i];
            let mut ctx = OperatorContext::new(
                &mut self.graph,
                &mut self.work_elevation,
                self.grid.as_ref(),
            );
            op.apply(&mut ctx).map_err(|reason| FlowError::OperatorFailed {
                name: op.name().to_string(),
                reason,
            })?;

            if let Some(snapshot) = op.downcast_ref::<FlowSnapshot>() {
                let key = snapshot.snapshot_name();
                if snapshot.save_graph() {
                    self.graph_snapshots
                        .insert(key.to_string(), self.graph.clone());
                }
                if snapshot.save_elevation() {
                    self.elevation_snapshots
                        .insert(key.to_string(), self.work_elevation.clone());
                }
            }
        }
        Ok(&self.work_elevation)
    }

    /// Dense basin ids for the current receiver graph.
    ///
    /// Computed on first access after a route update.
    pub fn basins(&mut self) -> Result<&[usize], FlowError> {
        if !self.graph.basins_valid() {
            self.graph.compute_basins()?;
        }
        self.graph.basins()
    }

    /// See [`FlowGraphImpl::accumulate`].
    pub fn accumulate(&self, src: &[f64]) -> Result<Vec<f64>, FlowError> {
        self.graph.accumulate(src)
    }

    /// See [`FlowGraphImpl::accumulate_scalar`].
    pub fn accumulate_scalar(&self, src: f64) -> Result<Vec<f64>, FlowError> {
        self.graph.accumulate_scalar(src)
    }

    /// See [`FlowGraphImpl::accumulate_into`].
    pub fn accumulate_into(&self, acc: &mut [f64], src: &[f64]) -> Result<(), FlowError> {
        self.graph.accumulate_into(acc, src)
    }

    /// See [`FlowGraphImpl::accumulate_scalar_into`].
    pub fn accumulate_scalar_into(&self, acc: &mut [f64], src: f64) -> Result<(), FlowError> {
        self.graph.accumulate_scalar_into(acc, src)
    }

    /// Read-only view of a named graph snapshot.
    pub fn graph_snapshot(&self, name: &str) -> Option<&FlowGraphImpl> {
        self.graph_snapshots.get(name)
    }

    /// Read-only view of a named elevation snapshot.
    pub fn elevation_snapshot(&self, name: &str) -> Option<&[f64]> {
        self.elevation_snapshots.get(name).map(Vec::as_slice)
    }

    /// Names of the graph snapshots, in operator order.
    pub fn graph_snapshot_keys(&self) -> impl Iterator<Item = &str> {
        self.graph_snapshots.keys().map(String::as_str)
    }

    /// Names of the elevation snapshots, in operator order.
    pub fn elevation_snapshot_keys(&self) -> impl Iterator<Item = &str> {
        self.elevation_snapshots.keys().map(String::as_str)
    }
}
