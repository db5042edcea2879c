//! The core [`Grid`] trait and `dyn Grid` downcast support.

use scarp_core::NodeStatus;
use smallvec::SmallVec;
use std::any::Any;

/// One entry of a node's neighbor list.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Neighbor {
    /// Flat index of the neighboring node.
    pub index: usize,
    /// Geometric distance between the two node centers.
    ///
    /// Traversal through a `Looped` border wraps with the same distance
    /// as an interior step along that axis.
    pub distance: f64,
    /// Status of the neighboring node.
    pub status: NodeStatus,
}

/// Uniform topology/geometry interface over all spatial supports.
///
/// Flow routing, sink resolution, and the eroders consume grids
/// exclusively through this trait. Concrete backends
/// ([`ProfileGrid`](crate::ProfileGrid), [`RasterGrid`](crate::RasterGrid),
/// [`TriMesh`](crate::TriMesh)) implement it to define their topology.
///
/// Nodes are identified by flat indices in `[0, size())`; 2-D backends
/// flatten row-major.
///
/// # Object safety
///
/// The trait is designed for use as `dyn Grid`. Use `downcast_ref` for
/// opt-in specialization on a concrete backend.
///
/// # Thread safety
///
/// `Sync` is required because the flow graph and the eroders share the
/// grid read-only within a simulation step.
pub trait Grid: Any + Send + Sync + 'static {
    /// Total number of nodes.
    fn size(&self) -> usize;

    /// Dimension-specific shape; `size() == shape().iter().product()`.
    fn shape(&self) -> &[usize];

    /// Status of a single node.
    fn node_status(&self, node: usize) -> NodeStatus {
        self.statuses()[node]
    }

    /// All node statuses in flat order.
    fn statuses(&self) -> &[NodeStatus];

    /// Cell (or dual-vertex) area of a node.
    fn area(&self, node: usize) -> f64;

    /// Enumerate a node's neighbors in a deterministic, backend-defined
    /// order, stable across calls for a given grid instance.
    ///
    /// Ghost nodes never appear in any list and have no neighbors of
    /// their own. The `SmallVec<[Neighbor; 8]>` avoids heap allocation
    /// for the profile and raster stencils; trimesh vertices may spill.
    fn neighbors(&self, node: usize) -> SmallVec<[Neighbor; 8]>;

    /// Upper bound on the neighbor count of any node (`Kmax`).
    fn max_neighbor_count(&self) -> usize;
}

impl dyn Grid {
    /// Attempt to downcast a trait object to a concrete grid type.
    ///
    /// Code working with `&dyn Grid` can check for a known backend and
    /// use backend-specific fast paths.
    pub fn downcast_ref<T: Grid>(&self) -> Option<&T> {
        (self as &dyn Any).downcast_ref::<T>()
    }
}

/// Shared constructor-side helper: apply per-node status overrides onto a
/// freshly built status array.
pub(crate) fn apply_overrides(
    statuses: &mut [NodeStatus],
    overrides: &[(usize, NodeStatus)],
) -> Result<(), crate::GridError> {
    let size = statuses.len();
    for &(index, status) in overrides {
        if index >= size {
            return Err(crate::GridError::StatusIndexOutOfBounds { index, size });
        }
        statuses[index] = status;
    }
    Ok(())
}
