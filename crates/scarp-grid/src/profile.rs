//! 1-D profile grid with uniform spacing.

use crate::error::GridError;
use crate::grid::{apply_overrides, Grid, Neighbor};
use scarp_core::NodeStatus;
use smallvec::SmallVec;

/// A one-dimensional profile with uniform node spacing.
///
/// Nodes are indexed `0..size` left to right. Endpoint statuses are set
/// at construction; `Looped` endpoints must pair (both or neither), in
/// which case the profile is periodic and the two ends are neighbors at
/// one spacing's distance.
///
/// # Examples
///
/// ```
/// use scarp_core::NodeStatus;
/// use scarp_grid::{Grid, ProfileGrid};
///
/// let grid = ProfileGrid::new(
///     5,
///     100.0,
///     [NodeStatus::FixedValue, NodeStatus::Core],
///     &[],
/// )
/// .unwrap();
/// assert_eq!(grid.size(), 5);
/// assert_eq!(grid.neighbors(2).len(), 2);
/// assert_eq!(grid.neighbors(0).len(), 1);
/// assert_eq!(grid.area(2), 100.0);
/// ```
#[derive(Debug, Clone)]
pub struct ProfileGrid {
    shape: [usize; 1],
    spacing: f64,
    statuses: Vec<NodeStatus>,
    looped: bool,
}

impl ProfileGrid {
    /// Create a profile with `size` nodes at uniform `spacing`.
    ///
    /// `endpoints` sets the status of nodes `0` and `size - 1`; all other
    /// nodes start as [`NodeStatus::Core`]. `overrides` then replaces the
    /// status of individual nodes.
    pub fn new(
        size: usize,
        spacing: f64,
        endpoints: [NodeStatus; 2],
        overrides: &[(usize, NodeStatus)],
    ) -> Result<Self, GridError> {
        if size == 0 {
            return Err(GridError::EmptyGrid);
        }
        if !spacing.is_finite() || spacing <= 0.0 {
            return Err(GridError::InvalidSpacing { value: spacing });
        }

        let mut statuses = vec![NodeStatus::Core; size];
        statuses[0] = endpoints[0];
        statuses[size - 1] = endpoints[1];
        apply_overrides(&mut statuses, overrides)?;

        let left_looped = statuses[0] == NodeStatus::Looped;
        let right_looped = statuses[size - 1] == NodeStatus::Looped;
        if left_looped != right_looped {
            return Err(GridError::LoopedPairMismatch { axis: "x" });
        }
        for (i, status) in statuses.iter().enumerate() {
            if *status == NodeStatus::Looped && i != 0 && i != size - 1 {
                return Err(GridError::UnsupportedStatus {
                    status: NodeStatus::Looped,
                    reason: "looped status is only valid at profile endpoints",
                });
            }
        }

        Ok(Self {
            shape: [size],
            spacing,
            statuses,
            looped: left_looped,
        })
    }

    /// Create a profile spanning `length` with `size` nodes.
    ///
    /// Spacing is `length / (size - 1)`.
    pub fn from_length(
        size: usize,
        length: f64,
        endpoints: [NodeStatus; 2],
        overrides: &[(usize, NodeStatus)],
    ) -> Result<Self, GridError> {
        if size < 2 {
            return Err(GridError::EmptyGrid);
        }
        Self::new(size, length / (size - 1) as f64, endpoints, overrides)
    }

    /// Uniform node spacing.
    pub fn spacing(&self) -> f64 {
        self.spacing
    }
}

impl Grid for ProfileGrid {
    fn size(&self) -> usize {
        self.shape[0]
    }

    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn statuses(&self) -> &[NodeStatus] {
        &self.statuses
    }

    fn area(&self, _node: usize) -> f64 {
        self.spacing
    }

    fn neighbors(&self, node: usize) -> SmallVec<[Neighbor; 8]> {
        let size = self.shape[0];
        let mut result = SmallVec::new();
        if self.statuses[node].is_ghost() {
            return result;
        }

        let mut push = |index: usize| {
            if !self.statuses[index].is_ghost() {
                result.push(Neighbor {
                    index,
                    distance: self.spacing,
                    status: self.statuses[index],
                });
            }
        };

        if node > 0 {
            push(node - 1);
        } else if self.looped && size > 1 {
            push(size - 1);
        }
        if node + 1 < size {
            push(node + 1);
        } else if self.looped && size > 1 {
            push(0);
        }
        result
    }

    fn max_neighbor_count(&self) -> usize {
        2
    }
}
