//! 2-D raster grid with rook/queen connectivity and per-border statuses.

use crate::error::GridError;
use crate::grid::{apply_overrides, Grid, Neighbor};
use scarp_core::NodeStatus;
use smallvec::SmallVec;

/// Raster neighborhood stencil.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Connectivity {
    /// 8-connected: cardinal plus diagonal moves.
    #[default]
    Queen,
    /// 4-connected: cardinal moves only.
    Rook,
}

/// Status of the four raster borders.
///
/// A `Looped` border must be paired with a `Looped` opposite border,
/// making the grid periodic along that axis. Corner nodes take the
/// highest-precedence status of the two borders they lie on
/// (`FixedValue` > `FixedGradient` > `Looped` > `Core`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BorderStatus {
    /// First column.
    pub left: NodeStatus,
    /// Last column.
    pub right: NodeStatus,
    /// First row.
    pub top: NodeStatus,
    /// Last row.
    pub bottom: NodeStatus,
}

impl BorderStatus {
    /// All four borders share one status.
    pub fn uniform(status: NodeStatus) -> Self {
        Self {
            left: status,
            right: status,
            top: status,
            bottom: status,
        }
    }
}

/// Queen-move offsets in row-major window order.
const QUEEN_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Rook-move offsets in row-major window order.
const ROOK_OFFSETS: [(isize, isize); 4] = [(-1, 0), (0, -1), (0, 1), (1, 0)];

fn status_precedence(status: NodeStatus) -> u8 {
    match status {
        NodeStatus::Core => 0,
        NodeStatus::Looped => 1,
        NodeStatus::FixedGradient => 2,
        NodeStatus::FixedValue => 3,
        NodeStatus::Ghost => 4,
    }
}

/// A two-dimensional raster grid, flattened row-major.
///
/// # Examples
///
/// ```
/// use scarp_core::NodeStatus;
/// use scarp_grid::{BorderStatus, Connectivity, Grid, RasterGrid};
///
/// let grid = RasterGrid::new(
///     [3, 4],
///     [100.0, 200.0],
///     BorderStatus::uniform(NodeStatus::FixedValue),
///     Connectivity::Queen,
///     &[],
/// )
/// .unwrap();
/// assert_eq!(grid.size(), 12);
/// assert_eq!(grid.shape(), &[3, 4]);
/// // Interior node sees the full queen stencil.
/// assert_eq!(grid.neighbors(grid.node_index(1, 1)).len(), 8);
/// assert_eq!(grid.area(0), 100.0 * 200.0);
/// ```
#[derive(Debug, Clone)]
pub struct RasterGrid {
    shape: [usize; 2],
    spacing: [f64; 2],
    connectivity: Connectivity,
    statuses: Vec<NodeStatus>,
    looped_y: bool,
    looped_x: bool,
}

impl RasterGrid {
    /// Create a raster of `shape = [rows, cols]` nodes with
    /// `spacing = [dy, dx]`.
    pub fn new(
        shape: [usize; 2],
        spacing: [f64; 2],
        borders: BorderStatus,
        connectivity: Connectivity,
        overrides: &[(usize, NodeStatus)],
    ) -> Result<Self, GridError> {
        let [rows, cols] = shape;
        if rows == 0 || cols == 0 {
            return Err(GridError::EmptyGrid);
        }
        for &value in &spacing {
            if !value.is_finite() || value <= 0.0 {
                return Err(GridError::InvalidSpacing { value });
            }
        }

        let looped_y = borders.top == NodeStatus::Looped;
        if looped_y != (borders.bottom == NodeStatus::Looped) {
            return Err(GridError::LoopedPairMismatch { axis: "y" });
        }
        let looped_x = borders.left == NodeStatus::Looped;
        if looped_x != (borders.right == NodeStatus::Looped) {
            return Err(GridError::LoopedPairMismatch { axis: "x" });
        }
        if borders.top == NodeStatus::Ghost
            || borders.bottom == NodeStatus::Ghost
            || borders.left == NodeStatus::Ghost
            || borders.right == NodeStatus::Ghost
        {
            return Err(GridError::UnsupportedStatus {
                status: NodeStatus::Ghost,
                reason: "ghost is a per-node override, not a border status",
            });
        }

        let mut statuses = vec![NodeStatus::Core; rows * cols];
        let mut raise = |index: usize, status: NodeStatus| {
            if status_precedence(status) > status_precedence(statuses[index]) {
                statuses[index] = status;
            }
        };
        for c in 0..cols {
            raise(c, borders.top);
            raise((rows - 1) * cols + c, borders.bottom);
        }
        for r in 0..rows {
            raise(r * cols, borders.left);
            raise(r * cols + cols - 1, borders.right);
        }
        apply_overrides(&mut statuses, overrides)?;

        for &(index, status) in overrides {
            if status == NodeStatus::Looped {
                let r = index / cols;
                let c = index % cols;
                let on_looped_border = (looped_y && (r == 0 || r == rows - 1))
                    || (looped_x && (c == 0 || c == cols - 1));
                if !on_looped_border {
                    return Err(GridError::UnsupportedStatus {
                        status: NodeStatus::Looped,
                        reason: "looped status is only valid on a looped border",
                    });
                }
            }
        }

        Ok(Self {
            shape,
            spacing,
            connectivity,
            statuses,
            looped_y,
            looped_x,
        })
    }

    /// Create a raster spanning `length = [ly, lx]`.
    ///
    /// Spacing along each axis is `length / (shape - 1)`.
    pub fn from_length(
        shape: [usize; 2],
        length: [f64; 2],
        borders: BorderStatus,
        connectivity: Connectivity,
        overrides: &[(usize, NodeStatus)],
    ) -> Result<Self, GridError> {
        if shape[0] < 2 || shape[1] < 2 {
            return Err(GridError::EmptyGrid);
        }
        let spacing = [
            length[0] / (shape[0] - 1) as f64,
            length[1] / (shape[1] - 1) as f64,
        ];
        Self::new(shape, spacing, borders, connectivity, overrides)
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.shape[0]
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.shape[1]
    }

    /// `[dy, dx]` node spacing.
    pub fn spacing(&self) -> [f64; 2] {
        self.spacing
    }

    /// Whether the grid is periodic along the row (y) axis.
    pub fn looped_y(&self) -> bool {
        self.looped_y
    }

    /// Whether the grid is periodic along the column (x) axis.
    pub fn looped_x(&self) -> bool {
        self.looped_x
    }

    /// Flat index of the node at `(row, col)`.
    pub fn node_index(&self, row: usize, col: usize) -> usize {
        row * self.shape[1] + col
    }

    fn offsets(&self) -> &'static [(isize, isize)] {
        match self.connectivity {
            Connectivity::Queen => &QUEEN_OFFSETS,
            Connectivity::Rook => &ROOK_OFFSETS,
        }
    }

    /// Resolve one axis step, wrapping on a looped axis.
    fn resolve_axis(pos: isize, extent: usize, looped: bool) -> Option<usize> {
        let n = extent as isize;
        if pos >= 0 && pos < n {
            Some(pos as usize)
        } else if looped {
            Some(pos.rem_euclid(n) as usize)
        } else {
            None
        }
    }
}

impl Grid for RasterGrid {
    fn size(&self) -> usize {
        self.shape[0] * self.shape[1]
    }

    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn statuses(&self) -> &[NodeStatus] {
        &self.statuses
    }

    fn area(&self, _node: usize) -> f64 {
        self.spacing[0] * self.spacing[1]
    }

    fn neighbors(&self, node: usize) -> SmallVec<[Neighbor; 8]> {
        let [rows, cols] = self.shape;
        let [dy, dx] = self.spacing;
        let diagonal = (dy * dy + dx * dx).sqrt();
        let mut result = SmallVec::new();
        if self.statuses[node].is_ghost() {
            return result;
        }

        let r = (node / cols) as isize;
        let c = (node % cols) as isize;
        for &(dr, dc) in self.offsets() {
            let Some(nr) = Self::resolve_axis(r + dr, rows, self.looped_y) else {
                continue;
            };
            let Some(nc) = Self::resolve_axis(c + dc, cols, self.looped_x) else {
                continue;
            };
            let index = nr * cols + nc;
            if index == node || self.statuses[index].is_ghost() {
                continue;
            }
            let distance = match (dr, dc) {
                (0, _) => dx,
                (_, 0) => dy,
                _ => diagonal,
            };
            result.push(Neighbor {
                index,
                distance,
                status: self.statuses[index],
            });
        }
        result
    }

    fn max_neighbor_count(&self) -> usize {
        match self.connectivity {
            Connectivity::Queen => 8,
            Connectivity::Rook => 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compliance;

    fn open_borders() -> BorderStatus {
        BorderStatus::uniform(NodeStatus::FixedValue)
    }

    #[test]
    fn interior_queen_stencil_and_distances() {
        let grid = RasterGrid::new(
            [3, 3],
            [3.0, 4.0],
            open_borders(),
            Connectivity::Queen,
            &[],
        )
        .unwrap();
        let n = grid.neighbors(grid.node_index(1, 1));
        assert_eq!(n.len(), 8);
        // Row-major window order: NW, N, NE, W, E, SW, S, SE.
        assert_eq!(n[1].index, grid.node_index(0, 1));
        assert_eq!(n[1].distance, 3.0);
        assert_eq!(n[3].distance, 4.0);
        assert_eq!(n[0].distance, 5.0);
    }

    #[test]
    fn rook_stencil_has_four_neighbors() {
        let grid = RasterGrid::new(
            [3, 3],
            [1.0, 1.0],
            open_borders(),
            Connectivity::Rook,
            &[],
        )
        .unwrap();
        assert_eq!(grid.neighbors(grid.node_index(1, 1)).len(), 4);
        assert_eq!(grid.max_neighbor_count(), 4);
    }

    #[test]
    fn corner_without_wrap_has_three_neighbors() {
        let grid = RasterGrid::new(
            [3, 3],
            [1.0, 1.0],
            open_borders(),
            Connectivity::Queen,
            &[],
        )
        .unwrap();
        assert_eq!(grid.neighbors(0).len(), 3);
    }

    #[test]
    fn looped_rows_wrap_with_interior_distance() {
        let borders = BorderStatus {
            left: NodeStatus::FixedValue,
            right: NodeStatus::Core,
            top: NodeStatus::Looped,
            bottom: NodeStatus::Looped,
        };
        let grid =
            RasterGrid::new([4, 5], [2.0, 3.0], borders, Connectivity::Queen, &[]).unwrap();
        let n = grid.neighbors(grid.node_index(0, 2));
        // Wraps to the last row.
        assert!(n.iter().any(|nb| nb.index == grid.node_index(3, 2)
            && nb.distance == 2.0));
        assert_eq!(n.len(), 8);
    }

    #[test]
    fn looped_corner_takes_fixed_value_precedence() {
        let borders = BorderStatus {
            left: NodeStatus::FixedValue,
            right: NodeStatus::Core,
            top: NodeStatus::Looped,
            bottom: NodeStatus::Looped,
        };
        let grid =
            RasterGrid::new([4, 5], [1.0, 1.0], borders, Connectivity::Queen, &[]).unwrap();
        assert_eq!(grid.node_status(grid.node_index(0, 0)), NodeStatus::FixedValue);
        assert_eq!(grid.node_status(grid.node_index(0, 2)), NodeStatus::Looped);
    }

    #[test]
    fn unpaired_looped_border_rejected() {
        let borders = BorderStatus {
            left: NodeStatus::Core,
            right: NodeStatus::Core,
            top: NodeStatus::Looped,
            bottom: NodeStatus::Core,
        };
        let err = RasterGrid::new([3, 3], [1.0, 1.0], borders, Connectivity::Queen, &[]);
        assert!(matches!(err, Err(GridError::LoopedPairMismatch { axis: "y" })));
    }

    #[test]
    fn ghost_override_is_isolated() {
        let center = 4;
        let grid = RasterGrid::new(
            [3, 3],
            [1.0, 1.0],
            open_borders(),
            Connectivity::Queen,
            &[(center, NodeStatus::Ghost)],
        )
        .unwrap();
        assert!(grid.neighbors(center).is_empty());
        for node in 0..grid.size() {
            assert!(
                grid.neighbors(node).iter().all(|n| n.index != center),
                "ghost node leaked into neighbors of {node}"
            );
        }
    }

    #[test]
    fn from_length_matches_expected_spacing() {
        let grid = RasterGrid::from_length(
            [101, 201],
            [1e4, 2e4],
            open_borders(),
            Connectivity::Queen,
            &[],
        )
        .unwrap();
        assert_eq!(grid.spacing(), [100.0, 100.0]);
    }

    #[test]
    fn compliance_open() {
        let grid = RasterGrid::new(
            [6, 7],
            [2.0, 3.0],
            open_borders(),
            Connectivity::Queen,
            &[],
        )
        .unwrap();
        compliance::run_full_compliance(&grid);
    }

    #[test]
    fn compliance_periodic_both_axes() {
        let borders = BorderStatus::uniform(NodeStatus::Looped);
        let grid =
            RasterGrid::new([6, 7], [2.0, 3.0], borders, Connectivity::Queen, &[]).unwrap();
        compliance::run_full_compliance(&grid);
    }

    #[test]
    fn compliance_rook() {
        let grid = RasterGrid::new(
            [6, 7],
            [2.0, 3.0],
            open_borders(),
            Connectivity::Rook,
            &[],
        )
        .unwrap();
        compliance::run_full_compliance(&grid);
    }

    // ── Property tests ──────────────────────────────────────────

    use proptest::prelude::*;

    fn arb_connectivity() -> impl Strategy<Value = Connectivity> {
        prop_oneof![Just(Connectivity::Queen), Just(Connectivity::Rook)]
    }

    fn arb_borders() -> impl Strategy<Value = BorderStatus> {
        prop_oneof![
            Just(BorderStatus::uniform(NodeStatus::FixedValue)),
            Just(BorderStatus::uniform(NodeStatus::FixedGradient)),
            Just(BorderStatus::uniform(NodeStatus::Looped)),
            Just(BorderStatus {
                left: NodeStatus::FixedValue,
                right: NodeStatus::Core,
                top: NodeStatus::Looped,
                bottom: NodeStatus::Looped,
            }),
        ]
    }

    proptest! {
        #[test]
        fn neighbors_always_symmetric(
            rows in 3usize..10,
            cols in 3usize..10,
            connectivity in arb_connectivity(),
            borders in arb_borders(),
        ) {
            let grid =
                RasterGrid::new([rows, cols], [2.0, 3.0], borders, connectivity, &[])
                    .unwrap();
            for node in 0..grid.size() {
                for n in grid.neighbors(node) {
                    let back = grid.neighbors(n.index);
                    prop_assert!(
                        back.iter().any(|m| m.index == node
                            && (m.distance - n.distance).abs() < 1e-12),
                        "asymmetry between {} and {}",
                        node,
                        n.index
                    );
                }
            }
        }

        #[test]
        fn neighbor_count_within_stencil_bound(
            rows in 3usize..10,
            cols in 3usize..10,
            connectivity in arb_connectivity(),
            borders in arb_borders(),
        ) {
            let grid =
                RasterGrid::new([rows, cols], [1.0, 1.0], borders, connectivity, &[])
                    .unwrap();
            for node in 0..grid.size() {
                prop_assert!(grid.neighbors(node).len() <= grid.max_neighbor_count());
            }
        }
    }
}
