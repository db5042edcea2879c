//! Grid trait compliance test helpers.
//!
//! These functions verify that a [`Grid`] backend satisfies the trait
//! contract. Reused across all backend test modules (ProfileGrid,
//! RasterGrid, TriMesh).

use crate::grid::Grid;

/// Assert `shape().iter().product() == size()` and status array length.
pub fn assert_shape_consistent(grid: &dyn Grid) {
    let product: usize = grid.shape().iter().product();
    assert_eq!(product, grid.size(), "shape product != size");
    assert_eq!(grid.statuses().len(), grid.size(), "statuses length != size");
}

/// Assert every neighbor index is in bounds and within the `Kmax` bound.
pub fn assert_neighbors_in_bounds(grid: &dyn Grid) {
    for node in 0..grid.size() {
        let neighbors = grid.neighbors(node);
        assert!(
            neighbors.len() <= grid.max_neighbor_count(),
            "node {node} has {} neighbors, Kmax is {}",
            neighbors.len(),
            grid.max_neighbor_count()
        );
        for n in &neighbors {
            assert!(n.index < grid.size(), "neighbor {} out of bounds", n.index);
            assert_ne!(n.index, node, "node {node} is its own neighbor");
        }
    }
}

/// Assert `j in neighbors(i)` implies `i in neighbors(j)` at the same
/// distance.
pub fn assert_neighbors_symmetric(grid: &dyn Grid) {
    for node in 0..grid.size() {
        for n in grid.neighbors(node) {
            let back = grid.neighbors(n.index);
            let found = back
                .iter()
                .find(|m| m.index == node)
                .unwrap_or_else(|| panic!("{} in N({node}) but not vice versa", n.index));
            assert!(
                (found.distance - n.distance).abs() < 1e-12,
                "asymmetric distance between {node} and {}",
                n.index
            );
        }
    }
}

/// Assert neighbor distances are finite and strictly positive.
pub fn assert_distances_positive(grid: &dyn Grid) {
    for node in 0..grid.size() {
        for n in grid.neighbors(node) {
            assert!(
                n.distance.is_finite() && n.distance > 0.0,
                "distance {} between {node} and {}",
                n.distance,
                n.index
            );
        }
    }
}

/// Assert areas are finite and strictly positive for non-ghost nodes.
pub fn assert_areas_positive(grid: &dyn Grid) {
    for node in 0..grid.size() {
        if grid.node_status(node).is_ghost() {
            continue;
        }
        let area = grid.area(node);
        assert!(
            area.is_finite() && area > 0.0,
            "area {area} at node {node}"
        );
    }
}

/// Assert reported neighbor statuses match the status array.
pub fn assert_neighbor_statuses_match(grid: &dyn Grid) {
    for node in 0..grid.size() {
        for n in grid.neighbors(node) {
            assert_eq!(
                n.status,
                grid.node_status(n.index),
                "stale status for neighbor {} of {node}",
                n.index
            );
        }
    }
}

/// Assert ghost nodes have no neighbors and appear in no list.
pub fn assert_ghosts_isolated(grid: &dyn Grid) {
    for node in 0..grid.size() {
        if grid.node_status(node).is_ghost() {
            assert!(grid.neighbors(node).is_empty(), "ghost {node} has neighbors");
        }
        for n in grid.neighbors(node) {
            assert!(
                !n.status.is_ghost(),
                "ghost {} leaked into neighbors of {node}",
                n.index
            );
        }
    }
}

/// Assert two enumeration passes return identical neighbor lists.
pub fn assert_neighbors_deterministic(grid: &dyn Grid) {
    for node in 0..grid.size() {
        let a = grid.neighbors(node);
        let b = grid.neighbors(node);
        assert_eq!(a.as_slice(), b.as_slice(), "neighbors of {node} unstable");
    }
}

/// Run all compliance checks on a grid.
pub fn run_full_compliance(grid: &dyn Grid) {
    assert_shape_consistent(grid);
    assert_neighbors_in_bounds(grid);
    assert_neighbors_symmetric(grid);
    assert_distances_positive(grid);
    assert_areas_positive(grid);
    assert_neighbor_statuses_match(grid);
    assert_ghosts_isolated(grid);
    assert_neighbors_deterministic(grid);
}
