//! 2-D unstructured triangular mesh.

use crate::error::GridError;
use crate::grid::{apply_overrides, Grid, Neighbor};
use scarp_core::NodeStatus;
use smallvec::SmallVec;
use std::collections::BTreeSet;

/// An unstructured triangular mesh over 2-D vertex coordinates.
///
/// Adjacency and per-vertex dual areas are precomputed from the
/// triangulation at construction. Vertex areas use the mixed-Voronoi
/// rule (circumcentric contributions for acute triangles, clamped for
/// obtuse ones), so the per-triangle contributions sum exactly to the
/// triangle area and the vertex areas sum to the mesh area.
///
/// Vertices default to [`NodeStatus::Core`]; base levels (outlets) are
/// supplied as per-vertex overrides. `Looped` is not meaningful on a
/// mesh and is rejected.
#[derive(Debug, Clone)]
pub struct TriMesh {
    shape: [usize; 1],
    statuses: Vec<NodeStatus>,
    areas: Vec<f64>,
    // CSR adjacency: neighbors of vertex v are
    // indices[offsets[v]..offsets[v + 1]], sorted ascending.
    offsets: Vec<usize>,
    indices: Vec<usize>,
    distances: Vec<f64>,
    max_degree: usize,
}

impl TriMesh {
    /// Build a mesh from vertex coordinates, triangle vertex triples, and
    /// per-vertex status overrides (typically the base-level outlets).
    pub fn new(
        points: &[[f64; 2]],
        triangles: &[[usize; 3]],
        overrides: &[(usize, NodeStatus)],
    ) -> Result<Self, GridError> {
        let n = points.len();
        if n == 0 {
            return Err(GridError::EmptyGrid);
        }

        let mut statuses = vec![NodeStatus::Core; n];
        apply_overrides(&mut statuses, overrides)?;
        for &(_, status) in overrides {
            if status == NodeStatus::Looped {
                return Err(GridError::UnsupportedStatus {
                    status: NodeStatus::Looped,
                    reason: "looped status is not supported on a triangular mesh",
                });
            }
        }

        // Adjacency from triangle edges; BTreeSet keeps each vertex's
        // neighbor list sorted and deduplicated across shared edges.
        let mut adjacency: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); n];
        let mut areas = vec![0.0_f64; n];
        for (t, tri) in triangles.iter().enumerate() {
            for &v in tri {
                if v >= n {
                    return Err(GridError::TriangleIndexOutOfBounds {
                        triangle: t,
                        vertex: v,
                    });
                }
            }
            let [a, b, c] = *tri;
            adjacency[a].insert(b);
            adjacency[a].insert(c);
            adjacency[b].insert(a);
            adjacency[b].insert(c);
            adjacency[c].insert(a);
            adjacency[c].insert(b);

            let contrib = mixed_voronoi_areas(points[a], points[b], points[c]);
            areas[a] += contrib[0];
            areas[b] += contrib[1];
            areas[c] += contrib[2];
        }

        for (v, nbs) in adjacency.iter().enumerate() {
            if nbs.is_empty() {
                return Err(GridError::DisconnectedVertex { vertex: v });
            }
        }

        let mut offsets = Vec::with_capacity(n + 1);
        let mut indices = Vec::new();
        let mut distances = Vec::new();
        let mut max_degree = 0;
        offsets.push(0);
        for (v, nbs) in adjacency.iter().enumerate() {
            max_degree = max_degree.max(nbs.len());
            for &w in nbs {
                indices.push(w);
                distances.push(euclidean(points[v], points[w]));
            }
            offsets.push(indices.len());
        }

        Ok(Self {
            shape: [n],
            statuses,
            areas,
            offsets,
            indices,
            distances,
            max_degree,
        })
    }
}

fn euclidean(p: [f64; 2], q: [f64; 2]) -> f64 {
    let dx = p[0] - q[0];
    let dy = p[1] - q[1];
    (dx * dx + dy * dy).sqrt()
}

fn triangle_area(a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> f64 {
    0.5 * ((b[0] - a[0]) * (c[1] - a[1]) - (c[0] - a[0]) * (b[1] - a[1])).abs()
}

/// Per-corner dual-area contributions of one triangle (Meyer's mixed
/// Voronoi rule). The three contributions sum to the triangle area.
fn mixed_voronoi_areas(a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> [f64; 3] {
    let area = triangle_area(a, b, c);
    if area == 0.0 {
        return [0.0; 3];
    }

    // Squared edge lengths opposite each corner.
    let la2 = sq_dist(b, c);
    let lb2 = sq_dist(c, a);
    let lc2 = sq_dist(a, b);

    // cot(angle at corner) via the cross/dot identity.
    let cot_a = cotangent(a, b, c);
    let cot_b = cotangent(b, c, a);
    let cot_c = cotangent(c, a, b);

    if cot_a <= 0.0 || cot_b <= 0.0 || cot_c <= 0.0 {
        // Obtuse (or right) triangle: clamp per Meyer et al.
        let mut out = [area / 4.0; 3];
        if cot_a <= 0.0 {
            out[0] = area / 2.0;
        } else if cot_b <= 0.0 {
            out[1] = area / 2.0;
        } else {
            out[2] = area / 2.0;
        }
        return out;
    }

    // Circumcentric Voronoi areas: each corner collects one eighth of
    // the squared incident edges weighted by the opposite cotangents.
    [
        (lb2 * cot_b + lc2 * cot_c) / 8.0,
        (lc2 * cot_c + la2 * cot_a) / 8.0,
        (la2 * cot_a + lb2 * cot_b) / 8.0,
    ]
}

fn sq_dist(p: [f64; 2], q: [f64; 2]) -> f64 {
    let dx = p[0] - q[0];
    let dy = p[1] - q[1];
    dx * dx + dy * dy
}

/// Cotangent of the angle at `apex` in triangle `(apex, p, q)`.
fn cotangent(apex: [f64; 2], p: [f64; 2], q: [f64; 2]) -> f64 {
    let u = [p[0] - apex[0], p[1] - apex[1]];
    let v = [q[0] - apex[0], q[1] - apex[1]];
    let dot = u[0] * v[0] + u[1] * v[1];
    let cross = (u[0] * v[1] - u[1] * v[0]).abs();
    if cross == 0.0 {
        return 0.0;
    }
    dot / cross
}

impl Grid for TriMesh {
    fn size(&self) -> usize {
        self.shape[0]
    }

    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn statuses(&self) -> &[NodeStatus] {
        &self.statuses
    }

    fn area(&self, node: usize) -> f64 {
        self.areas[node]
    }

    fn neighbors(&self, node: usize) -> SmallVec<[Neighbor; 8]> {
        let mut result = SmallVec::new();
        if self.statuses[node].is_ghost() {
            return result;
        }
        let range = self.offsets[node]..self.offsets[node + 1];
        for (index, distance) in self.indices[range.clone()]
            .iter()
            .zip(&self.distances[range])
        {
            if self.statuses[*index].is_ghost() {
                continue;
            }
            result.push(Neighbor {
                index: *index,
                distance: *distance,
                status: self.statuses[*index],
            });
        }
        result
    }

    fn max_neighbor_count(&self) -> usize {
        self.max_degree
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compliance;

    /// Unit square split along the main diagonal.
    fn square_mesh() -> TriMesh {
        let points = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        let triangles = [[0, 1, 2], [0, 2, 3]];
        TriMesh::new(&points, &triangles, &[(0, NodeStatus::FixedValue)]).unwrap()
    }

    #[test]
    fn adjacency_from_shared_edges() {
        let mesh = square_mesh();
        let n0: Vec<usize> = mesh.neighbors(0).iter().map(|n| n.index).collect();
        assert_eq!(n0, vec![1, 2, 3]);
        let n1: Vec<usize> = mesh.neighbors(1).iter().map(|n| n.index).collect();
        assert_eq!(n1, vec![0, 2]);
        assert_eq!(mesh.max_neighbor_count(), 3);
    }

    #[test]
    fn neighbor_distances_are_euclidean() {
        let mesh = square_mesh();
        let diag = mesh
            .neighbors(0)
            .iter()
            .find(|n| n.index == 2)
            .unwrap()
            .distance;
        assert!((diag - 2.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn vertex_areas_sum_to_mesh_area() {
        let mesh = square_mesh();
        let total: f64 = (0..mesh.size()).map(|v| mesh.area(v)).sum();
        assert!((total - 1.0).abs() < 1e-12, "got {total}");
    }

    #[test]
    fn equilateral_corner_areas_are_equal() {
        let h = 3.0_f64.sqrt() / 2.0;
        let points = [[0.0, 0.0], [1.0, 0.0], [0.5, h]];
        let mesh = TriMesh::new(&points, &[[0, 1, 2]], &[]).unwrap();
        let area = triangle_area(points[0], points[1], points[2]);
        for v in 0..3 {
            assert!((mesh.area(v) - area / 3.0).abs() < 1e-12);
        }
    }

    #[test]
    fn obtuse_triangle_areas_still_sum() {
        let points = [[0.0, 0.0], [4.0, 0.0], [2.0, 0.2]];
        let mesh = TriMesh::new(&points, &[[0, 1, 2]], &[]).unwrap();
        let total: f64 = (0..3).map(|v| mesh.area(v)).sum();
        let expected = triangle_area(points[0], points[1], points[2]);
        assert!((total - expected).abs() < 1e-12);
    }

    #[test]
    fn disconnected_vertex_rejected() {
        let points = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [5.0, 5.0]];
        let err = TriMesh::new(&points, &[[0, 1, 2]], &[]).unwrap_err();
        assert!(matches!(err, GridError::DisconnectedVertex { vertex: 3 }));
    }

    #[test]
    fn triangle_index_out_of_bounds_rejected() {
        let points = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]];
        let err = TriMesh::new(&points, &[[0, 1, 7]], &[]).unwrap_err();
        assert!(matches!(
            err,
            GridError::TriangleIndexOutOfBounds { triangle: 0, vertex: 7 }
        ));
    }

    #[test]
    fn looped_status_rejected() {
        let points = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]];
        let err =
            TriMesh::new(&points, &[[0, 1, 2]], &[(1, NodeStatus::Looped)]).unwrap_err();
        assert!(matches!(err, GridError::UnsupportedStatus { .. }));
    }

    #[test]
    fn compliance_square() {
        let mesh = square_mesh();
        compliance::run_full_compliance(&mesh);
    }
}
