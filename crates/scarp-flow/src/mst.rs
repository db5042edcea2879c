//! Minimum-spanning-tree sink resolver.
//!
//! Reconnects closed basins to the drainage network: basins are
//! collapsed to vertices of an auxiliary graph whose edges are the
//! lowest passes between adjacent basins, a minimum spanning tree rooted
//! at the base-level basins selects one outlet pass per inner basin, and
//! the receiver graph (plus, when carving, the working elevation) is
//! amended along each selected pass.

use crate::error::{FlowError, OperatorError};
use crate::float::OrdF64;
use crate::graph_impl::FlowGraphImpl;
use crate::operator::{FlowOperator, OperatorContext};
use scarp_core::FlowDirection;
use scarp_grid::Grid;
use std::collections::{HashMap, VecDeque};

/// MST construction algorithm.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BasinMethod {
    /// Sort all passes, accept with union-find. O(E log E).
    #[default]
    Kruskal,
    /// Lightest-outgoing-edge rounds per component. O(E log V).
    Boruvka,
}

/// How the selected passes are turned into receiver edges.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RouteMethod {
    /// The inner basin's pit drains directly to the parent basin's root.
    /// Elevation is untouched.
    Basic,
    /// The receiver chain from the pass down to the pit is reversed, and
    /// the working elevation is corrected so the carved channel descends
    /// monotonically.
    #[default]
    Carve,
}

/// One lowest pass between two adjacent basins.
#[derive(Debug, Clone)]
struct BasinEdge {
    /// Basin ids on each side of the pass.
    basins: (usize, usize),
    /// Pass node pair; `nodes.0` lies in `basins.0`.
    nodes: (usize, usize),
    /// Neighbor distance across the pass.
    distance: f64,
    /// Deterministic ordering key:
    /// `(pass elevation, lower endpoint, higher endpoint)`.
    key: (OrdF64, usize, usize),
}

/// Plain union-find with path halving.
struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    /// Merge the components of `a` and `b`; false if already merged.
    fn union(&mut self, a: usize, b: usize) -> bool {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return false;
        }
        self.parent[rb] = ra;
        true
    }
}

/// Resolves closed depressions by rerouting each inner basin across its
/// minimum-spanning-tree outlet pass.
///
/// Requires a single-flow graph on input and produces single flow. With
/// [`RouteMethod::Carve`] the working elevation is corrected after
/// rerouting (each node raised to at least its receiver's elevation) so
/// that flow descends monotonically from every former pit; with
/// [`RouteMethod::Basic`] elevation is untouched.
///
/// Applying the resolver to an already-resolved graph is a no-op.
#[derive(Debug, Clone, Default)]
pub struct MstSinkResolver {
    basin_method: BasinMethod,
    route_method: RouteMethod,
}

impl MstSinkResolver {
    /// Increment applied above the receiver elevation when carving, so
    /// corrected channels keep a strictly positive gradient.
    pub const CARVE_EPSILON: f64 = 1e-10;

    /// Create a resolver with explicit algorithm choices.
    pub fn new(basin_method: BasinMethod, route_method: RouteMethod) -> Self {
        Self {
            basin_method,
            route_method,
        }
    }

    /// The MST construction algorithm.
    pub fn basin_method(&self) -> BasinMethod {
        self.basin_method
    }

    /// The route propagation variant.
    pub fn route_method(&self) -> RouteMethod {
        self.route_method
    }

    /// Collect the lowest pass for every pair of adjacent basins.
    fn basin_edges(
        graph: &FlowGraphImpl,
        basins: &[usize],
        elevation: &[f64],
        grid: &dyn Grid,
    ) -> Vec<BasinEdge> {
        let mut best: HashMap<(usize, usize), BasinEdge> = HashMap::new();

        for u in 0..graph.size() {
            if graph.is_ghost(u) {
                continue;
            }
            for n in grid.neighbors(u) {
                let v = n.index;
                if v <= u || basins[u] == basins[v] {
                    continue;
                }
                let pass = elevation[u].max(elevation[v]);
                let (lo, hi) = if (elevation[u], u) <= (elevation[v], v) {
                    (u, v)
                } else {
                    (v, u)
                };
                let key = (OrdF64(pass), lo, hi);
                let pair = (basins[u].min(basins[v]), basins[u].max(basins[v]));
                let candidate = BasinEdge {
                    basins: (basins[u], basins[v]),
                    nodes: (u, v),
                    distance: n.distance,
                    key,
                };
                match best.get(&pair) {
                    Some(current) if current.key <= key => {}
                    _ => {
                        best.insert(pair, candidate);
                    }
                }
            }
        }

        let mut edges: Vec<BasinEdge> = best.into_values().collect();
        edges.sort_by(|a, b| a.key.cmp(&b.key));
        edges
    }

    /// Kruskal: accepted edge indices into the sorted edge list.
    fn mst_kruskal(edges: &[BasinEdge], uf: &mut UnionFind) -> Vec<usize> {
        let mut accepted = Vec::new();
        for (idx, edge) in edges.iter().enumerate() {
            if uf.union(edge.basins.0, edge.basins.1) {
                accepted.push(idx);
            }
        }
        accepted
    }

    /// Boruvka: per round each component picks its lightest outgoing
    /// edge; picked edges are merged. Yields the same tree as Kruskal
    /// because the edge keys are totally ordered.
    fn mst_boruvka(edges: &[BasinEdge], uf: &mut UnionFind) -> Vec<usize> {
        let mut accepted = Vec::new();
        loop {
            // Edges are pre-sorted, so "first seen" is "lightest".
            let mut cheapest: HashMap<usize, usize> = HashMap::new();
            for (idx, edge) in edges.iter().enumerate() {
                let ra = uf.find(edge.basins.0);
                let rb = uf.find(edge.basins.1);
                if ra == rb {
                    continue;
                }
                cheapest.entry(ra).or_insert(idx);
                cheapest.entry(rb).or_insert(idx);
            }
            let mut chosen: Vec<usize> = cheapest.into_values().collect();
            chosen.sort_unstable();
            chosen.dedup();

            let mut merged_any = false;
            for idx in chosen {
                if uf.union(edges[idx].basins.0, edges[idx].basins.1) {
                    accepted.push(idx);
                    merged_any = true;
                }
            }
            if !merged_any {
                break;
            }
        }
        accepted.sort_unstable();
        accepted
    }

    /// Reroute one inner basin across its outlet pass.
    fn route_edge(
        &self,
        graph: &mut FlowGraphImpl,
        edge: &BasinEdge,
        child_basin: usize,
        parent_basin: usize,
    ) {
        let (u, v) = if edge.basins.0 == child_basin {
            (edge.nodes.0, edge.nodes.1)
        } else {
            (edge.nodes.1, edge.nodes.0)
        };

        match self.route_method {
            RouteMethod::Basic => {
                let pit = graph.basin_roots()[child_basin];
                let parent_root = graph.basin_roots()[parent_basin];
                graph.set_single_receiver(pit, parent_root, edge.distance);
            }
            RouteMethod::Carve => {
                // Old receiver chain from the pass node down to the pit.
                let mut path = vec![u];
                let mut distances = Vec::new();
                let mut node = u;
                while graph.receiver_count(node) > 0 {
                    distances.push(graph.receiver_distances(node)[0]);
                    node = graph.receivers(node)[0];
                    path.push(node);
                }

                // Reverse the chain and hook the pass node to the other
                // side. Elevation is corrected afterwards in one sweep
                // over the rerouted graph.
                graph.set_single_receiver(u, v, edge.distance);
                for i in 1..path.len() {
                    graph.set_single_receiver(path[i], path[i - 1], distances[i - 1]);
                }
            }
        }
    }
}

impl FlowOperator for MstSinkResolver {
    fn name(&self) -> &str {
        "mst_sink_resolver"
    }

    fn graph_updated(&self) -> bool {
        true
    }

    fn elevation_updated(&self) -> bool {
        self.route_method == RouteMethod::Carve
    }

    fn in_flowdir(&self) -> FlowDirection {
        FlowDirection::Single
    }

    fn out_flowdir(&self) -> FlowDirection {
        FlowDirection::Single
    }

    fn apply(&self, ctx: &mut OperatorContext<'_>) -> Result<(), OperatorError> {
        let (graph, elevation, grid) = ctx.parts();

        graph.compute_basins().map_err(|e| match e {
            FlowError::SingleFlowRequired => OperatorError::SingleFlowRequired,
            other => OperatorError::ExecutionFailed {
                reason: other.to_string(),
            },
        })?;
        let n_basins = graph.basin_roots().len();

        let outer: Vec<bool> = graph
            .basin_roots()
            .iter()
            .map(|&root| graph.is_base_level(root))
            .collect();
        if !outer.iter().any(|&o| o) {
            return Err(OperatorError::NoOutlet);
        }
        if outer.iter().all(|&o| o) {
            // Nothing to resolve; keeps a second application a no-op.
            return Ok(());
        }

        let basins = graph
            .basins()
            .map_err(|e| OperatorError::ExecutionFailed {
                reason: e.to_string(),
            })?
            .to_vec();
        let edges = Self::basin_edges(graph, &basins, elevation, grid);

        // The virtual super-source: all outer basins start merged.
        let mut uf = UnionFind::new(n_basins);
        let Some(first_outer) = outer.iter().position(|&o| o) else {
            return Err(OperatorError::NoOutlet);
        };
        for b in 0..n_basins {
            if outer[b] {
                uf.union(first_outer, b);
            }
        }

        let accepted = match self.basin_method {
            BasinMethod::Kruskal => Self::mst_kruskal(&edges, &mut uf),
            BasinMethod::Boruvka => Self::mst_boruvka(&edges, &mut uf),
        };

        // Orient the tree away from the base levels and reroute each
        // inner basin as it is first reached.
        let mut adjacency: Vec<Vec<(usize, usize)>> = vec![Vec::new(); n_basins];
        for &idx in &accepted {
            let (a, b) = edges[idx].basins;
            adjacency[a].push((b, idx));
            adjacency[b].push((a, idx));
        }
        let mut visited = outer.clone();
        let mut queue: VecDeque<usize> =
            (0..n_basins).filter(|&b| outer[b]).collect();
        while let Some(parent) = queue.pop_front() {
            for &(child, idx) in &adjacency[parent] {
                if visited[child] {
                    continue;
                }
                visited[child] = true;
                self.route_edge(graph, &edges[idx], child, parent);
                queue.push_back(child);
            }
        }

        graph.compute_donors();
        graph.compute_order().map_err(|e| OperatorError::ExecutionFailed {
            reason: e.to_string(),
        })?;

        // Hydrologic correction: with carving, raise every node strictly
        // above its receiver so flow descends monotonically out of each
        // former pit and a later slope-weighted router still finds a
        // downslope direction. Receivers come first in the order, so one
        // downstream-first sweep suffices.
        if self.route_method == RouteMethod::Carve {
            let order = graph.order().map_err(|e| OperatorError::ExecutionFailed {
                reason: e.to_string(),
            })?;
            for &node in order {
                if graph.receiver_count(node) > 0 {
                    let receiver = graph.receivers(node)[0];
                    if elevation[node] <= elevation[receiver] {
                        elevation[node] = elevation[receiver] + Self::CARVE_EPSILON;
                    }
                }
            }
        }
        Ok(())
    }
}
