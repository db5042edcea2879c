//! Compact storage of flow receivers, donors, traversal order, and
//! basins, plus the flow accumulation primitive.

use crate::error::FlowError;
use scarp_core::NO_BASIN;
use scarp_grid::Grid;

/// Receiver/donor/order/basin storage for one flow graph.
///
/// Receivers are stored flattened `N x F` where the fan-out `F` is 1 for
/// a single-flow graph and the grid's `Kmax` when any operator in the
/// pipeline produces multiple flow. Donors, the topological order, and
/// basin ids are derived from the receivers and rebuilt on demand after
/// the receivers change.
///
/// The per-node cell areas and boundary masks are captured from the grid
/// at construction, so a deep copy of this struct (a graph snapshot)
/// supports accumulation without keeping the grid alive.
#[derive(Debug, Clone)]
pub struct FlowGraphImpl {
    size: usize,
    max_receivers: usize,
    single_flow: bool,

    receivers: Vec<usize>,
    receiver_counts: Vec<usize>,
    receiver_distances: Vec<f64>,
    receiver_weights: Vec<f64>,
    donors: Vec<Vec<usize>>,

    order: Vec<usize>,
    basins: Vec<usize>,
    basin_roots: Vec<usize>,

    base_level: Vec<bool>,
    ghost: Vec<bool>,
    areas: Vec<f64>,

    receivers_set: bool,
    donors_valid: bool,
    order_valid: bool,
    basins_valid: bool,
}

impl FlowGraphImpl {
    /// Allocate storage for `grid`, sized for multiple flow when
    /// `multi_capable` is true.
    pub fn new(grid: &dyn Grid, multi_capable: bool) -> Self {
        let size = grid.size();
        let fan_out = if multi_capable {
            grid.max_neighbor_count()
        } else {
            1
        };
        let statuses = grid.statuses();
        Self {
            size,
            max_receivers: fan_out,
            single_flow: true,
            receivers: vec![0; size * fan_out],
            receiver_counts: vec![0; size],
            receiver_distances: vec![0.0; size * fan_out],
            receiver_weights: vec![0.0; size * fan_out],
            donors: vec![Vec::new(); size],
            order: Vec::with_capacity(size),
            basins: vec![NO_BASIN; size],
            basin_roots: Vec::new(),
            base_level: statuses.iter().map(|s| s.is_base_level()).collect(),
            ghost: statuses.iter().map(|s| s.is_ghost()).collect(),
            areas: (0..size).map(|i| grid.area(i)).collect(),
            receivers_set: false,
            donors_valid: false,
            order_valid: false,
            basins_valid: false,
        }
    }

    /// Number of nodes.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Fan-out capacity `F` of the receiver storage.
    pub fn max_receivers(&self) -> usize {
        self.max_receivers
    }

    /// Whether the last router produced single flow.
    pub fn single_flow(&self) -> bool {
        self.single_flow
    }

    /// Whether flow terminates at `node`.
    pub fn is_base_level(&self, node: usize) -> bool {
        self.base_level[node]
    }

    /// Whether `node` is skipped by flow construction.
    pub fn is_ghost(&self, node: usize) -> bool {
        self.ghost[node]
    }

    /// Cell area of `node`, captured from the grid at construction.
    pub fn area(&self, node: usize) -> f64 {
        self.areas[node]
    }

    /// Replace the base-level set with an explicit node list.
    ///
    /// Overrides the default derived from `FixedValue` statuses.
    pub fn set_base_levels(&mut self, nodes: &[usize]) {
        self.base_level.iter_mut().for_each(|b| *b = false);
        for &node in nodes {
            self.base_level[node] = true;
        }
        self.order_valid = false;
        self.basins_valid = false;
    }

    /// Mark receivers and everything derived from them stale, and set the
    /// flow kind the next router will write.
    pub fn reset(&mut self, single_flow: bool) {
        self.single_flow = single_flow;
        self.receiver_counts.iter_mut().for_each(|c| *c = 0);
        self.receivers_set = false;
        self.donors_valid = false;
        self.order_valid = false;
        self.basins_valid = false;
    }

    /// Set the unique receiver of `node` (single flow), weight 1.
    pub fn set_single_receiver(&mut self, node: usize, receiver: usize, distance: f64) {
        let base = node * self.max_receivers;
        self.receivers[base] = receiver;
        self.receiver_distances[base] = distance;
        self.receiver_weights[base] = 1.0;
        self.receiver_counts[node] = 1;
        self.receivers_set = true;
        self.donors_valid = false;
        self.order_valid = false;
        self.basins_valid = false;
    }

    /// Append one weighted receiver of `node` (multiple flow).
    ///
    /// Callers are responsible for weights summing to 1 per node.
    pub fn add_receiver(&mut self, node: usize, receiver: usize, distance: f64, weight: f64) {
        let count = self.receiver_counts[node];
        debug_assert!(count < self.max_receivers, "receiver fan-out overflow");
        let slot = node * self.max_receivers + count;
        self.receivers[slot] = receiver;
        self.receiver_distances[slot] = distance;
        self.receiver_weights[slot] = weight;
        self.receiver_counts[node] = count + 1;
        self.receivers_set = true;
        self.donors_valid = false;
        self.order_valid = false;
        self.basins_valid = false;
    }

    /// Number of receivers of `node`.
    pub fn receiver_count(&self, node: usize) -> usize {
        self.receiver_counts[node]
    }

    /// Receiver indices of `node`.
    pub fn receivers(&self, node: usize) -> &[usize] {
        let base = node * self.max_receivers;
        &self.receivers[base..base + self.receiver_counts[node]]
    }

    /// Geometric distances to the receivers of `node`.
    pub fn receiver_distances(&self, node: usize) -> &[f64] {
        let base = node * self.max_receivers;
        &self.receiver_distances[base..base + self.receiver_counts[node]]
    }

    /// Partition weights toward the receivers of `node`.
    pub fn receiver_weights(&self, node: usize) -> &[f64] {
        let base = node * self.max_receivers;
        &self.receiver_weights[base..base + self.receiver_counts[node]]
    }

    /// Rebuild donor lists from the receivers. O(N * F).
    pub fn compute_donors(&mut self) {
        for donors in &mut self.donors {
            donors.clear();
        }
        for node in 0..self.size {
            let base = node * self.max_receivers;
            for k in 0..self.receiver_counts[node] {
                let receiver = self.receivers[base + k];
                self.donors[receiver].push(node);
            }
        }
        self.donors_valid = true;
    }

    /// Donor (upstream neighbor) indices of `node`.
    pub fn donors(&self, node: usize) -> &[usize] {
        &self.donors[node]
    }

    /// Rebuild the topological order: downstream nodes come first, so
    /// every node appears after all of its receivers.
    ///
    /// Single flow uses a stack DFS from the receiverless roots along the
    /// donor lists; multiple flow counts pending receivers per node.
    /// Ghost nodes never appear in the order.
    pub fn compute_order(&mut self) -> Result<(), FlowError> {
        if !self.receivers_set {
            return Err(FlowError::GraphNotComputed);
        }
        if !self.donors_valid {
            self.compute_donors();
        }
        self.order.clear();

        if self.single_flow {
            let mut stack: Vec<usize> = (0..self.size)
                .filter(|&i| self.receiver_counts[i] == 0 && !self.ghost[i])
                .collect();
            stack.reverse();
            while let Some(node) = stack.pop() {
                self.order.push(node);
                for &donor in &self.donors[node] {
                    stack.push(donor);
                }
            }
        } else {
            let mut pending = self.receiver_counts.clone();
            let mut stack: Vec<usize> = (0..self.size)
                .filter(|&i| pending[i] == 0 && !self.ghost[i])
                .collect();
            stack.reverse();
            while let Some(node) = stack.pop() {
                self.order.push(node);
                for &donor in &self.donors[node] {
                    pending[donor] -= 1;
                    if pending[donor] == 0 {
                        stack.push(donor);
                    }
                }
            }
        }

        let traversable = self.ghost.iter().filter(|g| !**g).count();
        debug_assert_eq!(self.order.len(), traversable, "receiver graph has a cycle");
        self.order_valid = true;
        Ok(())
    }

    /// The topological order (downstream first).
    pub fn order(&self) -> Result<&[usize], FlowError> {
        if !self.order_valid {
            return Err(FlowError::GraphNotComputed);
        }
        Ok(&self.order)
    }

    /// Assign dense basin ids by following single-flow receivers to their
    /// roots.
    ///
    /// Ids are numbered by first appearance of each basin root in the
    /// topological order, so they are deterministic for a given graph.
    pub fn compute_basins(&mut self) -> Result<(), FlowError> {
        if !self.single_flow {
            return Err(FlowError::SingleFlowRequired);
        }
        if !self.order_valid {
            self.compute_order()?;
        }
        self.basins.iter_mut().for_each(|b| *b = NO_BASIN);
        self.basin_roots.clear();
        for idx in 0..self.order.len() {
            let node = self.order[idx];
            if self.receiver_counts[node] == 0 {
                self.basin_roots.push(node);
                self.basins[node] = self.basin_roots.len() - 1;
            } else {
                self.basins[node] = self.basins[self.receivers(node)[0]];
            }
        }
        self.basins_valid = true;
        Ok(())
    }

    /// Dense basin id per node (`NO_BASIN` on ghost nodes).
    pub fn basins(&self) -> Result<&[usize], FlowError> {
        if !self.basins_valid {
            return Err(FlowError::GraphNotComputed);
        }
        Ok(&self.basins)
    }

    /// Root node (pit or base level) of each basin id.
    pub fn basin_roots(&self) -> &[usize] {
        &self.basin_roots
    }

    /// Whether basin ids are up to date with the receivers.
    pub fn basins_valid(&self) -> bool {
        self.basins_valid
    }

    fn accumulate_impl(
        &self,
        acc: &mut [f64],
        src_at: impl Fn(usize) -> f64,
    ) -> Result<(), FlowError> {
        if !self.order_valid {
            return Err(FlowError::GraphNotComputed);
        }
        if acc.len() != self.size {
            return Err(FlowError::ShapeMismatch {
                expected: self.size,
                actual: acc.len(),
            });
        }
        acc.iter_mut().for_each(|a| *a = 0.0);
        for &node in &self.order {
            acc[node] = src_at(node) * self.areas[node];
        }
        for &node in self.order.iter().rev() {
            let base = node * self.max_receivers;
            let amount = acc[node];
            for k in 0..self.receiver_counts[node] {
                acc[self.receivers[base + k]] += self.receiver_weights[base + k] * amount;
            }
        }
        Ok(())
    }

    /// Accumulate a per-node source over the drainage network into `acc`.
    ///
    /// Every node is seeded with `src[i] * area(i)`; traversing upstream
    /// to downstream, each node's total is split among its receivers by
    /// their weights. The value at a base level is the integral of
    /// `src * area` over its drained region.
    pub fn accumulate_into(&self, acc: &mut [f64], src: &[f64]) -> Result<(), FlowError> {
        if src.len() != self.size {
            return Err(FlowError::ShapeMismatch {
                expected: self.size,
                actual: src.len(),
            });
        }
        self.accumulate_impl(acc, |i| src[i])
    }

    /// Accumulate a uniform source over the drainage network into `acc`.
    ///
    /// `accumulate_scalar_into(acc, 1.0)` yields the drainage area.
    pub fn accumulate_scalar_into(&self, acc: &mut [f64], src: f64) -> Result<(), FlowError> {
        self.accumulate_impl(acc, |_| src)
    }

    /// Allocating variant of [`accumulate_into`](Self::accumulate_into).
    pub fn accumulate(&self, src: &[f64]) -> Result<Vec<f64>, FlowError> {
        let mut acc = vec![0.0; self.size];
        self.accumulate_into(&mut acc, src)?;
        Ok(acc)
    }

    /// Allocating variant of
    /// [`accumulate_scalar_into`](Self::accumulate_scalar_into).
    pub fn accumulate_scalar(&self, src: f64) -> Result<Vec<f64>, FlowError> {
        let mut acc = vec![0.0; self.size];
        self.accumulate_scalar_into(&mut acc, src)?;
        Ok(acc)
    }
}
