//! Slope-weighted multiple flow router.

use crate::error::OperatorError;
use crate::operator::{FlowOperator, OperatorContext};
use scarp_core::FlowDirection;
use smallvec::SmallVec;

/// Partitions each node's flow among all strictly-downslope neighbors.
///
/// Raw weights are `slope^p` with `p = slope_exp`; they are normalized
/// to sum to 1 per node. `p = 0` spreads flow equally over the downslope
/// set; larger exponents concentrate it toward the steepest direction.
///
/// A node whose neighbors are all at equal or higher elevation keeps
/// zero receivers (its weights sum to 0), exactly like a single-flow
/// pit.
#[derive(Debug, Clone)]
pub struct MultiFlowRouter {
    slope_exp: f64,
}

impl Default for MultiFlowRouter {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl MultiFlowRouter {
    /// Create a multiple flow router with the given slope exponent
    /// (`p >= 0`).
    pub fn new(slope_exp: f64) -> Self {
        Self { slope_exp }
    }

    /// The slope partition exponent.
    pub fn slope_exp(&self) -> f64 {
        self.slope_exp
    }
}

impl FlowOperator for MultiFlowRouter {
    fn name(&self) -> &str {
        "multi_flow_router"
    }

    fn graph_updated(&self) -> bool {
        true
    }

    fn out_flowdir(&self) -> FlowDirection {
        FlowDirection::Multi
    }

    fn apply(&self, ctx: &mut OperatorContext<'_>) -> Result<(), OperatorError> {
        let (graph, elevation, grid) = ctx.parts();
        graph.reset(false);

        let mut candidates: SmallVec<[(usize, f64, f64); 8]> = SmallVec::new();
        for node in 0..graph.size() {
            if graph.is_ghost(node) || graph.is_base_level(node) {
                continue;
            }
            candidates.clear();
            let mut weight_sum = 0.0;
            for n in grid.neighbors(node) {
                let slope = (elevation[node] - elevation[n.index]) / n.distance;
                if slope <= 0.0 {
                    continue;
                }
                let weight = slope.powf(self.slope_exp);
                weight_sum += weight;
                candidates.push((n.index, n.distance, weight));
            }
            if weight_sum <= 0.0 {
                continue;
            }
            for &(receiver, distance, weight) in &candidates {
                graph.add_receiver(node, receiver, distance, weight / weight_sum);
            }
        }

        graph.compute_donors();
        graph.compute_order().map_err(|e| OperatorError::ExecutionFailed {
            reason: e.to_string(),
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph_impl::FlowGraphImpl;
    use scarp_core::NodeStatus;
    use scarp_grid::{BorderStatus, Connectivity, Grid, ProfileGrid, RasterGrid};

    fn route(grid: &dyn Grid, elevation: &mut [f64], slope_exp: f64) -> FlowGraphImpl {
        let mut graph = FlowGraphImpl::new(grid, true);
        let router = MultiFlowRouter::new(slope_exp);
        let mut ctx = OperatorContext::new(&mut graph, elevation, grid);
        router.apply(&mut ctx).unwrap();
        graph
    }

    #[test]
    fn weights_sum_to_one_over_downslope_set() {
        let grid = RasterGrid::new(
            [3, 3],
            [1.0, 1.0],
            BorderStatus::uniform(NodeStatus::FixedValue),
            Connectivity::Queen,
            &[],
        )
        .unwrap();
        let mut elevation = vec![
            0.0, 1.0, 0.0, //
            2.0, 5.0, 2.0, //
            0.0, 1.0, 0.0, //
        ];
        let graph = route(&grid, &mut elevation, 1.0);
        let weights = graph.receiver_weights(4);
        assert_eq!(weights.len(), 8, "all 8 neighbors are downslope");
        let sum: f64 = weights.iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);
        assert!(weights.iter().all(|&w| w > 0.0));
    }

    #[test]
    fn steeper_neighbor_gets_larger_share() {
        let grid = ProfileGrid::new(
            3,
            1.0,
            [NodeStatus::FixedValue, NodeStatus::FixedValue],
            &[],
        )
        .unwrap();
        let mut elevation = vec![0.0, 4.0, 2.0];
        let graph = route(&grid, &mut elevation, 1.0);
        let receivers = graph.receivers(1);
        let weights = graph.receiver_weights(1);
        // Slope toward 0 is 4, toward 2 is 2: shares 2/3 and 1/3.
        assert_eq!(receivers, &[0, 2]);
        assert!((weights[0] - 2.0 / 3.0).abs() < 1e-12);
        assert!((weights[1] - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn zero_exponent_spreads_evenly() {
        let grid = ProfileGrid::new(
            3,
            1.0,
            [NodeStatus::FixedValue, NodeStatus::FixedValue],
            &[],
        )
        .unwrap();
        let mut elevation = vec![0.0, 4.0, 2.0];
        let graph = route(&grid, &mut elevation, 0.0);
        let weights = graph.receiver_weights(1);
        assert!((weights[0] - 0.5).abs() < 1e-12);
        assert!((weights[1] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn all_flat_neighborhood_keeps_zero_receivers() {
        let grid = ProfileGrid::new(
            3,
            1.0,
            [NodeStatus::FixedValue, NodeStatus::FixedValue],
            &[],
        )
        .unwrap();
        let mut elevation = vec![1.0, 1.0, 1.0];
        let graph = route(&grid, &mut elevation, 1.0);
        assert_eq!(graph.receiver_count(1), 0);
        assert!(graph.receiver_weights(1).is_empty());
    }

    // ── Property tests ──────────────────────────────────────────

    use proptest::prelude::*;

    proptest! {
        /// Weights are a partition of unity wherever receivers exist,
        /// and every receiver is strictly downslope.
        #[test]
        fn weights_partition_unity_on_random_terrain(
            elevation in proptest::collection::vec(0.0..50.0f64, 25),
            slope_exp in 0.0..3.0f64,
        ) {
            let grid = RasterGrid::new(
                [5, 5],
                [1.0, 1.0],
                BorderStatus::uniform(NodeStatus::FixedValue),
                Connectivity::Queen,
                &[],
            )
            .unwrap();
            let mut working = elevation.clone();
            let graph = route(&grid, &mut working, slope_exp);
            for node in 0..graph.size() {
                let weights = graph.receiver_weights(node);
                if !weights.is_empty() {
                    let sum: f64 = weights.iter().sum();
                    prop_assert!((sum - 1.0).abs() < 1e-9);
                }
                for (k, &receiver) in graph.receivers(node).iter().enumerate() {
                    prop_assert!(
                        elevation[receiver] < elevation[node],
                        "receiver {} of {} is not downslope",
                        receiver,
                        node
                    );
                    prop_assert!(weights[k] > 0.0);
                }
            }
        }
    }
}
