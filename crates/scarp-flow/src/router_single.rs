//! Steepest-descent single flow router.

use crate::error::OperatorError;
use crate::operator::{FlowOperator, OperatorContext};
use scarp_core::FlowDirection;

/// Routes each node's entire flow to its steepest-descent neighbor.
///
/// For every non-base-level, non-ghost node the receiver is the neighbor
/// maximizing `(h(i) - h(j)) / d(i, j)` over strictly-downslope
/// neighbors, ties broken by the smallest neighbor index. A node with no
/// downslope neighbor is a pit: it keeps zero receivers and becomes a
/// basin root until a sink resolver reroutes it.
#[derive(Debug, Clone, Default)]
pub struct SingleFlowRouter {
    _private: (),
}

impl SingleFlowRouter {
    /// Create a single flow router. It has no options.
    pub fn new() -> Self {
        Self::default()
    }
}

impl FlowOperator for SingleFlowRouter {
    fn name(&self) -> &str {
        "single_flow_router"
    }

    fn graph_updated(&self) -> bool {
        true
    }

    fn out_flowdir(&self) -> FlowDirection {
        FlowDirection::Single
    }

    fn apply(&self, ctx: &mut OperatorContext<'_>) -> Result<(), OperatorError> {
        let (graph, elevation, grid) = ctx.parts();
        graph.reset(true);

        for node in 0..graph.size() {
            if graph.is_ghost(node) || graph.is_base_level(node) {
                continue;
            }
            let mut best: Option<(f64, usize, f64)> = None;
            for n in grid.neighbors(node) {
                let slope = (elevation[node] - elevation[n.index]) / n.distance;
                if slope <= 0.0 {
                    continue;
                }
                let better = match best {
                    None => true,
                    Some((s, j, _)) => slope > s || (slope == s && n.index < j),
                };
                if better {
                    best = Some((slope, n.index, n.distance));
                }
            }
            if let Some((_, receiver, distance)) = best {
                graph.set_single_receiver(node, receiver, distance);
            }
        }

        graph.compute_donors();
        graph.compute_order().map_err(|e| OperatorError::ExecutionFailed {
            reason: e.to_string(),
        })?;
        Ok(())
    }
}
