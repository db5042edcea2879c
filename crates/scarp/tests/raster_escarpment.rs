//! Raster scenario: a periodic escarpment routed through the full
//! single-flow / MST-resolution / multiple-flow pipeline.
//!
//! The grid is periodic top-to-bottom, drains through its left border,
//! and starts as two flat plateaus separated by a 400 m step. The flat
//! plateaus are riddled with pits for the steepest-descent router; after
//! MST carving, the slope-weighted router must still deliver every drop
//! of drainage to the left border.

use scarp::prelude::*;
use std::sync::Arc;

#[test]
fn total_drainage_reaches_the_left_border() {
    let shape = [101, 201];
    let grid = RasterGrid::from_length(
        shape,
        [1e4, 2e4],
        BorderStatus {
            left: NodeStatus::FixedValue,
            right: NodeStatus::Core,
            top: NodeStatus::Looped,
            bottom: NodeStatus::Looped,
        },
        Connectivity::Queen,
        &[],
    )
    .unwrap();
    let cell_area = 100.0 * 100.0;
    let total_area = (shape[0] * shape[1]) as f64 * cell_area;

    let grid = Arc::new(grid);
    let mut flow = FlowGraph::new(
        grid.clone(),
        vec![
            Box::new(SingleFlowRouter::new()),
            Box::new(MstSinkResolver::default()),
            Box::new(MultiFlowRouter::new(1.1)),
        ],
    )
    .unwrap();

    // Escarpment: columns 100.. sit 400 m above the rest.
    let elevation: Vec<f64> = (0..grid.size())
        .map(|i| if i % shape[1] >= 100 { 400.0 } else { 0.0 })
        .collect();
    flow.update_routes(&elevation).unwrap();

    let drainage = flow.accumulate_scalar(1.0).unwrap();
    let base_total: f64 = (0..grid.size())
        .filter(|&i| flow.graph_impl().is_base_level(i))
        .map(|i| drainage[i])
        .sum();

    assert!(
        (base_total - total_area).abs() / total_area < 1e-9,
        "base levels drain {base_total}, grid area {total_area}"
    );

    // Multiple flow: weights sum to 1 on every routed node, 0 on base
    // levels.
    for node in 0..grid.size() {
        let weights = flow.graph_impl().receiver_weights(node);
        let sum: f64 = weights.iter().sum();
        if flow.graph_impl().is_base_level(node) {
            assert_eq!(weights.len(), 0);
        } else {
            assert!(
                (sum - 1.0).abs() < 1e-12,
                "weights at node {node} sum to {sum}"
            );
        }
    }
}
