//! Shared fixtures for the scarp benchmarks.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

use scarp::prelude::*;

/// A square raster with base levels along every border.
pub fn bench_grid(side: usize) -> RasterGrid {
    RasterGrid::new(
        [side, side],
        [100.0, 100.0],
        BorderStatus::uniform(NodeStatus::FixedValue),
        Connectivity::Queen,
        &[],
    )
    .expect("valid bench grid")
}

/// Deterministic rough terrain with plenty of closed depressions.
pub fn bench_elevation(side: usize) -> Vec<f64> {
    (0..side * side)
        .map(|i| {
            let r = (i / side) as f64;
            let c = (i % side) as f64;
            (r * 0.17).sin() * 120.0 + (c * 0.23).cos() * 90.0 + ((r * c) * 0.011).sin() * 60.0
                + 500.0
        })
        .collect()
}
