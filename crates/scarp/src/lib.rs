//! scarp: a landscape evolution engine.
//!
//! Given a topographic elevation field on a discrete support, scarp
//! computes a flow graph describing how water and sediment drain
//! downslope, corrects closed depressions so every node reaches a base
//! level, and erodes the surface under bedrock-channel (stream power)
//! and hillslope (linear diffusion) processes. The engine is consumed
//! step by step by an outer simulation loop.
//!
//! This is the facade crate re-exporting the public API of the scarp
//! workspace. For most users a single `scarp` dependency is sufficient.
//!
//! # Quick start
//!
//! ```
//! use scarp::prelude::*;
//! use std::sync::Arc;
//!
//! // 1. A 2-D raster with base levels along every border.
//! let grid = RasterGrid::new(
//!     [20, 20],
//!     [100.0, 100.0],
//!     BorderStatus::uniform(NodeStatus::FixedValue),
//!     Connectivity::Queen,
//!     &[],
//! )
//! .unwrap();
//!
//! // 2. Flow graph: steepest descent + MST depression resolution.
//! let mut flow = FlowGraph::new(
//!     Arc::new(grid),
//!     vec![
//!         Box::new(SingleFlowRouter::new()),
//!         Box::new(MstSinkResolver::default()),
//!     ],
//! )
//! .unwrap();
//!
//! // 3. One simulation step.
//! let mut elevation: Vec<f64> = (0..400)
//!     .map(|i| ((i / 20) as f64 * 0.13).sin() * 40.0 + ((i % 20) as f64) * 2.0 + 100.0)
//!     .collect();
//! let corrected = flow.update_routes(&elevation).unwrap().to_vec();
//! let drainage = flow.accumulate_scalar(1.0).unwrap();
//!
//! let mut spl = SplEroder::new(&flow, 1e-4, 0.5, 1.0, 1e-6).unwrap();
//! let erosion = spl.erode(&flow, &corrected, &drainage, 1000.0).unwrap();
//! for (h, e) in elevation.iter_mut().zip(erosion) {
//!     *h -= e;
//! }
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `scarp-core` | Node status, flow direction, constants |
//! | [`grid`] | `scarp-grid` | `Grid` trait, profile/raster/trimesh |
//! | [`flow`] | `scarp-flow` | Flow graph, operators, sink resolvers |
//! | [`erode`] | `scarp-erode` | Stream-power and diffusion eroders |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core vocabulary types (`scarp-core`).
pub mod types {
    pub use scarp_core::*;
}

/// Spatial supports (`scarp-grid`).
pub mod grid {
    pub use scarp_grid::*;
}

/// Flow routing (`scarp-flow`).
pub mod flow {
    pub use scarp_flow::*;
}

/// Erosion processes (`scarp-erode`).
pub mod erode {
    pub use scarp_erode::*;
}

/// The most commonly used items in one import.
pub mod prelude {
    pub use scarp_core::{FlowDirection, NodeStatus};
    pub use scarp_erode::{DiffusionAdiEroder, EroderError, KCoef, SplEroder};
    pub use scarp_flow::{
        BasinMethod, FlowError, FlowGraph, FlowOperator, FlowSnapshot, MstSinkResolver,
        MultiFlowRouter, PFloodSinkResolver, PipelineError, RouteMethod, SingleFlowRouter,
    };
    pub use scarp_grid::{
        BorderStatus, Connectivity, Grid, GridError, Neighbor, ProfileGrid, RasterGrid, TriMesh,
    };
}
