//! Spatial supports for the scarp landscape evolution engine.
//!
//! This crate defines the [`Grid`] trait, the uniform topology/geometry
//! interface consumed by flow routing and the eroders, along with three
//! concrete backends:
//!
//! - [`ProfileGrid`]: 1-D profile with uniform spacing
//! - [`RasterGrid`]: 2-D raster with rook/queen connectivity and
//!   per-border statuses (including periodic `Looped` borders)
//! - [`TriMesh`]: 2-D unstructured triangular mesh with precomputed
//!   adjacency and mixed-Voronoi vertex areas
//!
//! Node statuses are validated at construction and immutable afterwards.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod grid;
pub mod profile;
pub mod raster;
pub mod trimesh;

#[cfg(test)]
pub(crate) mod compliance;

pub use error::GridError;
pub use grid::{Grid, Neighbor};
pub use profile::ProfileGrid;
pub use raster::{BorderStatus, Connectivity, RasterGrid};
pub use trimesh::TriMesh;
