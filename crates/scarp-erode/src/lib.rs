//! Erosion processes for the scarp landscape evolution engine.
//!
//! Two eroders produce per-step elevation increments from the grid and
//! the flow graph:
//!
//! - [`SplEroder`]: bedrock channel erosion under the stream-power law,
//!   solved implicitly per node in topological order;
//! - [`DiffusionAdiEroder`]: linear hillslope diffusion on a raster by
//!   the alternating-direction-implicit scheme.
//!
//! Both own their scratch buffers, sized at construction, and are meant
//! to be reused across simulation steps.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod diffusion_adi;
pub mod error;
pub mod spl;

pub(crate) mod tridiagonal;

pub use diffusion_adi::DiffusionAdiEroder;
pub use error::EroderError;
pub use spl::{KCoef, SplEroder};
