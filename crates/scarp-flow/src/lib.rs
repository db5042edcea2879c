//! Flow routing for the scarp landscape evolution engine.
//!
//! The crate is organized around three layers:
//!
//! - [`FlowGraphImpl`]: compact receiver/donor/order/basin storage with
//!   the flow accumulation primitive;
//! - [`FlowOperator`]: modular operators (routers, sink resolvers,
//!   snapshots) applied in sequence to mutate the graph and the working
//!   elevation, validated at construction;
//! - [`FlowGraph`]: the outer handle tying a grid, an operator sequence,
//!   and keyed snapshot stores together behind `update_routes`.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod flow_graph;
pub mod graph_impl;
pub mod mst;
pub mod operator;
pub mod pflood;
pub mod pipeline;
pub mod router_multi;
pub mod router_single;
pub mod snapshot;

pub(crate) mod float;

pub use error::{FlowError, OperatorError, PipelineError};
pub use flow_graph::FlowGraph;
pub use graph_impl::FlowGraphImpl;
pub use mst::{BasinMethod, MstSinkResolver, RouteMethod};
pub use operator::{FlowOperator, OperatorContext};
pub use pflood::PFloodSinkResolver;
pub use router_multi::MultiFlowRouter;
pub use router_single::SingleFlowRouter;
pub use snapshot::FlowSnapshot;
