//! Flow direction kinds used by the operator pipeline.

use std::fmt;

/// The kind of flow stored in a flow graph at a given pipeline stage.
///
/// Operators declare the direction kind they expect on input and the kind
/// they produce; the pipeline validates adjacent pairs at construction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FlowDirection {
    /// No flow information yet (or none required).
    #[default]
    Undefined,
    /// Exactly one receiver per node (steepest descent).
    Single,
    /// Up to `Kmax` weighted receivers per node.
    Multi,
}

impl fmt::Display for FlowDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Undefined => "undefined",
            Self::Single => "single",
            Self::Multi => "multi",
        };
        write!(f, "{name}")
    }
}
