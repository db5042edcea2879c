//! Per-node boundary status.

use std::fmt;

/// Boundary condition attached to a single grid node.
///
/// Statuses are fixed at grid construction and drive both flow routing
/// (which nodes terminate flow, which are skipped) and the eroders'
/// boundary handling.
///
/// # Examples
///
/// ```
/// use scarp_core::NodeStatus;
///
/// assert!(NodeStatus::FixedValue.is_base_level());
/// assert!(!NodeStatus::Core.is_base_level());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum NodeStatus {
    /// Interior node, fully traversed.
    #[default]
    Core,
    /// Dirichlet base level: flow terminates here, elevation is pinned.
    FixedValue,
    /// Neumann boundary: zero-flux for diffusion, traversed for routing.
    FixedGradient,
    /// Periodic boundary, paired with the opposite border node.
    Looped,
    /// Present in the arrays but never traversed and never a neighbor.
    Ghost,
}

impl NodeStatus {
    /// Whether flow terminates at a node with this status.
    pub fn is_base_level(self) -> bool {
        self == NodeStatus::FixedValue
    }

    /// Whether routing skips this node entirely.
    pub fn is_ghost(self) -> bool {
        self == NodeStatus::Ghost
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Core => "core",
            Self::FixedValue => "fixed_value",
            Self::FixedGradient => "fixed_gradient",
            Self::Looped => "looped",
            Self::Ghost => "ghost",
        };
        write!(f, "{name}")
    }
}
