use crate::id::NodeId;

/// Events emitted by [`ElectricGrid::tick`](crate::grid::ElectricGrid::tick).
///
/// Hosts use these for debugging overlays and for noticing dead sections
/// of track. Nothing in the grid depends on them being consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridEvent {
    /// A node re-scanned its surroundings.
    NeighborsRefreshed {
        node: NodeId,
        /// Number of mutually connected neighbours found.
        count: usize,
        tick: u64,
    },
    /// A cached neighbour was destroyed, unloaded, or lost its handler.
    NeighborPruned {
        node: NodeId,
        neighbor: NodeId,
        tick: u64,
    },
    /// A node that held charge at the end of the previous tick is now empty.
    Depleted { node: NodeId, tick: u64 },
}
