//! Neighbour discovery.
//!
//! A link between two nodes exists only when both sides accept it: the
//! node's candidate set at the neighbour's position must contain the
//! neighbour's type, and the neighbour's candidate set at the node's
//! position must contain the node's type. A wire below a track therefore
//! links (the track accepts anything below it, the wire accepts anything
//! above it) while a wire beside a track does not.

use crate::grid::GridNode;
use crate::id::{BlockPos, NodeId};

/// Read access to the host world.
///
/// [`ElectricGrid`](crate::grid::ElectricGrid) implements this over its own
/// arena; hosts with their own block storage can implement it directly.
pub trait GridWorld {
    /// The node at `pos`, if any.
    fn lookup(&self, pos: BlockPos) -> Option<NodeId>;

    /// Resolve a node id. Destroyed nodes resolve to `None`.
    fn node(&self, id: NodeId) -> Option<&GridNode>;

    /// Whether `id` resolves to a valid node that has a charge handler.
    fn is_live(&self, id: NodeId) -> bool {
        self.node(id)
            .is_some_and(|n| n.is_valid() && n.charge_handler().is_some())
    }
}

/// All nodes mutually connected to `id`, in candidate position order.
///
/// Returns an empty list if `id` does not resolve or has no handler.
pub fn mutually_connected<W: GridWorld + ?Sized>(world: &W, id: NodeId) -> Vec<NodeId> {
    let Some(node) = world.node(id) else {
        return Vec::new();
    };
    let Some(handler) = node.charge_handler() else {
        return Vec::new();
    };
    let pos = node.position();
    let ty = handler.connect_type();

    ty.possible_connection_locations(pos)
        .into_iter()
        .filter_map(|(candidate, accepted)| {
            let other_id = world.lookup(candidate)?;
            if other_id == id {
                return None;
            }
            let other = world.node(other_id)?;
            if !other.is_valid() {
                return None;
            }
            let other_ty = other.charge_handler()?.connect_type();
            if !accepted.contains(other_ty) {
                return None;
            }
            let back = other_ty.accepts_at(candidate, pos)?;
            back.contains(ty).then_some(other_id)
        })
        .collect()
}

/// Whether `a` and `b` would link to each other.
pub fn is_mutually_connected<W: GridWorld + ?Sized>(world: &W, a: NodeId, b: NodeId) -> bool {
    mutually_connected(world, a).contains(&b)
}

// ===========================================================================
// Tests
// ===========================================================================
