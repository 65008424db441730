//! The electric grid: node arena, position index and the tick loop.
//!
//! # Tick
//!
//! Each call to [`ElectricGrid::tick`] runs every valid node with a charge
//! handler through the following steps, in arena order:
//!
//! 1. Advance the handler's clock, apply losses, update the draw average.
//! 2. Stop if the handler is empty (nothing to share).
//! 3. On re-scan ticks (`clock % search_interval == 0`) rebuild the
//!    neighbour cache from [`traversal::mutually_connected`].
//! 4. Drop cached neighbours that were destroyed, unloaded, or lost their
//!    handler.
//! 5. Balance with every remaining neighbour, one pair at a time, in cache
//!    order.
//!
//! Balancing is sequential: with three or more neighbours the final
//! distribution depends on the order, which is the candidate position
//! order of the adjacency rules.

use std::collections::HashMap;

use slotmap::SlotMap;

use crate::charge::ChargeHandler;
use crate::config::{ConfigError, GridConfig};
use crate::connect::ConnectType;
use crate::event::GridEvent;
use crate::id::{BlockPos, NodeId};
use crate::rng::GridRng;
use crate::traversal::{self, GridWorld};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from grid placement.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    #[error("position {0} is already occupied")]
    Occupied(BlockPos),
    #[error("invalid grid config: {0}")]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// GridNode
// ---------------------------------------------------------------------------

/// A block participating in the grid.
#[derive(Debug, Clone)]
pub struct GridNode {
    position: BlockPos,
    valid: bool,
    handler: Option<ChargeHandler>,
}

impl GridNode {
    pub fn position(&self) -> BlockPos {
        self.position
    }

    /// `false` while the node is unloaded.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn charge_handler(&self) -> Option<&ChargeHandler> {
        self.handler.as_ref()
    }

    pub fn charge_handler_mut(&mut self) -> Option<&mut ChargeHandler> {
        self.handler.as_mut()
    }
}

// ---------------------------------------------------------------------------
// ElectricGrid
// ---------------------------------------------------------------------------

/// Owns every grid node and runs the charge simulation.
#[derive(Debug)]
pub struct ElectricGrid {
    nodes: SlotMap<NodeId, GridNode>,
    positions: HashMap<BlockPos, NodeId>,
    config: GridConfig,
    rng: GridRng,
    tick: u64,
}

impl Default for ElectricGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl ElectricGrid {
    /// Create an empty grid with the default config.
    pub fn new() -> Self {
        Self::build(GridConfig::default())
    }

    /// Create an empty grid, validating `config` first.
    pub fn with_config(config: GridConfig) -> Result<Self, GridError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: GridConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => GridRng::new(seed),
            None => GridRng::from_entropy(),
        };
        Self {
            nodes: SlotMap::with_key(),
            positions: HashMap::new(),
            config,
            rng,
            tick: 0,
        }
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Number of completed ticks.
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    pub(crate) fn rng(&self) -> &GridRng {
        &self.rng
    }

    pub(crate) fn restore_clock(&mut self, tick: u64, rng: GridRng) {
        self.tick = tick;
        self.rng = rng;
    }

    // -- Placement --

    /// Place a node with a fresh handler of the given type.
    ///
    /// Handlers get the configured capacity. Track handlers also get the
    /// configured track loss; other types are lossless.
    pub fn add_node(&mut self, pos: BlockPos, connect_type: ConnectType) -> Result<NodeId, GridError> {
        let handler = match connect_type {
            ConnectType::Track => {
                ChargeHandler::with_loss(connect_type, self.config.track_loss_per_tick)
            }
            ConnectType::Wire | ConnectType::Block => ChargeHandler::new(connect_type),
        };
        self.insert_handler(pos, handler.with_capacity(self.config.max_charge))
    }

    /// Place a node that owns `handler`. The handler's clock is given a
    /// random phase so re-scans spread over the search interval.
    pub fn insert_handler(&mut self, pos: BlockPos, mut handler: ChargeHandler) -> Result<NodeId, GridError> {
        handler.set_clock(self.rng.next_u32());
        handler.neighbors.clear();
        handler.had_charge = false;
        self.insert(pos, Some(handler))
    }

    /// Place a node without a charge handler. It occupies the position but
    /// never links.
    pub fn add_passive_node(&mut self, pos: BlockPos) -> Result<NodeId, GridError> {
        self.insert(pos, None)
    }

    fn insert(&mut self, pos: BlockPos, handler: Option<ChargeHandler>) -> Result<NodeId, GridError> {
        if self.positions.contains_key(&pos) {
            return Err(GridError::Occupied(pos));
        }
        let id = self.nodes.insert(GridNode {
            position: pos,
            valid: true,
            handler,
        });
        self.positions.insert(pos, id);
        Ok(id)
    }

    /// Destroy a node. Neighbours drop it from their caches on their next
    /// tick.
    pub fn remove_node(&mut self, id: NodeId) -> Option<GridNode> {
        let node = self.nodes.remove(id)?;
        self.positions.remove(&node.position);
        Some(node)
    }

    /// Mark a node unloaded. It stops ticking and neighbours prune it, but
    /// it keeps its charge. Returns `false` if `id` does not resolve.
    pub fn invalidate(&mut self, id: NodeId) -> bool {
        self.set_valid(id, false)
    }

    /// Mark an unloaded node loaded again.
    pub fn revalidate(&mut self, id: NodeId) -> bool {
        self.set_valid(id, true)
    }

    fn set_valid(&mut self, id: NodeId, valid: bool) -> bool {
        match self.nodes.get_mut(id) {
            Some(node) => {
                node.valid = valid;
                true
            }
            None => false,
        }
    }

    // -- Queries --

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Iterate `(id, node)` in arena order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &GridNode)> {
        self.nodes.iter()
    }

    pub fn charge_handler(&self, id: NodeId) -> Option<&ChargeHandler> {
        self.nodes.get(id)?.charge_handler()
    }

    pub fn charge_handler_mut(&mut self, id: NodeId) -> Option<&mut ChargeHandler> {
        self.nodes.get_mut(id)?.charge_handler_mut()
    }

    /// Charge held by `id`, or `None` if it has no handler.
    pub fn charge(&self, id: NodeId) -> Option<f64> {
        self.charge_handler(id).map(ChargeHandler::charge)
    }

    /// Sum of charge over every node, valid or not.
    pub fn total_charge(&self) -> f64 {
        self.nodes
            .values()
            .filter_map(GridNode::charge_handler)
            .map(ChargeHandler::charge)
            .sum()
    }

    /// Nodes mutually connected to `id` right now.
    pub fn mutually_connected(&self, id: NodeId) -> Vec<NodeId> {
        traversal::mutually_connected(self, id)
    }

    // -- Simulation --

    /// Rebuild the neighbour cache of `id` immediately. Returns the number
    /// of neighbours found, or `None` if `id` has no handler.
    pub fn refresh_neighbors(&mut self, id: NodeId) -> Option<usize> {
        let found = traversal::mutually_connected(self, id);
        let handler = self.charge_handler_mut(id)?;
        handler.neighbors = found;
        log::debug!("node {id:?} refreshed {} neighbours", handler.neighbors.len());
        Some(handler.neighbors.len())
    }

    /// Advance every valid node by one tick.
    pub fn tick(&mut self) -> Vec<GridEvent> {
        let mut events = Vec::new();
        let ids: Vec<NodeId> = self.nodes.keys().collect();
        for id in ids {
            self.tick_node(id, &mut events);
        }
        self.tick += 1;
        events
    }

    /// Advance a single node by one tick. Hosts that drive their own update
    /// loop call this once per node per tick instead of [`tick`](Self::tick).
    pub fn tick_node(&mut self, id: NodeId, events: &mut Vec<GridEvent>) {
        let tick = self.tick;
        let draw_window = self.config.draw_window;
        let interval = self.config.search_interval;

        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        if !node.valid {
            return;
        }
        let Some(handler) = node.handler.as_mut() else {
            return;
        };

        let was_charged = handler.had_charge || handler.charge() > 0.0;
        let has_charge = handler.advance(draw_window);
        handler.had_charge = has_charge;
        if !has_charge {
            if was_charged {
                events.push(GridEvent::Depleted { node: id, tick });
            }
            return;
        }
        let search_due = handler.search_due(interval);

        if search_due {
            if let Some(count) = self.refresh_neighbors(id) {
                events.push(GridEvent::NeighborsRefreshed {
                    node: id,
                    count,
                    tick,
                });
            }
        }

        let cached = self
            .charge_handler(id)
            .map(|h| h.neighbors.clone())
            .unwrap_or_default();
        let (live, stale): (Vec<NodeId>, Vec<NodeId>) =
            cached.into_iter().partition(|&n| self.is_live(n));
        for neighbor in stale {
            log::debug!("node {id:?} pruned stale neighbour {neighbor:?}");
            events.push(GridEvent::NeighborPruned {
                node: id,
                neighbor,
                tick,
            });
        }

        for &neighbor in &live {
            if let Some([a, b]) = self.nodes.get_disjoint_mut([id, neighbor]) {
                if let (Some(ha), Some(hb)) = (a.handler.as_mut(), b.handler.as_mut()) {
                    ha.balance(hb);
                    log::trace!("balanced {id:?} with {neighbor:?} at {}", ha.charge());
                }
            }
        }

        if let Some(handler) = self.charge_handler_mut(id) {
            handler.neighbors = live;
        }
    }
}

impl GridWorld for ElectricGrid {
    fn lookup(&self, pos: BlockPos) -> Option<NodeId> {
        self.positions.get(&pos).copied()
    }

    fn node(&self, id: NodeId) -> Option<&GridNode> {
        self.nodes.get(id)
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charge::{MAX_CHARGE, SEARCH_INTERVAL};
    use crate::test_utils::*;

    #[test]
    fn add_and_lookup() {
        let mut grid = seeded_grid();
        let pos = BlockPos::new(4, 64, 4);
        let id = grid.add_node(pos, ConnectType::Wire).unwrap();
        assert_eq!(grid.lookup(pos), Some(id));
        assert_eq!(grid.node(id).unwrap().position(), pos);
        assert_eq!(grid.len(), 1);
    }

    #[test]
    fn occupied_position_rejected() {
        let mut grid = seeded_grid();
        grid.add_node(BlockPos::ORIGIN, ConnectType::Track).unwrap();
        let err = grid.add_node(BlockPos::ORIGIN, ConnectType::Wire).unwrap_err();
        assert!(matches!(err, GridError::Occupied(p) if p == BlockPos::ORIGIN));
    }

    #[test]
    fn remove_frees_position() {
        let mut grid = seeded_grid();
        let id = track(&mut grid, 0, 0, 0);
        assert!(grid.remove_node(id).is_some());
        assert_eq!(grid.lookup(BlockPos::ORIGIN), None);
        assert!(!grid.contains(id));
        assert!(grid.remove_node(id).is_none());
        track(&mut grid, 0, 0, 0);
    }

    #[test]
    fn invalid_config_rejected() {
        let config = GridConfig {
            search_interval: 0,
            ..GridConfig::seeded(1)
        };
        assert!(matches!(
            ElectricGrid::with_config(config),
            Err(GridError::Config(ConfigError::ZeroSearchInterval))
        ));
    }

    #[test]
    fn track_loss_comes_from_config() {
        let config = GridConfig {
            track_loss_per_tick: 0.5,
            ..GridConfig::seeded(1)
        };
        let mut grid = ElectricGrid::with_config(config).unwrap();
        let t = track(&mut grid, 0, 0, 0);
        let w = wire(&mut grid, 5, 0, 0);
        assert_eq!(grid.charge_handler(t).unwrap().losses(), 0.5);
        assert_eq!(grid.charge_handler(w).unwrap().losses(), 0.0);
    }

    #[test]
    fn capacity_comes_from_config() {
        let config = GridConfig {
            max_charge: 500.0,
            ..GridConfig::seeded(1)
        };
        let mut grid = ElectricGrid::with_config(config).unwrap();
        for id in [track(&mut grid, 0, 0, 0), wire(&mut grid, 5, 0, 0), block(&mut grid, 9, 0, 0)] {
            assert_eq!(grid.charge_handler(id).unwrap().capacity(), 500.0);
        }
    }

    #[test]
    fn phases_are_staggered() {
        let mut grid = seeded_grid();
        let ids = track_line(&mut grid, 32);
        let mut phases: Vec<u32> = ids
            .iter()
            .map(|&id| grid.charge_handler(id).unwrap().clock() % SEARCH_INTERVAL)
            .collect();
        phases.sort_unstable();
        phases.dedup();
        assert!(phases.len() > 8, "phases bunched: {phases:?}");
    }

    #[test]
    fn two_tracks_balance_in_one_tick() {
        let mut grid = lossless_grid();
        let a = track(&mut grid, 0, 0, 0);
        let b = track(&mut grid, 1, 0, 0);
        set_charge(&mut grid, a, 100.0);
        grid.refresh_neighbors(a);
        grid.refresh_neighbors(b);

        grid.tick();

        assert_eq!(grid.charge(a), Some(50.0));
        assert_eq!(grid.charge(b), Some(50.0));
    }

    #[test]
    fn tracks_link_across_world_edge() {
        let mut grid = lossless_grid();
        let a = track(&mut grid, i32::MAX, 0, 0);
        let b = track(&mut grid, i32::MIN, 0, 0);
        set_charge(&mut grid, a, 100.0);
        connect_all(&mut grid);
        assert_eq!(grid.mutually_connected(a), vec![b]);

        grid.tick();

        assert_eq!(charges(&grid, &[a, b]), vec![50.0, 50.0]);
    }

    #[test]
    fn lone_track_drains_to_zero_at_tick_twenty() {
        let mut grid = seeded_grid();
        let t = track(&mut grid, 0, 0, 0);
        set_charge(&mut grid, t, 1.0);
        for _ in 0..19 {
            grid.tick();
        }
        assert!(grid.charge(t).unwrap() > 0.0);
        let events = grid.tick();
        assert_eq!(grid.charge(t), Some(0.0));
        assert!(events.contains(&GridEvent::Depleted { node: t, tick: 19 }));
    }

    #[test]
    fn loss_matches_closed_form() {
        let config = GridConfig {
            track_loss_per_tick: 0.25,
            ..GridConfig::seeded(3)
        };
        let mut grid = ElectricGrid::with_config(config).unwrap();
        let t = track(&mut grid, 0, 0, 0);
        set_charge(&mut grid, t, 10.0);
        for n in 1..=50u32 {
            grid.tick();
            let expected = (10.0 - f64::from(n) * 0.25).max(0.0);
            assert_eq!(grid.charge(t), Some(expected), "after {n} ticks");
        }
    }

    #[test]
    fn depleted_fires_once() {
        let mut grid = seeded_grid();
        let t = track(&mut grid, 0, 0, 0);
        set_charge(&mut grid, t, 0.05);
        let events = grid.tick();
        assert_eq!(events.len(), 1);
        assert!(grid.tick().is_empty());
    }

    #[test]
    fn empty_node_does_not_rescan() {
        let mut grid = lossless_grid();
        let a = block(&mut grid, 0, 0, 0);
        block(&mut grid, 1, 0, 0);
        for _ in 0..(SEARCH_INTERVAL * 2) {
            grid.tick();
        }
        assert!(grid.charge_handler(a).unwrap().neighbors().is_empty());
    }

    #[test]
    fn charged_node_discovers_neighbours_within_interval() {
        let mut grid = lossless_grid();
        let a = block(&mut grid, 0, 0, 0);
        let b = block(&mut grid, 0, 1, 0);
        set_charge(&mut grid, a, 64.0);

        let mut refreshed = false;
        for _ in 0..SEARCH_INTERVAL {
            let events = grid.tick();
            refreshed |= events.iter().any(|e| {
                matches!(e, GridEvent::NeighborsRefreshed { node, count: 1, .. } if *node == a)
            });
        }
        assert!(refreshed);
        assert_eq!(grid.charge(a), grid.charge(b));
        assert_eq!(grid.total_charge(), 64.0);
    }

    #[test]
    fn removed_neighbour_is_pruned() {
        let mut grid = lossless_grid();
        let a = block(&mut grid, 0, 0, 0);
        let b = block(&mut grid, 1, 0, 0);
        set_charge(&mut grid, a, 10.0);
        set_phase(&mut grid, a, 1);
        grid.refresh_neighbors(a);
        grid.remove_node(b);

        let events = grid.tick();

        assert!(events.contains(&GridEvent::NeighborPruned {
            node: a,
            neighbor: b,
            tick: 0
        }));
        assert!(grid.charge_handler(a).unwrap().neighbors().is_empty());
        assert_eq!(grid.charge(a), Some(10.0));
    }

    #[test]
    fn unloaded_node_neither_ticks_nor_balances() {
        let mut grid = lossless_grid();
        let a = block(&mut grid, 0, 0, 0);
        let b = block(&mut grid, 1, 0, 0);
        set_charge(&mut grid, a, 10.0);
        set_charge(&mut grid, b, 30.0);
        grid.refresh_neighbors(a);
        grid.invalidate(b);

        grid.tick();

        assert_eq!(grid.charge(a), Some(10.0));
        assert_eq!(grid.charge(b), Some(30.0));

        grid.revalidate(b);
        grid.refresh_neighbors(a);
        grid.tick();
        assert_eq!(grid.charge(a), grid.charge(b));
    }

    #[test]
    fn balancing_is_sequential() {
        let mut grid = lossless_grid();
        let center = block(&mut grid, 0, 0, 0);
        let west = block(&mut grid, -1, 0, 0);
        let east = block(&mut grid, 1, 0, 0);
        set_charge(&mut grid, center, 80.0);
        for id in [center, west, east] {
            grid.refresh_neighbors(id);
        }
        // Only the center holds charge; tick it alone.
        let mut events = Vec::new();
        grid.tick_node(center, &mut events);

        // west first: (80 + 0) / 2 = 40 each; then east: (40 + 0) / 2 = 20.
        assert_eq!(grid.charge(west), Some(40.0));
        assert_eq!(grid.charge(center), Some(20.0));
        assert_eq!(grid.charge(east), Some(20.0));
    }

    #[test]
    fn consumer_draw_is_tracked() {
        let mut grid = lossless_grid();
        let motor = block(&mut grid, 0, 0, 0);
        set_charge(&mut grid, motor, MAX_CHARGE);
        for _ in 0..200 {
            let h = grid.charge_handler_mut(motor).unwrap();
            assert_eq!(h.remove_charge(5.0), 5.0);
            grid.tick();
        }
        let draw = grid.charge_handler(motor).unwrap().draw();
        // 1 - (49/50)^200 of the steady state 5.0.
        assert!(draw > 4.8 && draw < 5.0, "draw {draw}");
    }

    #[test]
    fn tick_counter_advances() {
        let mut grid = seeded_grid();
        assert_eq!(grid.current_tick(), 0);
        grid.tick();
        grid.tick();
        assert_eq!(grid.current_tick(), 2);
    }
}
