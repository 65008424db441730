//! Shared test helpers for integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests, integration tests, and benchmarks (via the
//! `test-utils` feature).

use crate::config::GridConfig;
use crate::connect::ConnectType;
use crate::grid::ElectricGrid;
use crate::id::{BlockPos, NodeId};

// ===========================================================================
// Grid constructors
// ===========================================================================

/// Seed used by every helper grid.
pub const TEST_SEED: u64 = 0x5EED_0001;

/// Default config with a fixed seed.
pub fn seeded_grid() -> ElectricGrid {
    grid_with(GridConfig::seeded(TEST_SEED))
}

/// Fixed seed and no track losses, so balancing results are exact.
pub fn lossless_grid() -> ElectricGrid {
    grid_with(GridConfig {
        track_loss_per_tick: 0.0,
        ..GridConfig::seeded(TEST_SEED)
    })
}

pub fn grid_with(config: GridConfig) -> ElectricGrid {
    ElectricGrid::with_config(config).expect("test config is valid")
}

// ===========================================================================
// Node placement
// ===========================================================================

pub fn add(grid: &mut ElectricGrid, ty: ConnectType, x: i32, y: i32, z: i32) -> NodeId {
    grid.add_node(BlockPos::new(x, y, z), ty)
        .expect("test position is free")
}

pub fn track(grid: &mut ElectricGrid, x: i32, y: i32, z: i32) -> NodeId {
    add(grid, ConnectType::Track, x, y, z)
}

pub fn wire(grid: &mut ElectricGrid, x: i32, y: i32, z: i32) -> NodeId {
    add(grid, ConnectType::Wire, x, y, z)
}

pub fn block(grid: &mut ElectricGrid, x: i32, y: i32, z: i32) -> NodeId {
    add(grid, ConnectType::Block, x, y, z)
}

/// A straight run of `len` tracks along +x starting at the origin.
pub fn track_line(grid: &mut ElectricGrid, len: usize) -> Vec<NodeId> {
    (0..len as i32).map(|x| track(grid, x, 0, 0)).collect()
}

// ===========================================================================
// Charge helpers
// ===========================================================================

pub fn set_charge(grid: &mut ElectricGrid, id: NodeId, charge: f64) {
    grid.charge_handler_mut(id)
        .expect("node has a charge handler")
        .set_charge(charge);
}

/// Pin a handler's clock so tests can predict re-scan ticks.
pub fn set_phase(grid: &mut ElectricGrid, id: NodeId, clock: u32) {
    grid.charge_handler_mut(id)
        .expect("node has a charge handler")
        .set_clock(clock);
}

/// Refresh every node's neighbour cache.
pub fn connect_all(grid: &mut ElectricGrid) {
    let ids: Vec<NodeId> = grid.iter().map(|(id, _)| id).collect();
    for id in ids {
        grid.refresh_neighbors(id);
    }
}

pub fn charges(grid: &ElectricGrid, ids: &[NodeId]) -> Vec<f64> {
    ids.iter()
        .map(|&id| grid.charge(id).expect("node has a charge handler"))
        .collect()
}
