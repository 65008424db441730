//! Railcraft Core -- the electric grid behind electrified track.
//!
//! Every electrified block (track, feeder wire, or any other powered
//! block) is a node in an implicit graph. Nodes discover their neighbours
//! from fixed geometric rules, share charge with them by pairwise
//! averaging, and lose a little charge every tick if they are track.
//!
//! # Tick
//!
//! Each call to [`grid::ElectricGrid::tick`] advances every valid node by
//! one tick:
//!
//! 1. **Local** -- Advance the clock, apply losses, update the draw average.
//! 2. **Re-scan** -- Every `search_interval` ticks (staggered per node)
//!    rebuild the neighbour cache.
//! 3. **Prune** -- Drop neighbours that were destroyed or unloaded.
//! 4. **Balance** -- Average charge with each neighbour in turn.
//!
//! # Key Types
//!
//! - [`grid::ElectricGrid`] -- Node arena, position index and tick loop.
//! - [`charge::ChargeHandler`] -- Per-node charge, losses and draw.
//! - [`connect::ConnectType`] -- Track, Wire or Block, with adjacency rules.
//! - [`traversal::GridWorld`] -- Host world access used for neighbour
//!   discovery.
//! - [`persist`] -- Per-node save data.
//! - [`serialize`] -- Versioned whole-grid snapshots via bitcode.

pub mod charge;
pub mod config;
pub mod connect;
pub mod event;
pub mod grid;
pub mod id;
pub mod persist;
pub mod rng;
pub mod serialize;
pub mod traversal;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
