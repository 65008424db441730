//! Per-node charge storage.
//!
//! A [`ChargeHandler`] is owned by exactly one grid node. It stores the
//! node's charge, applies the per-tick loss, keeps a smoothed draw
//! statistic for consumers, and caches the ids of the neighbours it
//! balances against. The neighbour cache holds [`NodeId`]s only; it never
//! keeps another node alive.

use std::collections::BTreeMap;

use crate::connect::{ConnectType, ConnectTypeSet};
use crate::id::{BlockPos, NodeId};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default nominal capacity of a handler.
pub const MAX_CHARGE: f64 = 10000.0;

/// Default loss per tick for [`ConnectType::Track`] handlers.
pub const TRACK_LOSS_PER_TICK: f64 = 0.05;

/// Ticks between neighbour re-scans.
pub const SEARCH_INTERVAL: u32 = 64;

/// Smoothing window of the draw moving average, in ticks.
pub const DRAW_WINDOW: f64 = 50.0;

// ---------------------------------------------------------------------------
// ChargeHandler
// ---------------------------------------------------------------------------

/// Charge state of a single grid node.
#[derive(Debug, Clone, PartialEq)]
pub struct ChargeHandler {
    connect_type: ConnectType,
    charge: f64,
    capacity: f64,
    loss_per_tick: f64,
    /// Moving average of charge removed per tick.
    draw: f64,
    /// Charge removed since the last tick.
    last_tick_draw: f64,
    pub(crate) neighbors: Vec<NodeId>,
    clock: u32,
    /// Whether the handler held charge at the end of the previous tick.
    pub(crate) had_charge: bool,
}

impl ChargeHandler {
    /// Create a handler with the default loss for its type: tracks leak
    /// [`TRACK_LOSS_PER_TICK`], everything else is lossless.
    pub fn new(connect_type: ConnectType) -> Self {
        let loss = match connect_type {
            ConnectType::Track => TRACK_LOSS_PER_TICK,
            ConnectType::Wire | ConnectType::Block => 0.0,
        };
        Self::with_loss(connect_type, loss)
    }

    /// Create a handler with an explicit loss per tick.
    pub fn with_loss(connect_type: ConnectType, loss_per_tick: f64) -> Self {
        Self {
            connect_type,
            charge: 0.0,
            capacity: MAX_CHARGE,
            loss_per_tick,
            draw: 0.0,
            last_tick_draw: 0.0,
            neighbors: Vec::new(),
            clock: 0,
            had_charge: false,
        }
    }

    /// Override the nominal capacity reported by [`capacity`](Self::capacity).
    #[must_use]
    pub fn with_capacity(mut self, capacity: f64) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the starting clock phase. The grid assigns a random phase to
    /// every handler it receives.
    #[must_use]
    pub fn with_phase(mut self, clock: u32) -> Self {
        self.clock = clock;
        self
    }

    // -- Accessors --

    pub fn charge(&self) -> f64 {
        self.charge
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Configured loss per tick.
    pub fn losses(&self) -> f64 {
        self.loss_per_tick
    }

    /// Smoothed charge removed per tick.
    pub fn draw(&self) -> f64 {
        self.draw
    }

    pub fn connect_type(&self) -> ConnectType {
        self.connect_type
    }

    pub fn clock(&self) -> u32 {
        self.clock
    }

    pub(crate) fn set_clock(&mut self, clock: u32) {
        self.clock = clock;
    }

    /// Cached neighbours, in balancing order.
    pub fn neighbors(&self) -> &[NodeId] {
        &self.neighbors
    }

    /// Candidate neighbour positions for a handler placed at `pos`.
    pub fn possible_connection_locations(&self, pos: BlockPos) -> BTreeMap<BlockPos, ConnectTypeSet> {
        self.connect_type.possible_connection_locations(pos)
    }

    // -- Quantity operations --

    /// Overwrite the stored charge.
    pub fn set_charge(&mut self, charge: f64) {
        self.charge = charge;
    }

    /// Add charge. Not clamped to [`MAX_CHARGE`]; callers that fill a
    /// handler check [`capacity`](Self::capacity) themselves.
    pub fn add_charge(&mut self, amount: f64) {
        self.charge += amount;
    }

    /// Remove up to `request` and return the amount actually removed.
    ///
    /// The removed amount counts toward this tick's draw.
    pub fn remove_charge(&mut self, request: f64) -> f64 {
        let removed = if self.charge >= request {
            self.charge -= request;
            request
        } else {
            let available = self.charge;
            self.charge = 0.0;
            available
        };
        self.last_tick_draw += removed;
        removed
    }

    /// Set both handlers to the mean of their charges.
    pub fn balance(&mut self, other: &mut ChargeHandler) {
        let half = (self.charge + other.charge) / 2.0;
        self.charge = half;
        other.charge = half;
    }

    // -- Tick --

    /// Run the node-local part of a tick: advance the clock, apply losses
    /// and fold the last tick's draw into the moving average.
    ///
    /// Returns `true` if the handler still holds charge to share with its
    /// neighbours.
    pub fn advance(&mut self, draw_window: f64) -> bool {
        self.clock = self.clock.wrapping_add(1);
        self.remove_losses();

        self.draw = (self.draw * (draw_window - 1.0) + self.last_tick_draw) / draw_window;
        self.last_tick_draw = 0.0;

        self.charge > 0.0
    }

    /// Whether the clock has reached a re-scan tick.
    pub fn search_due(&self, interval: u32) -> bool {
        self.clock % interval == 0
    }

    fn remove_losses(&mut self) {
        if self.loss_per_tick > 0.0 {
            if self.charge >= self.loss_per_tick {
                self.charge -= self.loss_per_tick;
            } else {
                self.charge = 0.0;
            }
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
