//! Whole-grid snapshots.
//!
//! Binary serialization via `bitcode` with a versioned header. A snapshot
//! records every node's position, validity and handler (type, loss rate,
//! charge) plus the grid config, tick counter and RNG state. Node ids are
//! reassigned on load; neighbour caches and draw averages start empty and
//! rebuild within one search interval.

use serde::{Deserialize, Serialize};

use crate::charge::ChargeHandler;
use crate::config::GridConfig;
use crate::connect::ConnectType;
use crate::grid::{ElectricGrid, GridError};
use crate::id::BlockPos;
use crate::rng::GridRng;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic number identifying a grid snapshot.
pub const SNAPSHOT_MAGIC: u32 = 0x2A11_0001;

/// Current format version. Increment when breaking the wire format.
pub const FORMAT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur during serialization.
#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    #[error("bitcode encoding failed: {0}")]
    Encode(String),
}

/// Errors that can occur during deserialization.
#[derive(Debug, thiserror::Error)]
pub enum DeserializeError {
    #[error("invalid magic number: expected 0x{:08X}, got 0x{:08X}", SNAPSHOT_MAGIC, .0)]
    InvalidMagic(u32),
    #[error("unsupported format version: expected {}, got {}", FORMAT_VERSION, .0)]
    UnsupportedVersion(u32),
    #[error("snapshot from future version {0} (this build supports up to {FORMAT_VERSION})")]
    FutureVersion(u32),
    #[error("bitcode decoding failed: {0}")]
    Decode(String),
    #[error("snapshot does not rebuild: {0}")]
    Rebuild(#[from] GridError),
}

// ---------------------------------------------------------------------------
// Snapshot header
// ---------------------------------------------------------------------------

/// Header prepended to every serialized snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotHeader {
    pub magic: u32,
    pub version: u32,
    /// Grid tick at the time the snapshot was taken.
    pub tick: u64,
}

impl SnapshotHeader {
    pub fn new(tick: u64) -> Self {
        Self {
            magic: SNAPSHOT_MAGIC,
            version: FORMAT_VERSION,
            tick,
        }
    }

    pub fn validate(&self) -> Result<(), DeserializeError> {
        if self.magic != SNAPSHOT_MAGIC {
            return Err(DeserializeError::InvalidMagic(self.magic));
        }
        if self.version > FORMAT_VERSION {
            return Err(DeserializeError::FutureVersion(self.version));
        }
        if self.version < FORMAT_VERSION {
            return Err(DeserializeError::UnsupportedVersion(self.version));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Snapshot body
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
struct GridSnapshot {
    header: SnapshotHeader,
    config: GridConfig,
    rng: GridRng,
    nodes: Vec<NodeRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct NodeRecord {
    position: BlockPos,
    valid: bool,
    handler: Option<HandlerRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct HandlerRecord {
    connect_type: ConnectType,
    loss_per_tick: f64,
    capacity: f64,
    charge: f64,
}

impl From<&ChargeHandler> for HandlerRecord {
    fn from(h: &ChargeHandler) -> Self {
        Self {
            connect_type: h.connect_type(),
            loss_per_tick: h.losses(),
            capacity: h.capacity(),
            charge: h.charge(),
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Serialize the grid to bytes.
pub fn serialize_grid(grid: &ElectricGrid) -> Result<Vec<u8>, SerializeError> {
    let snapshot = GridSnapshot {
        header: SnapshotHeader::new(grid.current_tick()),
        config: grid.config().clone(),
        rng: grid.rng().clone(),
        nodes: grid
            .iter()
            .map(|(_, node)| NodeRecord {
                position: node.position(),
                valid: node.is_valid(),
                handler: node.charge_handler().map(HandlerRecord::from),
            })
            .collect(),
    };
    bitcode::serialize(&snapshot).map_err(|e| SerializeError::Encode(e.to_string()))
}

/// Read only the header, for version checks before a full load.
pub fn read_snapshot_header(data: &[u8]) -> Result<SnapshotHeader, DeserializeError> {
    let snapshot: GridSnapshot =
        bitcode::deserialize(data).map_err(|e| DeserializeError::Decode(e.to_string()))?;
    Ok(snapshot.header)
}

/// Rebuild a grid from bytes produced by [`serialize_grid`].
pub fn deserialize_grid(data: &[u8]) -> Result<ElectricGrid, DeserializeError> {
    let snapshot: GridSnapshot =
        bitcode::deserialize(data).map_err(|e| DeserializeError::Decode(e.to_string()))?;
    if let Err(e) = snapshot.header.validate() {
        log::warn!("rejecting grid snapshot: {e}");
        return Err(e);
    }

    let mut grid = ElectricGrid::with_config(snapshot.config)?;
    for record in snapshot.nodes {
        let id = match record.handler {
            Some(h) => {
                let mut handler = ChargeHandler::with_loss(h.connect_type, h.loss_per_tick)
                    .with_capacity(h.capacity);
                handler.set_charge(h.charge);
                grid.insert_handler(record.position, handler)?
            }
            None => grid.add_passive_node(record.position)?,
        };
        if !record.valid {
            grid.invalidate(id);
        }
    }
    grid.restore_clock(snapshot.header.tick, snapshot.rng);
    Ok(grid)
}

// ===========================================================================
// Tests
// ===========================================================================
