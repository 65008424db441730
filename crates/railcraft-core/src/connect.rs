//! Connection types and the geometric adjacency rules of the grid.
//!
//! Every charge handler has a [`ConnectType`] that decides which nearby
//! positions it may link through and which types it accepts at each of
//! them. The rules are fixed and purely geometric; they define the
//! connectivity players see in the world.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::id::{BlockPos, Direction};

// ---------------------------------------------------------------------------
// ConnectType
// ---------------------------------------------------------------------------

/// The category of a grid node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConnectType {
    /// Electrified rails. Link horizontally, diagonally along slopes, and
    /// downward.
    Track,
    /// Feeder wires and cables.
    Wire,
    /// Any other electrified block; links on all six faces.
    Block,
}

impl ConnectType {
    pub const ALL: [ConnectType; 3] = [ConnectType::Track, ConnectType::Wire, ConnectType::Block];

    const fn bit(self) -> u8 {
        match self {
            ConnectType::Track => 1 << 0,
            ConnectType::Wire => 1 << 1,
            ConnectType::Block => 1 << 2,
        }
    }

    /// Candidate neighbour positions around `pos` and the types each of
    /// them accepts.
    pub fn possible_connection_locations(self, pos: BlockPos) -> BTreeMap<BlockPos, ConnectTypeSet> {
        match self {
            ConnectType::Track => track_locations(pos),
            ConnectType::Wire => wire_locations(pos),
            ConnectType::Block => block_locations(pos),
        }
    }

    /// The types this node accepts at `candidate`, or `None` if `candidate`
    /// is not one of its connection locations.
    pub fn accepts_at(self, pos: BlockPos, candidate: BlockPos) -> Option<ConnectTypeSet> {
        self.possible_connection_locations(pos).get(&candidate).copied()
    }
}

fn track_locations(pos: BlockPos) -> BTreeMap<BlockPos, ConnectTypeSet> {
    let all = ConnectTypeSet::all();
    let not_wire = ConnectTypeSet::all_except(ConnectType::Wire);
    let track = ConnectTypeSet::only(ConnectType::Track);

    let mut positions = BTreeMap::new();

    positions.insert(pos.add(1, 0, 0), not_wire);
    positions.insert(pos.add(-1, 0, 0), not_wire);

    positions.insert(pos.add(1, 1, 0), track);
    positions.insert(pos.add(1, -1, 0), track);
    positions.insert(pos.add(-1, 1, 0), track);
    positions.insert(pos.add(-1, -1, 0), track);

    positions.insert(pos.below(), all);

    positions.insert(pos.add(0, 0, 1), not_wire);
    positions.insert(pos.add(0, 0, -1), not_wire);

    positions.insert(pos.add(0, 1, 1), track);
    positions.insert(pos.add(0, -1, 1), track);
    positions.insert(pos.add(0, 1, -1), track);
    positions.insert(pos.add(0, -1, -1), track);

    positions
}

fn wire_locations(pos: BlockPos) -> BTreeMap<BlockPos, ConnectTypeSet> {
    let all = ConnectTypeSet::all();
    let not_track = ConnectTypeSet::all_except(ConnectType::Track);

    let mut positions = BTreeMap::new();
    positions.insert(pos.add(1, 0, 0), not_track);
    positions.insert(pos.add(-1, 0, 0), not_track);
    positions.insert(pos.above(), all);
    positions.insert(pos.below(), not_track);
    positions.insert(pos.add(0, 0, 1), not_track);
    positions.insert(pos.add(0, 0, -1), not_track);
    positions
}

fn block_locations(pos: BlockPos) -> BTreeMap<BlockPos, ConnectTypeSet> {
    Direction::ALL
        .iter()
        .map(|&dir| (pos.offset(dir), ConnectTypeSet::all()))
        .collect()
}

// ---------------------------------------------------------------------------
// ConnectTypeSet
// ---------------------------------------------------------------------------

/// A set of [`ConnectType`]s, stored as a bit mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ConnectTypeSet(u8);

impl ConnectTypeSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn all() -> Self {
        Self(ConnectType::Track.bit() | ConnectType::Wire.bit() | ConnectType::Block.bit())
    }

    pub const fn only(ty: ConnectType) -> Self {
        Self(ty.bit())
    }

    /// Every type except `ty`.
    pub const fn all_except(ty: ConnectType) -> Self {
        Self(Self::all().0 & !ty.bit())
    }

    pub const fn contains(self, ty: ConnectType) -> bool {
        self.0 & ty.bit() != 0
    }

    #[must_use]
    pub const fn with(self, ty: ConnectType) -> Self {
        Self(self.0 | ty.bit())
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(self) -> impl Iterator<Item = ConnectType> {
        ConnectType::ALL.into_iter().filter(move |ty| self.contains(*ty))
    }
}

impl FromIterator<ConnectType> for ConnectTypeSet {
    fn from_iter<I: IntoIterator<Item = ConnectType>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), Self::with)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
