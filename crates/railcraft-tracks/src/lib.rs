//! Track kits and minecart helpers for the Railcraft grid.
//!
//! - [`kit::TrackKit`] describes a kit; [`kit::TrackKitBuilder`] builds one
//!   with sensible defaults.
//! - [`kit::TrackKitInstance`] is the per-track behaviour a kit creates.
//!   Electrified instances report a [`ConnectType`](railcraft_core::connect::ConnectType)
//!   and join the grid through [`electric::place_on_grid`].
//! - [`cart::CartFilter`] decides whether a cart matches an item filter.

pub mod cart;
pub mod electric;
pub mod kit;
pub mod resource;

pub use cart::CartFilter;
pub use electric::{KitError, OutfittedTrack, place_on_grid, remove_from_grid};
pub use kit::{InstanceFactory, TrackKit, TrackKitBuilder, TrackKitInstance, TrackType};
pub use resource::{ResourceLocation, ResourceLocationError};
