//! Placing outfitted tracks on the electric grid.

use railcraft_core::connect::ConnectType;
use railcraft_core::grid::{ElectricGrid, GridError};
use railcraft_core::id::{BlockPos, NodeId};

use crate::kit::{TrackKit, TrackKitInstance, TrackType};

/// Errors from outfitting a track.
#[derive(Debug, thiserror::Error)]
pub enum KitError {
    #[error("{kit} cannot be applied to {track_type} track")]
    TrackTypeNotAllowed { kit: String, track_type: String },
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// An outfitted track in the world.
#[derive(Debug)]
pub struct OutfittedTrack {
    pub position: BlockPos,
    pub track_type: TrackType,
    pub instance: Box<dyn TrackKitInstance>,
    /// The grid node, for electrified tracks.
    pub node: Option<NodeId>,
}

/// Apply `kit` to a `track_type` track at `pos`.
///
/// The track joins `grid` if either the kit instance or the track type is
/// electrified.
pub fn place_on_grid(
    kit: &TrackKit,
    track_type: &TrackType,
    grid: &mut ElectricGrid,
    pos: BlockPos,
) -> Result<OutfittedTrack, KitError> {
    if !kit.is_allowed_track_type(track_type) {
        return Err(KitError::TrackTypeNotAllowed {
            kit: kit.name(),
            track_type: track_type.name.clone(),
        });
    }
    let instance = kit.create_instance();
    let connect_type = instance
        .connect_type()
        .or(track_type.electric.then_some(ConnectType::Track));
    let node = match connect_type {
        Some(ty) => Some(grid.add_node(pos, ty)?),
        None => None,
    };
    Ok(OutfittedTrack {
        position: pos,
        track_type: track_type.clone(),
        instance,
        node,
    })
}

/// Remove an outfitted track and its grid node.
pub fn remove_from_grid(track: OutfittedTrack, grid: &mut ElectricGrid) {
    if let Some(node) = track.node {
        grid.remove_node(node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use railcraft_core::test_utils::seeded_grid;
    use railcraft_core::traversal::GridWorld;

    use crate::resource::ResourceLocation;

    #[derive(Debug)]
    struct Booster;

    impl TrackKitInstance for Booster {
        fn kit_name(&self) -> &str {
            "railcraft_booster"
        }
    }

    #[derive(Debug)]
    struct Electric;

    impl TrackKitInstance for Electric {
        fn kit_name(&self) -> &str {
            "railcraft_electric"
        }

        fn connect_type(&self) -> Option<ConnectType> {
            Some(ConnectType::Track)
        }
    }

    fn booster() -> Box<dyn TrackKitInstance> {
        Box::new(Booster)
    }

    fn electric() -> Box<dyn TrackKitInstance> {
        Box::new(Electric)
    }

    #[test]
    fn plain_kit_on_plain_track_stays_off_grid() {
        let mut grid = seeded_grid();
        let kit = TrackKit::builder(ResourceLocation::railcraft("booster"), booster).build();
        let placed =
            place_on_grid(&kit, &TrackType::new("iron"), &mut grid, BlockPos::ORIGIN).unwrap();
        assert!(placed.node.is_none());
        assert!(grid.is_empty());
    }

    #[test]
    fn electric_kit_joins_grid() {
        let mut grid = seeded_grid();
        let kit = TrackKit::builder(ResourceLocation::railcraft("electric"), electric).build();
        let placed =
            place_on_grid(&kit, &TrackType::new("iron"), &mut grid, BlockPos::ORIGIN).unwrap();
        let node = placed.node.unwrap();
        assert_eq!(grid.lookup(BlockPos::ORIGIN), Some(node));
        assert_eq!(
            grid.charge_handler(node).unwrap().connect_type(),
            ConnectType::Track
        );

        remove_from_grid(placed, &mut grid);
        assert!(grid.is_empty());
    }

    #[test]
    fn electric_track_type_joins_grid() {
        let mut grid = seeded_grid();
        let kit = TrackKit::builder(ResourceLocation::railcraft("booster"), booster).build();
        let placed = place_on_grid(
            &kit,
            &TrackType::electric("electric"),
            &mut grid,
            BlockPos::ORIGIN,
        )
        .unwrap();
        assert!(placed.node.is_some());
    }

    #[test]
    fn filtered_track_type_rejected() {
        let mut grid = seeded_grid();
        let kit = TrackKit::builder(ResourceLocation::railcraft("electric"), electric)
            .track_type_filter(|t| t.name != "wooden")
            .build();
        let err = place_on_grid(&kit, &TrackType::new("wooden"), &mut grid, BlockPos::ORIGIN)
            .unwrap_err();
        assert!(matches!(err, KitError::TrackTypeNotAllowed { .. }));
        assert!(grid.is_empty());
    }

    #[test]
    fn occupied_position_surfaces_grid_error() {
        let mut grid = seeded_grid();
        let kit = TrackKit::builder(ResourceLocation::railcraft("electric"), electric).build();
        let iron = TrackType::new("iron");
        place_on_grid(&kit, &iron, &mut grid, BlockPos::ORIGIN).unwrap();
        let err = place_on_grid(&kit, &iron, &mut grid, BlockPos::ORIGIN).unwrap_err();
        assert!(matches!(err, KitError::Grid(GridError::Occupied(_))));
    }
}
