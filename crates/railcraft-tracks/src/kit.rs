//! Track kit descriptors.
//!
//! A track kit turns a plain track into an advanced one (boosters,
//! detectors, electric track). The [`TrackKit`] descriptor holds the kit's
//! static properties; every outfitted track in the world owns a
//! [`TrackKitInstance`] created from it.

use std::fmt;
use std::sync::Arc;

use railcraft_core::connect::ConnectType;

use crate::resource::ResourceLocation;

// ---------------------------------------------------------------------------
// TrackType
// ---------------------------------------------------------------------------

/// The base track a kit is applied to (iron, reinforced, high speed...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct TrackType {
    pub name: String,
    /// Whether tracks of this type carry charge on their own.
    #[serde(default)]
    pub electric: bool,
}

impl TrackType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            electric: false,
        }
    }

    pub fn electric(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            electric: true,
        }
    }
}

// ---------------------------------------------------------------------------
// TrackKitInstance
// ---------------------------------------------------------------------------

/// Per-track behaviour of an outfitted track.
pub trait TrackKitInstance: fmt::Debug {
    /// Name of the kit that created this instance.
    fn kit_name(&self) -> &str;

    /// The grid type of this track, if it is electrified.
    fn connect_type(&self) -> Option<ConnectType> {
        None
    }

    /// Called every tick for kits that [require ticks](TrackKit::requires_ticks).
    fn update(&mut self) {}
}

/// Creates a fresh instance for a newly outfitted track.
pub type InstanceFactory = fn() -> Box<dyn TrackKitInstance>;

type TrackTypeFilter = Arc<dyn Fn(&TrackType) -> bool + Send + Sync>;

// ---------------------------------------------------------------------------
// TrackKit
// ---------------------------------------------------------------------------

/// Static description of a track kit.
#[derive(Clone)]
pub struct TrackKit {
    registry_name: ResourceLocation,
    factory: InstanceFactory,
    track_type_filter: TrackTypeFilter,
    allowed_on_slopes: bool,
    requires_ticks: bool,
    visible: bool,
    states: u32,
    max_support_distance: u32,
}

impl TrackKit {
    /// Start describing a kit. See [`TrackKitBuilder`] for the defaults.
    pub fn builder(registry_name: ResourceLocation, factory: InstanceFactory) -> TrackKitBuilder {
        TrackKitBuilder::new(registry_name, factory)
    }

    pub fn registry_name(&self) -> &ResourceLocation {
        &self.registry_name
    }

    /// Registry name flattened for use in resource paths:
    /// `railcraft:one_way` becomes `railcraft_one_way`.
    pub fn name(&self) -> String {
        self.registry_name
            .to_string()
            .replace(['.', ':'], "_")
    }

    pub fn resource_path_suffix(&self) -> String {
        self.name()
    }

    pub fn create_instance(&self) -> Box<dyn TrackKitInstance> {
        (self.factory)()
    }

    pub fn states(&self) -> u32 {
        self.states
    }

    pub fn is_allowed_on_slopes(&self) -> bool {
        self.allowed_on_slopes
    }

    pub fn max_support_distance(&self) -> u32 {
        self.max_support_distance
    }

    pub fn requires_ticks(&self) -> bool {
        self.requires_ticks
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_allowed_track_type(&self, track_type: &TrackType) -> bool {
        (self.track_type_filter)(track_type)
    }
}

impl fmt::Debug for TrackKit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackKit")
            .field("registry_name", &self.registry_name)
            .field("allowed_on_slopes", &self.allowed_on_slopes)
            .field("requires_ticks", &self.requires_ticks)
            .field("visible", &self.visible)
            .field("states", &self.states)
            .field("max_support_distance", &self.max_support_distance)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for TrackKit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TrackKit{{{}}}", self.name())
    }
}

// ---------------------------------------------------------------------------
// TrackKitBuilder
// ---------------------------------------------------------------------------

/// Builder for [`TrackKit`].
///
/// Defaults: allowed on slopes, no ticking, visible, one state, no support
/// distance, every track type allowed.
pub struct TrackKitBuilder {
    registry_name: ResourceLocation,
    factory: InstanceFactory,
    track_type_filter: TrackTypeFilter,
    allowed_on_slopes: bool,
    requires_ticks: bool,
    visible: bool,
    states: u32,
    max_support_distance: u32,
}

impl TrackKitBuilder {
    pub fn new(registry_name: ResourceLocation, factory: InstanceFactory) -> Self {
        Self {
            registry_name,
            factory,
            track_type_filter: Arc::new(|_| true),
            allowed_on_slopes: true,
            requires_ticks: false,
            visible: true,
            states: 1,
            max_support_distance: 0,
        }
    }

    pub fn states(mut self, states: u32) -> Self {
        self.states = states;
        self
    }

    pub fn allowed_on_slopes(mut self, allowed: bool) -> Self {
        self.allowed_on_slopes = allowed;
        self
    }

    pub fn max_support_distance(mut self, distance: u32) -> Self {
        self.max_support_distance = distance;
        self
    }

    pub fn track_type_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&TrackType) -> bool + Send + Sync + 'static,
    {
        self.track_type_filter = Arc::new(filter);
        self
    }

    pub fn requires_ticks(mut self, requires_ticks: bool) -> Self {
        self.requires_ticks = requires_ticks;
        self
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn build(self) -> TrackKit {
        TrackKit {
            registry_name: self.registry_name,
            factory: self.factory,
            track_type_filter: self.track_type_filter,
            allowed_on_slopes: self.allowed_on_slopes,
            requires_ticks: self.requires_ticks,
            visible: self.visible,
            states: self.states,
            max_support_distance: self.max_support_distance,
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
