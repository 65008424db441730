//! Grid tuning parameters.
//!
//! The defaults reproduce the stock behaviour of the grid. Hosts may load
//! overrides from TOML (feature `config-loader`).

use serde::{Deserialize, Serialize};

use crate::charge::{DRAW_WINDOW, MAX_CHARGE, SEARCH_INTERVAL, TRACK_LOSS_PER_TICK};

/// Errors that can occur while loading or validating a [`GridConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[cfg(feature = "config-loader")]
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("search_interval must be at least 1")]
    ZeroSearchInterval,
    #[error("draw_window must be at least 1, got {0}")]
    InvalidDrawWindow(f64),
    #[error("track_loss_per_tick must be non-negative, got {0}")]
    NegativeLoss(f64),
    #[error("max_charge must be positive and finite, got {0}")]
    InvalidCapacity(f64),
}

/// Tuning parameters for an [`ElectricGrid`](crate::grid::ElectricGrid).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Ticks between neighbour re-scans.
    pub search_interval: u32,
    /// Loss per tick given to track handlers created by the grid.
    pub track_loss_per_tick: f64,
    /// Nominal capacity given to handlers created by the grid.
    pub max_charge: f64,
    /// Smoothing window of the draw moving average, in ticks.
    pub draw_window: f64,
    /// Seed for clock phases. `None` seeds from the system clock.
    pub seed: Option<u64>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            search_interval: SEARCH_INTERVAL,
            track_loss_per_tick: TRACK_LOSS_PER_TICK,
            max_charge: MAX_CHARGE,
            draw_window: DRAW_WINDOW,
            seed: None,
        }
    }
}

impl GridConfig {
    /// Default config with a fixed seed. Tests use this for reproducible
    /// clock phases.
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    /// Check the invariants the tick loop relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.search_interval == 0 {
            return Err(ConfigError::ZeroSearchInterval);
        }
        if self.draw_window.is_nan() || self.draw_window < 1.0 {
            return Err(ConfigError::InvalidDrawWindow(self.draw_window));
        }
        if self.track_loss_per_tick.is_nan() || self.track_loss_per_tick < 0.0 {
            return Err(ConfigError::NegativeLoss(self.track_loss_per_tick));
        }
        if !self.max_charge.is_finite() || self.max_charge <= 0.0 {
            return Err(ConfigError::InvalidCapacity(self.max_charge));
        }
        Ok(())
    }

    /// Parse and validate a config from TOML. Missing keys take defaults.
    #[cfg(feature = "config-loader")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: GridConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }
}
