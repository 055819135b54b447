//! Tour configuration file: the scene catalog plus interaction tuning.
//!
//! Every section falls back to the built-in demo tour, so `{}` is a valid
//! config and a file only needs to carry what it changes.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::catalog::SceneCatalog;
use crate::contour::ContourConfig;
use crate::error::ConfigError;
use crate::viewer::Orientation;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionConfig {
    /// Pointer moves closer together than this are dropped.
    #[serde(default = "InteractionConfig::default_throttle_ms")]
    pub throttle_ms: u64,
    #[serde(default)]
    pub contour: ContourConfig,
    /// Camera used when entering a room.
    #[serde(default)]
    pub default_orientation: Orientation,
}

impl InteractionConfig {
    fn default_throttle_ms() -> u64 {
        80
    }

    pub fn throttle_window(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            throttle_ms: Self::default_throttle_ms(),
            contour: ContourConfig::default(),
            default_orientation: Orientation::default(),
        }
    }
}

/// Zoom limits applied by viewers that own their camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FovLimits {
    #[serde(default = "FovLimits::default_min")]
    pub min_hfov: f32,
    #[serde(default = "FovLimits::default_max")]
    pub max_hfov: f32,
}

impl FovLimits {
    fn default_min() -> f32 {
        50.0
    }

    fn default_max() -> f32 {
        120.0
    }

    pub fn clamp(&self, hfov: f32) -> f32 {
        let (low, high) = if self.min_hfov <= self.max_hfov {
            (self.min_hfov, self.max_hfov)
        } else {
            (self.max_hfov, self.min_hfov)
        };
        hfov.clamp(low, high)
    }
}

impl Default for FovLimits {
    fn default() -> Self {
        Self {
            min_hfov: Self::default_min(),
            max_hfov: Self::default_max(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TourConfig {
    #[serde(default = "SceneCatalog::builtin")]
    pub catalog: SceneCatalog,
    #[serde(default)]
    pub interaction: InteractionConfig,
    #[serde(default)]
    pub fov: FovLimits,
}

impl TourConfig {
    pub fn builtin() -> Self {
        Self {
            catalog: SceneCatalog::builtin(),
            interaction: InteractionConfig::default(),
            fov: FovLimits::default(),
        }
    }

    /// Parses and validates a config document.
    pub fn from_json(data: &str) -> Result<Self, ConfigError> {
        let config: TourConfig = serde_json::from_str(data)?;
        config.catalog.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&data)?;
        log::info!(
            "loaded tour config {} ({} rooms, {} hotspot colors)",
            path.display(),
            config.catalog.rooms().len(),
            config.catalog.hotspots().len()
        );
        Ok(config)
    }
}

impl Default for TourConfig {
    fn default() -> Self {
        Self::builtin()
    }
}
