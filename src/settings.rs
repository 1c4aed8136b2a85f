//! Session configuration
//!
//! Everything a session is built from. Serialized as JSON so runs can be
//! reproduced from a file plus a seed.

use std::path::Path;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{Result, SimError};
use crate::sim::TerrainParams;

/// Terrain generation inputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// World x of the first anchor
    pub origin_x: f64,
    /// Horizontal extent of the terrain
    pub width: f64,
    /// Peak-to-peak height of the coarsest octave
    pub amplitude: f64,
    /// Number of landing pads, evenly spaced
    pub pad_count: u32,
    /// Noise layers; each doubles density and halves amplitude
    pub octaves: u32,
    pub pad_width: f64,
    pub pad_height: f64,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            origin_x: -8192.0,
            width: 16384.0,
            amplitude: ViewportConfig::default().height,
            pad_count: 16,
            octaves: DEFAULT_OCTAVES,
            pad_width: PAD_WIDTH,
            pad_height: PAD_HEIGHT,
        }
    }
}

/// Initial pose of the craft
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipConfig {
    pub start_x: f64,
    pub start_y: f64,
    /// Radians; π/2 enters the scene lying on its side
    pub start_rotation: f64,
    pub start_velocity: DVec2,
    /// Local geometry is drawn at radius 100, so 0.2 makes a 20-unit craft
    pub scale: f64,
}

impl Default for ShipConfig {
    fn default() -> Self {
        Self {
            start_x: 0.0,
            start_y: -1200.0,
            start_rotation: std::f64::consts::FRAC_PI_2,
            start_velocity: DVec2::new(0.1, 0.0),
            scale: 0.2,
        }
    }
}

/// Size of the view the camera target is computed for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub width: f64,
    pub height: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
        }
    }
}

/// Fuel rule. Off by default: the tank never drains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FuelConfig {
    /// When false, fuel is reported but never consumed
    pub constrained: bool,
    pub capacity: f64,
    /// Fuel burned per engine level per integrated tick
    pub burn_per_level: f64,
    /// Readouts flag fuel at or below this as not nominal
    pub low_threshold: f64,
}

impl Default for FuelConfig {
    fn default() -> Self {
        Self {
            constrained: false,
            capacity: 1000.0,
            burn_per_level: 0.05,
            low_threshold: 250.0,
        }
    }
}

/// Complete session configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// RNG seed for terrain and debris
    pub seed: u64,
    pub terrain: TerrainConfig,
    pub ship: ShipConfig,
    pub viewport: ViewportConfig,
    pub fuel: FuelConfig,
}

impl SimConfig {
    /// Parse a JSON configuration; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load a configuration file, falling back to defaults when it is unusable
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Using default config ({}): {err}", path.display());
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every value a session depends on
    pub fn validate(&self) -> Result<()> {
        TerrainParams::from_config(&self.terrain)?;

        let ship = &self.ship;
        for (name, value) in [
            ("ship.start_x", ship.start_x),
            ("ship.start_y", ship.start_y),
            ("ship.start_rotation", ship.start_rotation),
            ("ship.start_velocity.x", ship.start_velocity.x),
            ("ship.start_velocity.y", ship.start_velocity.y),
        ] {
            require(name, value, value.is_finite(), "a finite number")?;
        }
        require(
            "ship.scale",
            ship.scale,
            ship.scale.is_finite() && ship.scale > 0.0,
            "a positive number",
        )?;

        for (name, value) in [
            ("viewport.width", self.viewport.width),
            ("viewport.height", self.viewport.height),
        ] {
            require(name, value, value.is_finite() && value > 0.0, "a positive number")?;
        }

        for (name, value) in [
            ("fuel.capacity", self.fuel.capacity),
            ("fuel.burn_per_level", self.fuel.burn_per_level),
            ("fuel.low_threshold", self.fuel.low_threshold),
        ] {
            require(name, value, value.is_finite() && value >= 0.0, "a non-negative number")?;
        }

        Ok(())
    }
}

fn require(name: &'static str, value: f64, ok: bool, expected: &'static str) -> Result<()> {
    if ok {
        Ok(())
    } else {
        Err(SimError::InvalidConfig {
            name,
            value,
            expected,
        })
    }
}
