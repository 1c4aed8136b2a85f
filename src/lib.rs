//! Luni - a lunar lander simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (rigid bodies, terrain, collisions, game state)
//! - `settings`: Data-driven session configuration
//! - `error`: Construction-time validation errors
//!
//! Rendering, input capture and camera animation live outside this crate; the
//! core only produces and consumes plain data.

pub mod error;
pub mod settings;
pub mod sim;

pub use error::{Result, SimError};
pub use settings::{FuelConfig, ShipConfig, SimConfig, TerrainConfig, ViewportConfig};

use std::f64::consts::TAU;

/// Simulation constants
pub mod consts {
    /// Fixed simulation step, in engine time units (nominally ms per frame)
    pub const TICK_DT: f64 = 16.7;

    /// Lunar surface gravity in position units per tick unit squared
    pub const GRAVITY: f64 = 1.62 / 100_000.0;
    /// Linear velocity decay applied after every impulse
    pub const LINEAR_FRICTION: f64 = 0.998;
    /// Angular velocity decay for the craft
    pub const SHIP_ANGULAR_FRICTION: f64 = 0.92;
    /// Debris chunks spin forever
    pub const CHUNK_ANGULAR_FRICTION: f64 = 1.0;

    /// Engine level range; thrust = level / 8 * gravity
    pub const MAX_ENGINE_LEVEL: i32 = 12;
    pub const ENGINE_THRUST_DIVISOR: f64 = 8.0;
    /// Engine level above which an idle ship relaunches
    pub const LAUNCH_ENGINE_LEVEL: i32 = 4;

    /// Control step applied per rotate event
    pub const ROTATION_CONTROL_STEP: f64 = 0.0005;

    /// Touchdown envelope
    pub const LANDABLE_MAX_VX: f64 = 0.007;
    pub const LANDABLE_MAX_VY: f64 = 0.02;
    pub const LANDABLE_MAX_ROTATION: f64 = 0.3;

    /// Landing procedure steps
    pub const LAND_ROTATION_STEP: f64 = 0.005;
    pub const LAND_SETTLE_DISTANCE: f64 = 2.0;
    pub const LAND_DESCENT_STEP: f64 = 0.5;
    pub const LAUNCH_LIFT: f64 = 2.0;
    pub const LAUNCH_VELOCITY_Y: f64 = -0.1;

    /// Beyond this distance from the nearest anchor the craft is flying
    pub const HIT_TEST_DISTANCE: f64 = 200.0;
    /// Horizontal reach of the local hit-test window
    pub const HIT_TEST_REACH: f64 = 50.0;
    /// How far above the window's highest anchor the test polygons are closed
    pub const HIT_POLYGON_CLOSE: f64 = 50.0;
    /// Fewer pad anchors than this in the window means no pad polygon
    pub const MIN_PAD_ANCHORS: usize = 4;

    /// Terrain defaults
    pub const TERRAIN_SAMPLE_SPACING: f64 = 256.0;
    pub const DEFAULT_OCTAVES: u32 = 4;
    pub const PAD_WIDTH: f64 = 80.0;
    pub const PAD_HEIGHT: f64 = 4.0;

    /// Horizon search
    pub const HORIZON_TOLERANCE: f64 = 0.5;
    pub const HORIZON_MAX_ITERATIONS: u32 = 32;

    /// Debris
    pub const DEBRIS_CHUNK_COUNT: usize = 28;
    pub const CHUNK_MIN_LIFETIME: f64 = 3000.0;
    pub const CHUNK_LIFETIME_SPREAD: f64 = 2000.0;

    /// Camera scale limits
    pub const CAMERA_MIN_SCALE: f64 = 0.1;
    pub const CAMERA_MAX_SCALE: f64 = 1.5;
}

/// Keep a rotation within (-2π, 2π].
///
/// In-range values pass through unchanged. Anything else keeps its sign and
/// loses whole turns; exactly -2π and whole multiples of a turn fold to 0.
#[inline]
pub fn wrap_rotation(rotation: f64) -> f64 {
    if rotation.abs() < TAU || rotation == TAU {
        return rotation;
    }
    let wrapped = rotation % TAU;
    if wrapped == 0.0 { 0.0 } else { wrapped }
}
