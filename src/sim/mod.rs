//! Deterministic simulation module
//!
//! All flight logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - No rendering, input or platform dependencies

pub mod body;
pub mod camera;
pub mod collision;
pub mod debris;
pub mod debug;
pub mod geometry;
pub mod ship;
pub mod state;
pub mod terrain;
pub mod tick;

pub use body::{Ballistic, Dynamics, RigidBody};
pub use camera::CameraTarget;
pub use collision::{HitTest, TerrainQuery, hit_test, terrain_info_near};
pub use debris::{Chunk, ChunkSnapshot, Debris};
pub use debug::{DebugSink, NullDebugSink, RecordingDebugSink};
pub use geometry::{Pose, point_in_polygon};
pub use ship::{Landable, LanderGeometry, Propulsion, Ship, ShipSnapshot};
pub use state::{
    Craft, CraftSnapshot, Game, GameEvent, GamePhase, Gauge, Readout, StatusMessage, World,
};
pub use terrain::{Horizon, Pad, Rounding, Terrain, TerrainParams};
pub use tick::{ControlEvent, TickInput, tick};
