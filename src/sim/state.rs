//! Session state
//!
//! A `Game` owns everything one session needs: the validated configuration,
//! the seeded RNG, the current phase and, once started, the terrain and the
//! craft flying over it.

use std::fmt;

use glam::DVec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::camera::CameraTarget;
use super::debris::{ChunkSnapshot, Debris};
use super::debug::{DebugSink, NullDebugSink};
use super::ship::{Landable, Ship, ShipSnapshot};
use super::terrain::{Terrain, TerrainParams};
use crate::error::Result;
use crate::settings::SimConfig;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Terrain and ship are built on the next tick
    Starting,
    /// Under player control
    Flying,
    /// Automatic touchdown on a pad
    Landing,
    /// The ship breaks up on the next tick
    Crashing,
    /// Resting on a pad or scattered as debris
    Idle,
}

/// Whatever is left of the lander
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Craft {
    Ship(Ship),
    Debris(Debris),
}

impl Craft {
    pub fn ship(&self) -> Option<&Ship> {
        match self {
            Craft::Ship(ship) => Some(ship),
            Craft::Debris(_) => None,
        }
    }

    pub fn ship_mut(&mut self) -> Option<&mut Ship> {
        match self {
            Craft::Ship(ship) => Some(ship),
            Craft::Debris(_) => None,
        }
    }

    pub fn debris(&self) -> Option<&Debris> {
        match self {
            Craft::Debris(debris) => Some(debris),
            Craft::Ship(_) => None,
        }
    }

    /// Advance whichever body is present
    pub fn tick(&mut self) {
        match self {
            Craft::Ship(ship) => ship.tick(),
            Craft::Debris(debris) => debris.tick(),
        }
    }

    pub fn snapshot(&self) -> CraftSnapshot {
        match self {
            Craft::Ship(ship) => CraftSnapshot::Ship(ship.snapshot()),
            Craft::Debris(debris) => CraftSnapshot::Debris(debris.snapshot()),
        }
    }
}

/// Render-side view of the craft
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CraftSnapshot {
    Ship(ShipSnapshot),
    Debris(Vec<ChunkSnapshot>),
}

/// Terrain and craft of a started session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    pub terrain: Terrain,
    pub craft: Craft,
}

/// Player-facing status line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusMessage {
    Start,
    Landed,
    Crashed,
    /// Hide the current message
    Cleared,
}

impl StatusMessage {
    pub fn text(&self) -> &'static str {
        match self {
            StatusMessage::Start => {
                "Land the ship on the flat pads. Use left/right arrows to rotate and up/down arrows to control thrust."
            }
            StatusMessage::Landed => "The Eagle has landed! Increase thrust to take off again.",
            StatusMessage::Crashed => {
                "You just blew a billion dollar hole in NASA's budget. Sad! (restart to try again)"
            }
            StatusMessage::Cleared => "",
        }
    }
}

/// Something that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    PhaseChanged { from: GamePhase, to: GamePhase },
    Status(StatusMessage),
    TouchedDown { at: DVec2 },
    Crashed { at: DVec2 },
    Launched,
}

/// One instrument value and whether it is inside the safe range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gauge {
    pub value: f64,
    pub nominal: bool,
}

/// Instrument panel values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Readout {
    pub landable: Landable,
    /// Horizontal speed, scaled by 100 for display
    pub vx: Gauge,
    /// Vertical speed, scaled by 100 for display
    pub vy: Gauge,
    pub rotation: Gauge,
    pub engine_level: i32,
    pub engine_fraction: f64,
    /// Present only when fuel is constrained
    pub fuel: Option<Gauge>,
}

impl Readout {
    pub fn from_ship(ship: &Ship) -> Self {
        let landable = ship.landable();
        let low_fuel = ship.fuel_rule().low_threshold;
        Self {
            landable,
            vx: Gauge {
                value: landable.vx * 100.0,
                nominal: landable.vx_okay,
            },
            vy: Gauge {
                value: landable.vy * 100.0,
                nominal: landable.vy_okay,
            },
            rotation: Gauge {
                value: landable.rotation,
                nominal: landable.rotation_okay,
            },
            engine_level: ship.engine_level(),
            engine_fraction: ship.engine_fraction(),
            fuel: ship.fuel_level().map(|value| Gauge {
                value,
                nominal: value > low_fuel,
            }),
        }
    }
}

/// A full session
pub struct Game {
    pub(crate) config: SimConfig,
    pub(crate) terrain_params: TerrainParams,
    pub(crate) rng: Pcg32,
    pub(crate) phase: GamePhase,
    pub(crate) world: Option<World>,
    pub(crate) camera: CameraTarget,
    /// Events from the most recent tick
    pub(crate) events: Vec<GameEvent>,
    pub(crate) time_ticks: u64,
    pub(crate) debug: Box<dyn DebugSink>,
}

impl fmt::Debug for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Game")
            .field("phase", &self.phase)
            .field("time_ticks", &self.time_ticks)
            .field("camera", &self.camera)
            .field("craft", &self.world.as_ref().map(|w| &w.craft))
            .finish_non_exhaustive()
    }
}

impl Game {
    /// Validate `config` and prepare a session. Nothing is built until the
    /// first tick.
    pub fn new(config: SimConfig) -> Result<Self> {
        config.validate()?;
        let terrain_params = TerrainParams::from_config(&config.terrain)?;
        Ok(Self {
            rng: Pcg32::seed_from_u64(config.seed),
            config,
            terrain_params,
            phase: GamePhase::Starting,
            world: None,
            camera: CameraTarget::default(),
            events: Vec::new(),
            time_ticks: 0,
            debug: Box::new(NullDebugSink),
        })
    }

    /// Report diagnostic shapes to `sink` instead of discarding them
    pub fn with_debug_sink(mut self, sink: Box<dyn DebugSink>) -> Self {
        self.debug = sink;
        self
    }

    /// Begin a fresh session over new terrain with the ship at
    /// `(ship_x, ship_y)`. Replaces any previous terrain and craft and
    /// returns the initial camera target.
    pub fn start_session(
        &mut self,
        origin_x: f64,
        width: f64,
        amplitude: f64,
        pad_count: u32,
        ship_x: f64,
        ship_y: f64,
    ) -> Result<CameraTarget> {
        let mut config = self.config.clone();
        config.terrain.origin_x = origin_x;
        config.terrain.width = width;
        config.terrain.amplitude = amplitude;
        config.terrain.pad_count = pad_count;
        config.ship.start_x = ship_x;
        config.ship.start_y = ship_y;
        config.validate()?;

        self.terrain_params = TerrainParams::from_config(&config.terrain)?;
        self.config = config;
        self.phase = GamePhase::Starting;
        self.events.clear();
        super::tick::tick(self, &super::tick::TickInput::default());
        Ok(self.camera)
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    /// Latest camera target
    pub fn camera(&self) -> CameraTarget {
        self.camera
    }

    /// Events raised by the most recent tick
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn terrain(&self) -> Option<&Terrain> {
        self.world.as_ref().map(|w| &w.terrain)
    }

    pub fn craft(&self) -> Option<&Craft> {
        self.world.as_ref().map(|w| &w.craft)
    }

    pub fn ship(&self) -> Option<&Ship> {
        self.craft().and_then(Craft::ship)
    }

    pub fn ship_mut(&mut self) -> Option<&mut Ship> {
        self.world.as_mut().and_then(|w| w.craft.ship_mut())
    }

    pub fn snapshot(&self) -> Option<CraftSnapshot> {
        self.craft().map(Craft::snapshot)
    }

    /// Instrument values while the ship is flying or touching down
    pub fn readout(&self) -> Option<Readout> {
        match self.phase {
            GamePhase::Flying | GamePhase::Landing => self.ship().map(Readout::from_ship),
            _ => None,
        }
    }

    /// Build terrain and ship from the current configuration
    pub(crate) fn build_world(&mut self) {
        let terrain = Terrain::generate(&self.terrain_params, &mut self.rng);
        let ship_config = &self.config.ship;
        let mut ship = Ship::new(
            DVec2::new(ship_config.start_x, ship_config.start_y),
            ship_config.scale,
            self.config.fuel.clone(),
        );
        ship.set_rotation(ship_config.start_rotation);
        ship.body.velocity = ship_config.start_velocity;

        log::info!(
            "Session started: seed {}, {} anchors, {} pads, ship at ({:.1}, {:.1})",
            self.config.seed,
            terrain.anchors().len(),
            terrain.pads().len(),
            ship_config.start_x,
            ship_config.start_y
        );

        self.world = Some(World {
            terrain,
            craft: Craft::Ship(ship),
        });
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }
}
