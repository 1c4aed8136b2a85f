//! Fixed timestep simulation tick
//!
//! One call advances the session by exactly one step. The current phase picks
//! a state function, which mutates the world and returns the next phase.

use serde::{Deserialize, Serialize};

use super::camera::CameraTarget;
use super::collision::{HitTest, hit_test};
use super::debris::Debris;
use super::state::{Craft, Game, GameEvent, GamePhase, StatusMessage, World};
use crate::consts::*;

/// A single discrete control input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlEvent {
    RotateLeft,
    RotateRight,
    ThrottleUp,
    ThrottleDown,
}

/// Input for a single tick
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TickInput {
    /// Control events received since the previous tick, in arrival order
    pub controls: Vec<ControlEvent>,
}

impl TickInput {
    pub fn with_controls(controls: impl IntoIterator<Item = ControlEvent>) -> Self {
        Self {
            controls: controls.into_iter().collect(),
        }
    }
}

/// Advance the session by one step
pub fn tick(game: &mut Game, input: &TickInput) {
    game.events.clear();
    game.time_ticks += 1;

    apply_controls(game, &input.controls);

    let from = game.phase;
    let to = match from {
        GamePhase::Starting => starting(game),
        GamePhase::Flying => flying(game),
        GamePhase::Landing => landing(game),
        GamePhase::Crashing => crashing(game),
        GamePhase::Idle => idle(game),
    };

    if to != from {
        log::info!("Phase {:?} -> {:?} at tick {}", from, to, game.time_ticks);
        game.emit(GameEvent::PhaseChanged { from, to });
    }
    game.phase = to;
}

/// Controls act on the ship while flying or resting. The automatic
/// touchdown ignores them.
fn apply_controls(game: &mut Game, controls: &[ControlEvent]) {
    if !matches!(game.phase, GamePhase::Flying | GamePhase::Idle) {
        return;
    }
    let Some(ship) = game.ship_mut() else {
        return;
    };
    for control in controls {
        match control {
            ControlEvent::RotateLeft => ship.rotate_left(),
            ControlEvent::RotateRight => ship.rotate_right(),
            ControlEvent::ThrottleUp => ship.throttle_up(),
            ControlEvent::ThrottleDown => ship.throttle_down(),
        }
    }
}

fn starting(game: &mut Game) -> GamePhase {
    game.build_world();
    if let Some(World {
        terrain,
        craft: Craft::Ship(ship),
    }) = game.world.as_ref()
    {
        game.camera = CameraTarget::compute(ship, terrain, &game.config.viewport, &mut *game.debug);
    }
    game.emit(GameEvent::Status(StatusMessage::Start));
    GamePhase::Flying
}

fn flying(game: &mut Game) -> GamePhase {
    let Some(world) = game.world.as_mut() else {
        return GamePhase::Starting;
    };
    let Craft::Ship(ship) = &mut world.craft else {
        return GamePhase::Idle;
    };

    ship.tick();
    game.camera = CameraTarget::compute(
        ship,
        &world.terrain,
        &game.config.viewport,
        &mut *game.debug,
    );

    let result = hit_test(ship, &world.terrain, &mut *game.debug);
    match result {
        HitTest::Flying => GamePhase::Flying,
        HitTest::Landing => {
            log::debug!("Touching down at {:?}", ship.position());
            game.events.push(GameEvent::Status(StatusMessage::Landed));
            GamePhase::Landing
        }
        HitTest::Crashing { impact } => {
            log::debug!("Impact at {:?}, velocity {:?}", impact, ship.velocity());
            ship.record_impact(impact);
            GamePhase::Crashing
        }
    }
}

fn landing(game: &mut Game) -> GamePhase {
    let Some(world) = game.world.as_mut() else {
        return GamePhase::Starting;
    };
    let Craft::Ship(ship) = &mut world.craft else {
        return GamePhase::Idle;
    };

    let target_y = world.terrain.horizon_at_x(ship.position().x).y;
    ship.land(target_y);

    if ship.is_stopped() {
        let at = ship.position();
        log::info!("Landed at ({:.1}, {:.1})", at.x, at.y);
        game.events.push(GameEvent::TouchedDown { at });
        GamePhase::Idle
    } else {
        GamePhase::Landing
    }
}

fn crashing(game: &mut Game) -> GamePhase {
    let Some(world) = game.world.as_mut() else {
        return GamePhase::Starting;
    };

    let craft = std::mem::replace(&mut world.craft, Craft::Debris(Debris::default()));
    world.craft = match craft {
        Craft::Ship(ship) => {
            let at = ship.impact().unwrap_or(ship.position());
            log::info!(
                "Crashed at ({:.1}, {:.1}) with velocity ({:.3}, {:.3})",
                at.x,
                at.y,
                ship.velocity().x,
                ship.velocity().y
            );
            game.events.push(GameEvent::Crashed { at });
            game.events.push(GameEvent::Status(StatusMessage::Crashed));
            Craft::Debris(ship.crash(&mut game.rng))
        }
        debris => debris,
    };
    GamePhase::Idle
}

fn idle(game: &mut Game) -> GamePhase {
    let Some(world) = game.world.as_mut() else {
        return GamePhase::Starting;
    };
    world.craft.tick();

    let Craft::Ship(ship) = &mut world.craft else {
        return GamePhase::Idle;
    };
    if ship.engine_level() > LAUNCH_ENGINE_LEVEL {
        ship.launch();
        log::info!("Launched at engine level {}", ship.engine_level());
        game.events.push(GameEvent::Launched);
        game.events.push(GameEvent::Status(StatusMessage::Cleared));
        return GamePhase::Flying;
    }
    GamePhase::Idle
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SimConfig;
    use crate::sim::state::CraftSnapshot;
    use glam::DVec2;

    /// Flat ground at y = 0 with a pad centred on x = 0 spanning x = -64..64
    fn flat_config(start: DVec2, velocity: DVec2) -> SimConfig {
        let mut config = SimConfig::default();
        config.seed = 7;
        config.terrain.origin_x = -1024.0;
        config.terrain.width = 2048.0;
        config.terrain.amplitude = 0.0;
        config.terrain.pad_count = 3;
        config.ship.start_x = start.x;
        config.ship.start_y = start.y;
        config.ship.start_rotation = 0.0;
        config.ship.start_velocity = velocity;
        config
    }

    fn started(config: SimConfig) -> Game {
        let mut game = Game::new(config).expect("valid config");
        tick(&mut game, &TickInput::default());
        game
    }

    #[test]
    fn test_starting_builds_world_and_flies() {
        let mut game = Game::new(SimConfig::default()).expect("default config");
        tick(&mut game, &TickInput::default());

        assert_eq!(game.phase(), GamePhase::Flying);
        assert_eq!(game.time_ticks(), 1);
        assert!(game.terrain().is_some());
        assert_eq!(game.ship().map(|s| s.position()), Some(DVec2::new(0.0, -1200.0)));
        assert!(game.events().contains(&GameEvent::PhaseChanged {
            from: GamePhase::Starting,
            to: GamePhase::Flying,
        }));
        assert!(game.events().contains(&GameEvent::Status(StatusMessage::Start)));

        tick(&mut game, &TickInput::default());
        assert_eq!(game.phase(), GamePhase::Flying);
        assert!(game.events().is_empty());
    }

    #[test]
    fn test_controls_steer_the_ship() {
        let mut game = started(SimConfig::default());
        let input = TickInput::with_controls([
            ControlEvent::ThrottleUp,
            ControlEvent::ThrottleUp,
            ControlEvent::ThrottleUp,
            ControlEvent::ThrottleDown,
            ControlEvent::RotateRight,
        ]);
        tick(&mut game, &input);

        let ship = game.ship().expect("ship");
        assert_eq!(ship.engine_level(), 2);
        // One control step, then one tick of spin friction
        let spin = ROTATION_CONTROL_STEP * SHIP_ANGULAR_FRICTION;
        assert!((ship.body.angular_velocity - spin).abs() < 1e-15);
    }

    #[test]
    fn test_wound_up_start_rotation_stays_in_range() {
        let mut config = SimConfig::default();
        config.ship.start_rotation = 20.0;
        let mut game = started(config);
        for _ in 0..2 {
            tick(&mut game, &TickInput::default());
            let rotation = game.ship().expect("ship").rotation();
            assert!(
                rotation > -std::f64::consts::TAU && rotation <= std::f64::consts::TAU,
                "rotation {rotation} out of range"
            );
        }
    }

    #[test]
    fn test_flying_moves_camera() {
        let mut game = started(SimConfig::default());
        let before = game.camera();
        for _ in 0..10 {
            tick(&mut game, &TickInput::default());
        }
        assert_ne!(game.camera(), before);
        assert!(game.readout().is_some());
    }

    #[test]
    fn test_hard_touchdown_crashes_into_debris() {
        let mut game = started(flat_config(DVec2::new(-300.0, -30.0), DVec2::new(0.0, 0.5)));

        tick(&mut game, &TickInput::default());
        assert_eq!(game.phase(), GamePhase::Crashing);
        let foot = game.ship().expect("ship").world_feet()[0];
        assert_eq!(game.ship().and_then(|s| s.impact()), Some(foot));

        tick(&mut game, &TickInput::default());
        assert_eq!(game.phase(), GamePhase::Idle);
        assert!(game.events().contains(&GameEvent::Crashed { at: foot }));
        assert!(game.events().contains(&GameEvent::Status(StatusMessage::Crashed)));
        let debris = game.craft().and_then(Craft::debris).expect("debris");
        assert_eq!(debris.origin(), foot);
        assert_eq!(debris.chunks().len(), DEBRIS_CHUNK_COUNT);
        assert!(game.readout().is_none());

        // No relaunch from a wreck
        let throttle = TickInput::with_controls([ControlEvent::ThrottleUp; 8]);
        for _ in 0..400 {
            tick(&mut game, &throttle);
            assert_eq!(game.phase(), GamePhase::Idle);
        }
        assert!(game.craft().and_then(Craft::debris).is_some_and(Debris::is_empty));
    }

    #[test]
    fn test_soft_touchdown_lands_and_relaunches() {
        let mut game = started(flat_config(DVec2::new(0.0, -26.0), DVec2::new(0.0, 0.005)));

        tick(&mut game, &TickInput::default());
        assert_eq!(game.phase(), GamePhase::Landing);
        assert!(game.events().contains(&GameEvent::Status(StatusMessage::Landed)));

        // Controls are ignored during the automatic touchdown
        tick(&mut game, &TickInput::with_controls([ControlEvent::ThrottleUp; 3]));
        assert_eq!(game.phase(), GamePhase::Idle);
        let ship = game.ship().expect("ship");
        assert!(ship.is_stopped());
        assert_eq!(ship.engine_level(), 0);
        let rest = ship.position();
        assert!(game.events().contains(&GameEvent::TouchedDown { at: rest }));

        tick(&mut game, &TickInput::with_controls([ControlEvent::ThrottleUp; 4]));
        assert_eq!(game.phase(), GamePhase::Idle);
        assert_eq!(game.ship().map(|s| s.position()), Some(rest));

        tick(&mut game, &TickInput::with_controls([ControlEvent::ThrottleUp]));
        assert_eq!(game.phase(), GamePhase::Flying);
        assert!(game.events().contains(&GameEvent::Launched));
        assert!(game.events().contains(&GameEvent::Status(StatusMessage::Cleared)));
        let ship = game.ship().expect("ship");
        assert!(!ship.is_stopped());
        assert_eq!(ship.position().y, rest.y - LAUNCH_LIFT);
        assert_eq!(ship.velocity().y, LAUNCH_VELOCITY_Y);
    }

    #[test]
    fn test_same_seed_same_wreck() {
        let run = || {
            let mut game =
                started(flat_config(DVec2::new(-300.0, -30.0), DVec2::new(0.2, 0.5)));
            for _ in 0..30 {
                tick(&mut game, &TickInput::default());
            }
            game.snapshot()
        };
        let first = run();
        assert!(matches!(first, Some(CraftSnapshot::Debris(_))));
        assert_eq!(first, run());
    }
}
