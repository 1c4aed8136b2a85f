//! Luni headless runner
//!
//! Plays one session without a window: builds the world from a config file
//! (or defaults), optionally flies it with a simple autopilot, and prints how
//! it ended.

use std::path::PathBuf;

use clap::Parser;

use luni::SimConfig;
use luni::sim::{ControlEvent, Craft, Game, GameEvent, GamePhase, Ship, Terrain, TickInput, tick};

#[derive(Parser)]
#[command(name = "luni", about = "Headless lunar lander simulation")]
struct Args {
    /// Session seed, overriding the config file
    #[arg(long)]
    seed: Option<u64>,

    /// Number of ticks to simulate
    #[arg(long, default_value_t = 6000)]
    ticks: u64,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Fly the ship toward the nearest pad instead of letting it fall
    #[arg(long)]
    autopilot: bool,
}

fn main() -> luni::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    let mut game = Game::new(config)?;
    let mut outcome = None;

    for _ in 0..args.ticks {
        let input = match (args.autopilot, game.phase()) {
            (true, GamePhase::Flying) => match (game.ship(), game.terrain()) {
                (Some(ship), Some(terrain)) => TickInput::with_controls(autopilot(ship, terrain)),
                _ => TickInput::default(),
            },
            _ => TickInput::default(),
        };
        tick(&mut game, &input);

        for event in game.events() {
            match event {
                GameEvent::TouchedDown { at } => {
                    outcome = Some(format!("landed at ({:.1}, {:.1})", at.x, at.y));
                }
                GameEvent::Crashed { at } => {
                    outcome = Some(format!("crashed at ({:.1}, {:.1})", at.x, at.y));
                }
                _ => {}
            }
        }
        if outcome.is_some() && game.phase() == GamePhase::Idle {
            break;
        }
    }

    let craft = match game.craft() {
        Some(Craft::Ship(ship)) => {
            let at = ship.position();
            format!("ship at ({:.1}, {:.1})", at.x, at.y)
        }
        Some(Craft::Debris(debris)) => format!("{} chunks of debris", debris.chunks().len()),
        None => "nothing".to_owned(),
    };
    println!(
        "seed {} after {} ticks: {:?}, {}, {}",
        game.config().seed,
        game.time_ticks(),
        game.phase(),
        outcome.as_deref().unwrap_or("still flying"),
        craft
    );
    Ok(())
}

/// Steer toward the nearest pad and keep the descent rate proportional to
/// altitude. Issues at most one rotation and one throttle event per tick.
fn autopilot(ship: &Ship, terrain: &Terrain) -> Vec<ControlEvent> {
    let position = ship.position();
    let velocity = ship.velocity();

    let pad_x = terrain
        .pads()
        .iter()
        .map(|pad| pad.center.x)
        .min_by(|a, b| (a - position.x).abs().total_cmp(&(b - position.x).abs()))
        .unwrap_or(position.x);
    let altitude = terrain.horizon_at_x(position.x).y - position.y;

    // Leaning right (positive rotation) pushes the ship toward +x
    let wanted_vx = ((pad_x - position.x) / 4000.0).clamp(-0.2, 0.2);
    let wanted_rotation = ((wanted_vx - velocity.x) * 20.0).clamp(-0.25, 0.25);
    let wanted_spin = (wanted_rotation - ship.rotation()) * 0.01;

    let mut controls = Vec::with_capacity(2);
    let spin = ship.body.angular_velocity;
    if spin < wanted_spin - 0.0005 {
        controls.push(ControlEvent::RotateRight);
    } else if spin > wanted_spin + 0.0005 {
        controls.push(ControlEvent::RotateLeft);
    }

    let wanted_vy = (altitude / 4000.0).clamp(0.01, 0.15);
    if velocity.y > wanted_vy {
        controls.push(ControlEvent::ThrottleUp);
    } else if velocity.y < wanted_vy - 0.005 {
        controls.push(ControlEvent::ThrottleDown);
    }
    controls
}
