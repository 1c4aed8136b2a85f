//! The lander
//!
//! A rigid body with an engine. Geometry is defined in body-local units
//! around a capsule of radius 100 and scaled into the world, so a 0.2 scale
//! gives a craft about 20 units across. `+y` is down.

use std::f64::consts::{FRAC_PI_2, TAU};

use glam::DVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::body::{Dynamics, RigidBody};
use super::debris::Debris;
use super::geometry::Pose;
use crate::consts::*;
use crate::settings::FuelConfig;

const CAPSULE_RADIUS: f64 = 100.0;
const CAPSULE_SIDES: usize = 16;
const LEG_WIDE_RADIUS: f64 = 85.0;
const LEG_HEIGHT: f64 = 40.0;
const FOOT_RADIUS: f64 = 15.0;
const NOZZLE_HEIGHT: f64 = 30.0;
const MAX_FLAME_HEIGHT: f64 = 90.0;

/// Vertex `i` of the capsule polygon (flat side down)
fn capsule_vertex(i: usize) -> DVec2 {
    let pct = (i as f64 + 0.5) / CAPSULE_SIDES as f64;
    let theta = TAU * pct + FRAC_PI_2;
    DVec2::new(theta.cos(), theta.sin()) * CAPSULE_RADIUS
}

/// Body-local collision shapes and flame anchors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanderGeometry {
    /// Crash-test outline: the bottom of the body plus the capsule's upper rim
    pub hull: [DVec2; 8],
    /// Toe tips, tested against pads
    pub feet: [DVec2; 2],
    /// Flame tip y with the engine off and at full throttle
    pub flame_min_y: f64,
    pub flame_max_y: f64,
}

impl Default for LanderGeometry {
    fn default() -> Self {
        let body_bottom = capsule_vertex(0).y;
        let body_left = capsule_vertex(2).x;
        let body_right = capsule_vertex(13).x;
        let foot_y = body_bottom + LEG_HEIGHT;
        let flame_min_y = body_bottom + NOZZLE_HEIGHT;

        Self {
            hull: [
                DVec2::new(body_left, body_bottom),
                capsule_vertex(3),
                capsule_vertex(5),
                capsule_vertex(7),
                capsule_vertex(8),
                capsule_vertex(10),
                capsule_vertex(12),
                DVec2::new(body_right, capsule_vertex(15).y),
            ],
            feet: [
                DVec2::new(-LEG_WIDE_RADIUS - FOOT_RADIUS, foot_y),
                DVec2::new(LEG_WIDE_RADIUS + FOOT_RADIUS, foot_y),
            ],
            flame_min_y,
            flame_max_y: flame_min_y + MAX_FLAME_HEIGHT,
        }
    }
}

/// Whether the current motion is gentle enough to touch down
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landable {
    pub vx: f64,
    pub vy: f64,
    pub rotation: f64,
    pub vx_okay: bool,
    pub vy_okay: bool,
    pub rotation_okay: bool,
    pub all_okay: bool,
}

impl Landable {
    pub fn evaluate(velocity: DVec2, rotation: f64) -> Self {
        let vx_okay = velocity.x.abs() < LANDABLE_MAX_VX;
        let vy_okay = velocity.y < LANDABLE_MAX_VY;
        let rotation_okay = rotation.abs() < LANDABLE_MAX_ROTATION;
        Self {
            vx: velocity.x,
            vy: velocity.y,
            rotation,
            vx_okay,
            vy_okay,
            rotation_okay,
            all_okay: vx_okay && vy_okay && rotation_okay,
        }
    }
}

/// Engine and tank. Supplies the ship's acceleration to the integrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Propulsion {
    engine_level: i32,
    fuel: f64,
    rule: FuelConfig,
}

impl Propulsion {
    pub fn new(rule: FuelConfig) -> Self {
        Self {
            engine_level: 0,
            fuel: rule.capacity,
            rule,
        }
    }

    /// Thrust is available unless a constrained tank has run dry
    pub fn has_fuel(&self) -> bool {
        !self.rule.constrained || self.fuel > 0.0
    }

    fn burn(&mut self) {
        if self.rule.constrained {
            self.fuel = (self.fuel - self.engine_level as f64 * self.rule.burn_per_level).max(0.0);
        }
    }
}

impl Dynamics for Propulsion {
    fn acceleration(&self, body: &RigidBody) -> DVec2 {
        let r = body.rotation() - FRAC_PI_2;
        let thrust = if self.has_fuel() {
            self.engine_level as f64 / ENGINE_THRUST_DIVISOR * GRAVITY
        } else {
            0.0
        };
        DVec2::new(r.cos() * thrust, r.sin() * thrust + GRAVITY)
    }

    fn angular_friction(&self) -> f64 {
        SHIP_ANGULAR_FRICTION
    }
}

/// Render-side view of the ship
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipSnapshot {
    pub position: DVec2,
    pub rotation: f64,
    pub scale: f64,
    pub hull: Vec<DVec2>,
    pub feet: Vec<DVec2>,
    pub flame_tip_y: f64,
    /// Engine level over its maximum, in [0, 1]
    pub engine_fraction: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ship {
    pub body: RigidBody,
    propulsion: Propulsion,
    geometry: LanderGeometry,
    scale: f64,
    /// Where the last hit test found the hull or feet inside the terrain
    impact: Option<DVec2>,
}

impl Ship {
    pub fn new(position: DVec2, scale: f64, fuel: FuelConfig) -> Self {
        Self {
            body: RigidBody::new(position),
            propulsion: Propulsion::new(fuel),
            geometry: LanderGeometry::default(),
            scale,
            impact: None,
        }
    }

    pub fn position(&self) -> DVec2 {
        self.body.position
    }

    pub fn velocity(&self) -> DVec2 {
        self.body.velocity
    }

    pub fn rotation(&self) -> f64 {
        self.body.rotation()
    }

    pub fn set_rotation(&mut self, rotation: f64) {
        self.body.set_rotation(rotation);
    }

    pub fn is_stopped(&self) -> bool {
        self.body.stopped
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn geometry(&self) -> &LanderGeometry {
        &self.geometry
    }

    pub fn engine_level(&self) -> i32 {
        self.propulsion.engine_level
    }

    pub fn set_engine_level(&mut self, level: i32) {
        self.propulsion.engine_level = level.clamp(0, MAX_ENGINE_LEVEL);
    }

    /// Engine level normalized to [0, 1]
    pub fn engine_fraction(&self) -> f64 {
        self.engine_level() as f64 / MAX_ENGINE_LEVEL as f64
    }

    /// Remaining fuel, when the fuel rule is in force
    pub fn fuel_level(&self) -> Option<f64> {
        self.propulsion
            .rule
            .constrained
            .then_some(self.propulsion.fuel)
    }

    pub fn fuel_rule(&self) -> &FuelConfig {
        &self.propulsion.rule
    }

    pub fn rotate_left(&mut self) {
        self.body.angular_velocity -= ROTATION_CONTROL_STEP;
    }

    pub fn rotate_right(&mut self) {
        self.body.angular_velocity += ROTATION_CONTROL_STEP;
    }

    pub fn throttle_up(&mut self) {
        self.set_engine_level(self.engine_level() + 1);
    }

    pub fn throttle_down(&mut self) {
        self.set_engine_level(self.engine_level() - 1);
    }

    /// Integrate one step and burn fuel for it
    pub fn tick(&mut self) {
        if self.body.stopped {
            return;
        }
        self.body.tick(&self.propulsion);
        self.propulsion.burn();
    }

    pub fn acceleration(&self) -> DVec2 {
        self.propulsion.acceleration(&self.body)
    }

    pub fn landable(&self) -> Landable {
        Landable::evaluate(self.body.velocity, self.body.rotation())
    }

    pub fn pose(&self) -> Pose {
        Pose {
            position: self.body.position,
            rotation: self.body.rotation(),
            scale: self.scale,
        }
    }

    pub fn world_hull(&self) -> Vec<DVec2> {
        self.pose().polygon_to_world(&self.geometry.hull)
    }

    pub fn world_feet(&self) -> Vec<DVec2> {
        self.pose().polygon_to_world(&self.geometry.feet)
    }

    pub fn impact(&self) -> Option<DVec2> {
        self.impact
    }

    pub fn record_impact(&mut self, point: DVec2) {
        self.impact = Some(point);
    }

    /// One step of the automatic touchdown: level out, cut the engine, then
    /// lower the craft until its feet rest on `target_y`
    pub fn land(&mut self, target_y: f64) {
        if self.body.stopped {
            return;
        }

        let rotation = self.rotation();
        if rotation.abs() <= LAND_ROTATION_STEP {
            self.set_rotation(0.0);
        } else {
            self.set_rotation(rotation - rotation.signum() * LAND_ROTATION_STEP);
        }

        if self.engine_level() > 0 {
            self.throttle_down();
        }

        if self.rotation() == 0.0 && self.engine_level() == 0 {
            let clearance = self
                .world_feet()
                .iter()
                .map(|foot| target_y - foot.y)
                .fold(f64::INFINITY, f64::min);

            if clearance <= LAND_SETTLE_DISTANCE {
                self.body.velocity = DVec2::ZERO;
                self.body.stopped = true;
            } else {
                self.body.position.y += LAND_DESCENT_STEP;
            }
        }
    }

    /// Lift off a pad
    pub fn launch(&mut self) {
        self.body.stopped = false;
        self.body.position.y -= LAUNCH_LIFT;
        self.body.velocity.y = LAUNCH_VELOCITY_Y;
    }

    /// Break up into debris at the recorded impact point, or at the ship's
    /// position when no impact was recorded
    pub fn crash(self, rng: &mut impl Rng) -> Debris {
        let origin = self.impact.unwrap_or(self.body.position);
        Debris::spawn(origin, self.body.velocity, rng)
    }

    /// Local flame tip y for the current engine level
    pub fn flame_tip_y(&self) -> f64 {
        let g = &self.geometry;
        g.flame_min_y + self.engine_fraction() * (g.flame_max_y - g.flame_min_y)
    }

    /// Flame colour, orange at idle shading to red at full throttle
    pub fn flame_color(&self) -> [u8; 3] {
        let green = (255.0 - 205.0 * self.engine_fraction()).round() as u8;
        [255, green, 50]
    }

    pub fn snapshot(&self) -> ShipSnapshot {
        ShipSnapshot {
            position: self.body.position,
            rotation: self.rotation(),
            scale: self.scale,
            hull: self.geometry.hull.to_vec(),
            feet: self.geometry.feet.to_vec(),
            flame_tip_y: self.flame_tip_y(),
            engine_fraction: self.engine_fraction(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn ship() -> Ship {
        Ship::new(DVec2::ZERO, 0.2, FuelConfig::default())
    }

    #[test]
    fn test_geometry_is_symmetric() {
        let g = LanderGeometry::default();
        assert!((g.hull[0].x + g.hull[7].x).abs() < 1e-9);
        assert!((g.hull[0].y - g.hull[7].y).abs() < 1e-9);
        assert!((g.feet[0].x + 100.0).abs() < 1e-9);
        assert!((g.feet[1].x - 100.0).abs() < 1e-9);
        // Feet hang below the body bottom
        assert!(g.feet[0].y > g.hull[0].y);
        assert!((g.flame_max_y - g.flame_min_y - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_engine_level_clamped() {
        let mut ship = ship();
        ship.set_engine_level(40);
        assert_eq!(ship.engine_level(), MAX_ENGINE_LEVEL);
        ship.throttle_up();
        assert_eq!(ship.engine_level(), MAX_ENGINE_LEVEL);
        ship.set_engine_level(-3);
        assert_eq!(ship.engine_level(), 0);
        ship.throttle_down();
        assert_eq!(ship.engine_level(), 0);
    }

    #[test]
    fn test_acceleration_upright_thrust_opposes_gravity() {
        let mut ship = ship();
        assert_eq!(ship.acceleration(), DVec2::new(0.0, GRAVITY));

        ship.set_engine_level(8);
        let a = ship.acceleration();
        assert!(a.x.abs() < 1e-20);
        assert!(a.y.abs() < 1e-20);

        ship.set_engine_level(12);
        assert!(ship.acceleration().y < 0.0);
    }

    #[test]
    fn test_acceleration_sideways_thrust() {
        let mut ship = ship();
        ship.set_rotation(FRAC_PI_2);
        ship.set_engine_level(8);
        let a = ship.acceleration();
        assert!((a.x - GRAVITY).abs() < 1e-18);
        assert!((a.y - GRAVITY).abs() < 1e-18);
    }

    #[test]
    fn test_rotation_controls_adjust_spin() {
        let mut ship = ship();
        ship.rotate_right();
        ship.rotate_right();
        ship.rotate_left();
        assert!((ship.body.angular_velocity - ROTATION_CONTROL_STEP).abs() < 1e-15);
    }

    #[test]
    fn test_landable_thresholds() {
        let ok = Landable::evaluate(DVec2::new(0.0, 0.0), 0.0);
        assert!(ok.all_okay);

        let at_vx = Landable::evaluate(DVec2::new(0.007, 0.0), 0.0);
        assert!(!at_vx.vx_okay && !at_vx.all_okay);
        assert!(Landable::evaluate(DVec2::new(-0.00699, 0.0), 0.0).vx_okay);

        let at_vy = Landable::evaluate(DVec2::new(0.0, 0.02), 0.0);
        assert!(!at_vy.vy_okay && !at_vy.all_okay);
        assert!(Landable::evaluate(DVec2::new(0.0, 0.01999), 0.0).vy_okay);
        // Climbing fast is still fine
        assert!(Landable::evaluate(DVec2::new(0.0, -5.0), 0.0).vy_okay);

        let at_rotation = Landable::evaluate(DVec2::ZERO, -0.3);
        assert!(!at_rotation.rotation_okay && !at_rotation.all_okay);
        assert!(Landable::evaluate(DVec2::ZERO, 0.29999).rotation_okay);
    }

    #[test]
    fn test_world_shapes_follow_pose() {
        let mut ship = ship();
        ship.body.position = DVec2::new(50.0, -20.0);
        let feet = ship.world_feet();
        assert!((feet[0].x - 30.0).abs() < 1e-9);
        assert!((feet[1].x - 70.0).abs() < 1e-9);
        let foot_y = -20.0 + ship.geometry().feet[0].y * 0.2;
        assert!((feet[0].y - foot_y).abs() < 1e-9);

        // Upside down, the feet are above the centre
        ship.set_rotation(std::f64::consts::PI);
        assert!(ship.world_feet()[0].y < -20.0);
        assert_eq!(ship.world_hull().len(), 8);
    }

    #[test]
    fn test_land_levels_out_then_settles() {
        let mut ship = ship();
        ship.set_rotation(0.02);
        ship.set_engine_level(3);
        ship.body.velocity = DVec2::new(0.001, 0.01);
        let foot_y = ship.world_feet()[0].y;
        let target_y = foot_y + 6.0;

        let mut ticks = 0;
        while !ship.is_stopped() {
            ship.land(target_y);
            ticks += 1;
            assert!(ticks < 100, "landing did not converge");
        }

        assert_eq!(ship.rotation(), 0.0);
        assert_eq!(ship.engine_level(), 0);
        assert_eq!(ship.velocity(), DVec2::ZERO);
        assert!(target_y - ship.world_feet()[0].y <= LAND_SETTLE_DISTANCE);
        // A handful of ticks to level out, then eight 0.5 steps down
        assert!(ticks <= 16);

        let resting = ship.position();
        ship.land(target_y);
        ship.tick();
        assert_eq!(ship.position(), resting);
    }

    #[test]
    fn test_launch_lifts_off() {
        let mut ship = ship();
        ship.body.stopped = true;
        ship.launch();
        assert!(!ship.is_stopped());
        assert_eq!(ship.position().y, -LAUNCH_LIFT);
        assert_eq!(ship.velocity().y, LAUNCH_VELOCITY_Y);
    }

    #[test]
    fn test_crash_spawns_at_impact() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut ship = ship();
        ship.body.velocity = DVec2::new(0.3, 0.2);
        ship.record_impact(DVec2::new(4.0, 5.0));
        let debris = ship.crash(&mut rng);
        assert_eq!(debris.origin(), DVec2::new(4.0, 5.0));
        assert_eq!(debris.chunks().len(), DEBRIS_CHUNK_COUNT);

        let mut ship = self::ship();
        ship.body.position = DVec2::new(-7.0, 1.0);
        assert_eq!(ship.crash(&mut rng).origin(), DVec2::new(-7.0, 1.0));
    }

    #[test]
    fn test_fuel_rule() {
        let mut unconstrained = ship();
        unconstrained.set_engine_level(12);
        unconstrained.tick();
        assert_eq!(unconstrained.fuel_level(), None);

        let rule = FuelConfig {
            constrained: true,
            capacity: 1.0,
            burn_per_level: 0.1,
            low_threshold: 0.5,
        };
        let mut ship = Ship::new(DVec2::ZERO, 0.2, rule);
        ship.set_engine_level(5);
        ship.tick();
        assert!((ship.fuel_level().unwrap() - 0.5).abs() < 1e-12);
        ship.tick();
        ship.tick();
        assert_eq!(ship.fuel_level(), Some(0.0));
        // Dry tank: gravity only
        assert_eq!(ship.acceleration(), DVec2::new(0.0, GRAVITY));
    }

    #[test]
    fn test_flame_tracks_engine() {
        let mut ship = ship();
        let g = ship.geometry().clone();
        assert_eq!(ship.flame_tip_y(), g.flame_min_y);
        assert_eq!(ship.flame_color(), [255, 255, 50]);
        ship.set_engine_level(12);
        assert!((ship.flame_tip_y() - g.flame_max_y).abs() < 1e-9);
        assert_eq!(ship.flame_color(), [255, 50, 50]);
        assert_eq!(ship.snapshot().engine_fraction, 1.0);
    }

    proptest! {
        #[test]
        fn prop_engine_level_stays_in_range(events in prop::collection::vec(any::<bool>(), 0..100)) {
            let mut ship = ship();
            for up in events {
                if up { ship.throttle_up() } else { ship.throttle_down() }
                prop_assert!((0..=MAX_ENGINE_LEVEL).contains(&ship.engine_level()));
            }
        }
    }
}
