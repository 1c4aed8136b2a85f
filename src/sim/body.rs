//! Fixed-step rigid body integration
//!
//! Every simulated body (the craft and each debris chunk) shares one
//! integrator. What differs between them is only how they accelerate and how
//! quickly their spin decays, which is supplied through [`Dynamics`].

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::wrap_rotation;

/// Per-kind forces acting on a body
pub trait Dynamics {
    /// Acceleration for the body's current state, in units per tick unit²
    fn acceleration(&self, body: &RigidBody) -> DVec2;

    /// Multiplier applied to angular velocity after each step
    fn angular_friction(&self) -> f64;
}

/// Gravity only, no spin decay. Used for debris.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ballistic;

impl Dynamics for Ballistic {
    fn acceleration(&self, _body: &RigidBody) -> DVec2 {
        DVec2::new(0.0, GRAVITY)
    }

    fn angular_friction(&self) -> f64 {
        CHUNK_ANGULAR_FRICTION
    }
}

/// Position, motion and orientation of a simulated body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RigidBody {
    pub position: DVec2,
    pub velocity: DVec2,
    /// Radians, kept within (-2π, 2π]
    rotation: f64,
    pub angular_velocity: f64,
    /// A stopped body ignores `tick` until cleared
    pub stopped: bool,
}

impl RigidBody {
    pub fn new(position: DVec2) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    #[inline]
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn set_rotation(&mut self, rotation: f64) {
        self.rotation = wrap_rotation(rotation);
    }

    /// Advance one fixed step of `TICK_DT` (semi-implicit Euler)
    pub fn tick(&mut self, dynamics: &impl Dynamics) {
        if self.stopped {
            return;
        }

        self.set_rotation(self.rotation + self.angular_velocity * TICK_DT);
        self.angular_velocity *= dynamics.angular_friction();

        let acceleration = dynamics.acceleration(self);
        self.velocity += acceleration * TICK_DT;
        self.velocity *= LINEAR_FRICTION;
        self.velocity = self
            .velocity
            .clamp(DVec2::splat(-f64::MAX), DVec2::splat(f64::MAX));

        self.position += self.velocity * TICK_DT;
    }
}
