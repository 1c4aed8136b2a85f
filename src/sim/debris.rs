//! Crash debris
//!
//! A crash replaces the ship with a burst of small tumbling fragments that
//! fall under gravity and expire after a few seconds.

use std::f64::consts::{FRAC_PI_2, TAU};

use glam::DVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::body::{Ballistic, RigidBody};
use crate::consts::*;

/// Added to the impact heading before the random spread; fragments travel
/// along the negated result
const SCATTER_BIAS: f64 = TAU * 3.0 / 8.0;

/// One fragment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub body: RigidBody,
    /// Local outline, 2 to 7 vertices
    pub polygon: Vec<DVec2>,
    /// Remaining life in tick time units
    pub lifetime: f64,
}

impl Chunk {
    /// A random fragment at `origin`, scattered relative to the crash
    /// velocity `impact_velocity`
    pub fn new(origin: DVec2, impact_velocity: DVec2, rng: &mut impl Rng) -> Self {
        let sides = 2.0 + rng.random::<f64>() * 5.0;
        let step = TAU / sides;
        let mut polygon = Vec::with_capacity(7);
        let mut theta = 0.0;
        while theta < TAU {
            let radius = 2.0 + rng.random::<f64>() * 8.0;
            polygon.push(DVec2::new(theta.cos(), theta.sin()) * radius);
            theta += step;
        }

        let base = impact_velocity.y.atan2(impact_velocity.x) + SCATTER_BIAS;
        let direction = base + FRAC_PI_2 * rng.random::<f64>();
        let speed = (impact_velocity.length() * 2.0).clamp(0.15, 0.5) * rng.random::<f64>();

        let mut body = RigidBody::new(origin);
        body.velocity = -DVec2::new(direction.cos(), direction.sin()) * speed;
        body.angular_velocity = rng.random::<f64>() * 0.01;

        Self {
            body,
            polygon,
            lifetime: CHUNK_MIN_LIFETIME + CHUNK_LIFETIME_SPREAD * rng.random::<f64>(),
        }
    }

    pub fn tick(&mut self) {
        self.body.tick(&Ballistic);
        self.lifetime -= TICK_DT;
    }

    pub fn is_expired(&self) -> bool {
        self.lifetime <= 0.0
    }
}

/// Render-side view of one fragment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkSnapshot {
    pub position: DVec2,
    pub rotation: f64,
    pub polygon: Vec<DVec2>,
}

/// All fragments of one crash
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Debris {
    origin: DVec2,
    chunks: Vec<Chunk>,
}

impl Debris {
    pub fn spawn(origin: DVec2, impact_velocity: DVec2, rng: &mut impl Rng) -> Self {
        let chunks = (0..DEBRIS_CHUNK_COUNT)
            .map(|_| Chunk::new(origin, impact_velocity, rng))
            .collect();
        Self { origin, chunks }
    }

    /// Where the fragments were spawned
    pub fn origin(&self) -> DVec2 {
        self.origin
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Advance every fragment and drop the expired ones
    pub fn tick(&mut self) {
        self.chunks.retain_mut(|chunk| {
            chunk.tick();
            !chunk.is_expired()
        });
    }

    pub fn snapshot(&self) -> Vec<ChunkSnapshot> {
        self.chunks
            .iter()
            .map(|chunk| ChunkSnapshot {
                position: chunk.body.position,
                rotation: chunk.body.rotation(),
                polygon: chunk.polygon.clone(),
            })
            .collect()
    }
}
