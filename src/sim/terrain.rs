//! Procedural terrain with landing pads
//!
//! The surface is fractal value noise: each octave draws random heights at
//! evenly spaced control points and joins them with a smooth curve; octave
//! `k` has twice the control points and half the amplitude of octave `k - 1`.
//! Summing the octaves at the finest octave's sample positions gives the
//! terrain anchors. Pads are then carved by flattening short anchor runs.

use glam::DVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{Result, SimError};
use crate::settings::TerrainConfig;

/// Upper bound on octaves; each one doubles the anchor count
const MAX_OCTAVES: u32 = 12;

/// Upper bound on anchors in one terrain
const MAX_ANCHORS: usize = 1 << 22;

/// Validated terrain inputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainParams {
    origin_x: f64,
    width: f64,
    amplitude: f64,
    pad_count: u32,
    octaves: u32,
    pad_width: f64,
    pad_height: f64,
}

impl TerrainParams {
    /// Terrain with the default octave count and pad size
    pub fn new(origin_x: f64, width: f64, amplitude: f64, pad_count: u32) -> Result<Self> {
        Self::from_config(&TerrainConfig {
            origin_x,
            width,
            amplitude,
            pad_count,
            ..TerrainConfig::default()
        })
    }

    pub fn from_config(config: &TerrainConfig) -> Result<Self> {
        let invalid = |name, value, reason| Err(SimError::InvalidTerrain { name, value, reason });

        if !config.origin_x.is_finite() {
            return invalid("origin_x", config.origin_x, "must be finite");
        }
        if !(config.width.is_finite() && config.width > 0.0) {
            return invalid("width", config.width, "must be positive");
        }
        if !(config.amplitude.is_finite() && config.amplitude >= 0.0) {
            return invalid("amplitude", config.amplitude, "must be non-negative");
        }
        if config.octaves == 0 || config.octaves > MAX_OCTAVES {
            return invalid("octaves", config.octaves as f64, "must be between 1 and 12");
        }
        if !(config.pad_width.is_finite() && config.pad_width > 0.0) {
            return invalid("pad_width", config.pad_width, "must be positive");
        }
        if !(config.pad_height.is_finite() && config.pad_height > 0.0) {
            return invalid("pad_height", config.pad_height, "must be positive");
        }

        let params = Self {
            origin_x: config.origin_x,
            width: config.width,
            amplitude: config.amplitude,
            pad_count: config.pad_count,
            octaves: config.octaves,
            pad_width: config.pad_width,
            pad_height: config.pad_height,
        };

        let finest = (params.width / TERRAIN_SAMPLE_SPACING).round()
            * f64::from(1u32 << (params.octaves - 1));
        if finest > MAX_ANCHORS as f64 {
            return invalid("width", config.width, "too wide to sample");
        }
        if params.finest_samples() < 2 {
            return invalid("width", config.width, "too narrow to sample");
        }
        if params.pad_count as usize >= params.finest_samples() {
            return invalid(
                "pad_count",
                f64::from(config.pad_count),
                "must be fewer than the terrain anchors",
            );
        }
        if params.pad_count > 0 && params.pad_width >= params.pad_stride() {
            return Err(SimError::PadsDoNotFit {
                pad_count: params.pad_count,
                pad_width: params.pad_width,
                width: params.width,
            });
        }

        Ok(params)
    }

    /// Control points in the coarsest octave
    fn base_samples(&self) -> usize {
        (self.width / TERRAIN_SAMPLE_SPACING).round() as usize
    }

    fn finest_samples(&self) -> usize {
        self.base_samples() << (self.octaves - 1)
    }

    fn pad_stride(&self) -> f64 {
        self.width / (f64::from(self.pad_count) + 1.0)
    }
}

/// A flattened landing site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pad {
    /// Middle of the pad's surface
    pub center: DVec2,
    pub width: f64,
    pub height: f64,
}

impl Pad {
    /// Surface y a craft settles onto
    pub fn top_y(&self) -> f64 {
        self.center.y
    }

    /// Centre of the visible pad rectangle, which hangs below the surface
    pub fn rect_center(&self) -> DVec2 {
        DVec2::new(self.center.x, self.center.y + 0.5 * self.height)
    }
}

/// Polyline through the terrain ends and every pad centre, parameterized by
/// normalized arclength
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Horizon {
    points: Vec<DVec2>,
    /// Arclength from the first point to each point
    distances: Vec<f64>,
}

impl Horizon {
    fn new(points: Vec<DVec2>) -> Self {
        let mut distances = Vec::with_capacity(points.len());
        let mut total = 0.0;
        for (i, point) in points.iter().enumerate() {
            if i > 0 {
                total += point.distance(points[i - 1]);
            }
            distances.push(total);
        }
        Self { points, distances }
    }

    pub fn points(&self) -> &[DVec2] {
        &self.points
    }

    pub fn length(&self) -> f64 {
        self.distances.last().copied().unwrap_or(0.0)
    }

    /// Point at normalized arclength `t` in [0, 1]
    pub fn point_at(&self, t: f64) -> DVec2 {
        let (Some(&first), Some(&last)) = (self.points.first(), self.points.last()) else {
            return DVec2::ZERO;
        };
        let total = self.length();
        if total <= 0.0 {
            return first;
        }

        let target = t.clamp(0.0, 1.0) * total;
        let segment = self.distances.partition_point(|&d| d <= target);
        if segment >= self.points.len() {
            return last;
        }
        let start = segment.saturating_sub(1);
        let span = self.distances[segment] - self.distances[start];
        if span <= 0.0 {
            return self.points[segment];
        }
        let f = (target - self.distances[start]) / span;
        self.points[start].lerp(self.points[segment], f)
    }

    /// Point on the horizon whose x is within `HORIZON_TOLERANCE` of `x`,
    /// found by bisecting the arclength parameter
    pub fn at_x(&self, x: f64) -> DVec2 {
        let (mut low, mut high) = (0.0_f64, 1.0_f64);
        let mut center = 0.5;
        let mut point = self.point_at(center);

        for _ in 1..HORIZON_MAX_ITERATIONS {
            let delta = x - point.x;
            if delta.abs() < HORIZON_TOLERANCE {
                break;
            }
            if delta > 0.0 {
                low = center;
            } else {
                high = center;
            }
            center = low + (high - low) / 2.0;
            point = self.point_at(center);
        }

        point
    }
}

/// Generated terrain. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Terrain {
    params: TerrainParams,
    anchors: Vec<DVec2>,
    /// Pad membership per anchor index
    pad_members: Vec<bool>,
    pads: Vec<Pad>,
    horizon: Horizon,
    stride: f64,
    hit_test_radius: usize,
    pad_stride: f64,
}

/// Which way a fractional anchor index is rounded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    Floor,
    Ceil,
}

impl Terrain {
    pub fn generate(params: &TerrainParams, rng: &mut impl Rng) -> Self {
        let (anchors, stride) = fractal_anchors(params, rng);
        let hit_test_radius = (HIT_TEST_REACH / stride).ceil() as usize;

        let mut terrain = Self {
            params: params.clone(),
            pad_members: vec![false; anchors.len()],
            anchors,
            pads: Vec::with_capacity(params.pad_count as usize),
            horizon: Horizon::new(Vec::new()),
            stride,
            hit_test_radius,
            pad_stride: params.pad_stride(),
        };
        terrain.carve_pads();

        log::debug!(
            "Generated terrain: {} anchors, stride {:.2}, {} pads, hit-test radius {}",
            terrain.anchors.len(),
            terrain.stride,
            terrain.pads.len(),
            terrain.hit_test_radius
        );
        terrain
    }

    /// Flatten a run of anchors around each pad site and build the horizon
    fn carve_pads(&mut self) {
        let half_width = self.params.pad_width / 2.0;
        let mut horizon = Vec::with_capacity(self.params.pad_count as usize + 2);
        if let Some(&first) = self.anchors.first() {
            horizon.push(first);
        }

        for i in 1..=self.params.pad_count {
            let x = self.params.origin_x + self.pad_stride * i as f64;
            let left = self.index_near(x - half_width, Rounding::Floor);
            let right = self.index_near(x + half_width, Rounding::Ceil);
            let y = self.anchors[self.index_near(x, Rounding::Floor)].y;

            for index in left..=right {
                self.anchors[index].y = y;
                self.pad_members[index] = true;
            }

            self.pads.push(Pad {
                center: DVec2::new(x, y),
                width: self.params.pad_width,
                height: self.params.pad_height,
            });
            horizon.push(DVec2::new(x, y));
        }

        if let Some(&last) = self.anchors.last() {
            horizon.push(last);
        }
        self.horizon = Horizon::new(horizon);
    }

    /// Anchor index for world `x`, clamped to the terrain
    pub fn index_near(&self, x: f64, rounding: Rounding) -> usize {
        let raw = (x - self.params.origin_x) / self.stride;
        let raw = match rounding {
            Rounding::Floor => raw.floor(),
            Rounding::Ceil => raw.ceil(),
        };
        let last = self.anchors.len().saturating_sub(1);
        raw.clamp(0.0, last as f64) as usize
    }

    /// Anchor nearest world `x` (floor rounding)
    pub fn anchor_near(&self, x: f64) -> DVec2 {
        self.anchors[self.index_near(x, Rounding::Floor)]
    }

    pub fn horizon_at_x(&self, x: f64) -> DVec2 {
        self.horizon.at_x(x)
    }

    pub fn anchors(&self) -> &[DVec2] {
        &self.anchors
    }

    pub fn is_pad(&self, index: usize) -> bool {
        self.pad_members.get(index).copied().unwrap_or(false)
    }

    pub fn pads(&self) -> &[Pad] {
        &self.pads
    }

    pub fn horizon(&self) -> &Horizon {
        &self.horizon
    }

    pub fn stride(&self) -> f64 {
        self.stride
    }

    /// Anchors on each side of the nearest one that take part in hit tests
    pub fn hit_test_radius(&self) -> usize {
        self.hit_test_radius
    }

    pub fn pad_stride(&self) -> f64 {
        self.pad_stride
    }

    pub fn origin_x(&self) -> f64 {
        self.params.origin_x
    }

    pub fn width(&self) -> f64 {
        self.params.width
    }

    /// Closed outline for drawing: the anchors plus two corners well below
    /// the deepest possible valley
    pub fn outline(&self) -> Vec<DVec2> {
        let floor = self.params.amplitude * 2.0;
        let mut outline = self.anchors.clone();
        if let (Some(first), Some(last)) = (self.anchors.first(), self.anchors.last()) {
            outline.push(DVec2::new(last.x, floor));
            outline.push(DVec2::new(first.x, floor));
        }
        outline
    }
}

/// Sum the octave curves at the finest octave's sample positions
fn fractal_anchors(params: &TerrainParams, rng: &mut impl Rng) -> (Vec<DVec2>, f64) {
    let base = params.base_samples();
    let octaves: Vec<Vec<f64>> = (0..params.octaves)
        .map(|k| {
            let samples = base << k;
            let amplitude = params.amplitude / f64::from(1u32 << k);
            (0..samples)
                .map(|_| (rng.random::<f64>() - 0.5) * amplitude)
                .collect()
        })
        .collect();

    let samples = params.finest_samples();
    let stride = params.width / samples as f64;
    let anchors = (0..samples)
        .map(|i| {
            let u = i as f64 / samples as f64;
            let y = octaves.iter().map(|heights| smooth_sample(heights, u)).sum();
            DVec2::new(params.origin_x + stride * i as f64, y)
        })
        .collect();

    (anchors, stride)
}

/// Catmull-Rom interpolation through `points` at normalized position `u`
fn smooth_sample(points: &[f64], u: f64) -> f64 {
    match points.len() {
        0 => return 0.0,
        1 => return points[0],
        _ => {}
    }

    let last = points.len() - 1;
    let t = u.clamp(0.0, 1.0) * last as f64;
    let i = (t.floor() as usize).min(last - 1);
    let f = t - i as f64;

    let p0 = points[i.saturating_sub(1)];
    let p1 = points[i];
    let p2 = points[i + 1];
    let p3 = points[(i + 2).min(last)];

    0.5 * (2.0 * p1
        + (p2 - p0) * f
        + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * f * f
        + (3.0 * p1 - p0 - 3.0 * p2 + p3) * f * f * f)
}
