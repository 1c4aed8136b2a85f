//! Hit testing the lander against the terrain
//!
//! Only a small window of anchors around the craft is ever tested. Far from
//! the ground the nearest anchor alone decides that the craft is flying, which
//! is the common case and builds no polygons at all.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::debug::DebugSink;
use super::geometry::point_in_polygon;
use super::ship::Ship;
use super::terrain::{Rounding, Terrain};
use crate::consts::*;

/// Local terrain around a point
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainQuery {
    /// Window anchors closed below; empty when the point is far away
    pub polygon: Vec<DVec2>,
    /// Pad anchors in the window, closed the same way, when there are enough
    pub pad_polygon: Option<Vec<DVec2>>,
    /// Distance to the closest anchor considered
    pub distance: f64,
}

/// Outcome of a hit test
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum HitTest {
    Flying,
    Landing,
    /// First hull or foot point found inside the terrain
    Crashing { impact: DVec2 },
}

/// Gather the terrain window around `position`
pub fn terrain_info_near(terrain: &Terrain, position: DVec2) -> TerrainQuery {
    let anchors = terrain.anchors();
    let index = terrain.index_near(position.x, Rounding::Floor);

    let nearest = position.distance_squared(anchors[index]);
    if nearest > HIT_TEST_DISTANCE * HIT_TEST_DISTANCE {
        return TerrainQuery {
            polygon: Vec::new(),
            pad_polygon: None,
            distance: nearest.sqrt(),
        };
    }

    let radius = terrain.hit_test_radius();
    let from = index.saturating_sub(radius);
    let to = (index + radius).min(anchors.len() - 1);

    let mut polygon = Vec::with_capacity(to - from + 3);
    let mut pad_polygon = Vec::with_capacity(to - from + 3);
    let mut max_y = f64::MIN;
    let mut min_distance = f64::MAX;

    for (i, &anchor) in anchors.iter().enumerate().take(to + 1).skip(from) {
        max_y = max_y.max(anchor.y);
        min_distance = min_distance.min(position.distance_squared(anchor));
        polygon.push(anchor);
        if terrain.is_pad(i) {
            pad_polygon.push(anchor);
        }
    }

    close_below(&mut polygon, max_y);
    let pad_polygon = (pad_polygon.len() >= MIN_PAD_ANCHORS).then(|| {
        close_below(&mut pad_polygon, max_y);
        pad_polygon
    });

    TerrainQuery {
        polygon,
        pad_polygon,
        distance: min_distance.sqrt(),
    }
}

/// Close an anchor run with two corners under its deepest point
fn close_below(polygon: &mut Vec<DVec2>, max_y: f64) {
    let (Some(first), Some(last)) = (polygon.first().copied(), polygon.last().copied()) else {
        return;
    };
    let y = max_y + HIT_POLYGON_CLOSE;
    polygon.insert(0, DVec2::new(first.x, y));
    polygon.push(DVec2::new(last.x, y));
}

/// Classify the ship against the terrain.
///
/// A landable ship with a foot on a pad is landing. Otherwise the first point
/// inside the terrain wins, checked as hull, then feet, then hull against the
/// pad polygon.
pub fn hit_test(ship: &Ship, terrain: &Terrain, debug: &mut dyn DebugSink) -> HitTest {
    let query = terrain_info_near(terrain, ship.position());
    if query.distance > HIT_TEST_DISTANCE {
        return HitTest::Flying;
    }
    debug.polygon("terrain", &query.polygon);

    let feet = ship.world_feet();
    let pad = query.pad_polygon.as_deref().unwrap_or(&[]);
    if !pad.is_empty() {
        debug.polygon("pad", pad);
        if ship.landable().all_okay && feet.iter().any(|&foot| point_in_polygon(pad, foot)) {
            return HitTest::Landing;
        }
    }

    let hull = ship.world_hull();
    let inside = |polygon: &[DVec2], points: &[DVec2]| {
        points
            .iter()
            .copied()
            .find(|&p| point_in_polygon(polygon, p))
    };

    let impact = inside(&query.polygon, &hull)
        .or_else(|| inside(&query.polygon, &feet))
        .or_else(|| inside(pad, &hull));

    match impact {
        Some(impact) => {
            debug.point("impact", impact);
            HitTest::Crashing { impact }
        }
        None => HitTest::Flying,
    }
}
