//! Polygon utilities
//!
//! Polygons are plain slices of world or local points; nothing here owns
//! geometry.

use glam::DVec2;

/// Crossing-number point-in-polygon test.
///
/// An edge counts only when `y_i <= p.y < y_j` (or mirrored), so a ray through
/// a shared vertex is counted once. On an axis-aligned box this makes the
/// minimum-x and minimum-y edges inside and the maximum edges outside.
/// Empty and degenerate polygons contain nothing.
pub fn point_in_polygon(polygon: &[DVec2], point: DVec2) -> bool {
    let mut inside = false;
    let Some(mut j) = polygon.len().checked_sub(1) else {
        return false;
    };

    for (i, a) in polygon.iter().enumerate() {
        let b = polygon[j];
        let straddles = (a.y <= point.y && point.y < b.y) || (b.y <= point.y && point.y < a.y);
        if straddles && point.x < (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }

    inside
}

/// Placement of a body-local shape in the world: scale, then rotate, then
/// translate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: DVec2,
    pub rotation: f64,
    pub scale: f64,
}

impl Pose {
    #[inline]
    pub fn to_world(&self, local: DVec2) -> DVec2 {
        self.position + DVec2::from_angle(self.rotation).rotate(local * self.scale)
    }

    /// Transform a whole local polygon
    pub fn polygon_to_world(&self, local: &[DVec2]) -> Vec<DVec2> {
        local.iter().map(|&p| self.to_world(p)).collect()
    }
}
