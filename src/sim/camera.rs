//! Camera targeting
//!
//! The simulation only decides where the camera should look. Smoothing and
//! animation toward the target belong to whoever draws the scene.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::debug::DebugSink;
use super::ship::Ship;
use super::terrain::Terrain;
use crate::consts::*;
use crate::settings::ViewportConfig;

/// Where the view should be centred and how far it is zoomed in
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraTarget {
    pub translation: DVec2,
    pub scale: f64,
}

impl Default for CameraTarget {
    fn default() -> Self {
        Self {
            translation: DVec2::ZERO,
            scale: 1.0,
        }
    }
}

impl CameraTarget {
    /// Aim below the ship, more so at altitude, and behind it, more so at
    /// speed. Zooms out as the ship climbs.
    pub fn compute(
        ship: &Ship,
        terrain: &Terrain,
        viewport: &ViewportConfig,
        debug: &mut dyn DebugSink,
    ) -> Self {
        let position = ship.position();
        let horizon = terrain.horizon_at_x(position.x);
        debug.point("horizon", horizon);

        let altitude = horizon.y - position.y;
        let scale =
            (0.5 * viewport.height / altitude.abs()).clamp(CAMERA_MIN_SCALE, CAMERA_MAX_SCALE);
        let lag = ship.velocity().x * (viewport.width / scale);

        Self {
            translation: DVec2::new(position.x - lag, horizon.y - altitude / 3.0),
            scale,
        }
    }

    /// World-space rectangle `(x, y, width, height)` shown by a viewport of
    /// the given size. The scale is rounded to hundredths first.
    pub fn view_box(&self, viewport: &ViewportConfig) -> (f64, f64, f64, f64) {
        let scale = (self.scale * 100.0).round() / 100.0;
        let w = viewport.width / scale;
        let h = viewport.height / scale;
        (
            self.translation.x - w / 2.0,
            self.translation.y - h / 2.0,
            w,
            h,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::FuelConfig;
    use crate::sim::debug::{NullDebugSink, RecordingDebugSink};
    use crate::sim::terrain::TerrainParams;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn flat_terrain() -> Terrain {
        let params = TerrainParams::new(-1024.0, 2048.0, 0.0, 3).expect("valid params");
        Terrain::generate(&params, &mut Pcg32::seed_from_u64(0))
    }

    fn ship_at(x: f64, y: f64, vx: f64) -> Ship {
        let mut ship = Ship::new(DVec2::new(x, y), 0.2, FuelConfig::default());
        ship.body.velocity.x = vx;
        ship
    }

    #[test]
    fn test_target_leads_and_drops_below() {
        let terrain = flat_terrain();
        let viewport = ViewportConfig::default();
        let ship = ship_at(0.0, -360.0, 0.1);
        let mut sink = RecordingDebugSink::default();

        let target = CameraTarget::compute(&ship, &terrain, &viewport, &mut sink);
        assert!((target.scale - 1.0).abs() < 1e-12);
        assert!((target.translation.x - -128.0).abs() < 1e-9);
        assert!((target.translation.y - -120.0).abs() < 1e-9);
        let horizon = sink.points["horizon"];
        assert_eq!(horizon.y, 0.0);
        assert!(horizon.x.abs() <= HORIZON_TOLERANCE);
    }

    #[test]
    fn test_scale_is_clamped() {
        let terrain = flat_terrain();
        let viewport = ViewportConfig::default();

        let high = ship_at(100.0, -100_000.0, 0.0);
        let target = CameraTarget::compute(&high, &terrain, &viewport, &mut NullDebugSink);
        assert_eq!(target.scale, CAMERA_MIN_SCALE);

        // Right on the horizon the raw scale is infinite
        let grounded = ship_at(100.0, 0.0, 0.0);
        let target = CameraTarget::compute(&grounded, &terrain, &viewport, &mut NullDebugSink);
        assert_eq!(target.scale, CAMERA_MAX_SCALE);
        assert_eq!(target.translation, DVec2::new(100.0, 0.0));
    }

    #[test]
    fn test_view_box() {
        let viewport = ViewportConfig {
            width: 1000.0,
            height: 500.0,
        };
        let target = CameraTarget {
            translation: DVec2::new(10.0, 20.0),
            scale: 0.499,
        };
        let (x, y, w, h) = target.view_box(&viewport);
        assert!((w - 2000.0).abs() < 1e-9);
        assert!((h - 1000.0).abs() < 1e-9);
        assert!((x - -990.0).abs() < 1e-9);
        assert!((y - -480.0).abs() < 1e-9);
    }
}
