//! Diagnostic shape reporting
//!
//! Components that can show their working (the hit-test window, the horizon
//! point the camera aims at) take a `&mut dyn DebugSink`. The game holds one
//! sink and passes it down; there is no global registry.

use std::collections::BTreeMap;

use glam::DVec2;

pub trait DebugSink {
    /// Replace the polygon shown under `id`
    fn polygon(&mut self, id: &'static str, points: &[DVec2]);

    /// Replace the marker shown under `id`
    fn point(&mut self, id: &'static str, point: DVec2);
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDebugSink;

impl DebugSink for NullDebugSink {
    fn polygon(&mut self, _id: &'static str, _points: &[DVec2]) {}

    fn point(&mut self, _id: &'static str, _point: DVec2) {}
}

/// Keeps the latest shape per id
#[derive(Debug, Clone, Default)]
pub struct RecordingDebugSink {
    pub polygons: BTreeMap<&'static str, Vec<DVec2>>,
    pub points: BTreeMap<&'static str, DVec2>,
}

impl DebugSink for RecordingDebugSink {
    fn polygon(&mut self, id: &'static str, points: &[DVec2]) {
        self.polygons.insert(id, points.to_vec());
    }

    fn point(&mut self, id: &'static str, point: DVec2) {
        self.points.insert(id, point);
    }
}
