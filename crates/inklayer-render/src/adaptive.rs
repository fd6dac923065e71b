//! Adaptive rendering: mode selection, point decimation and stroke batching.

use crate::commands::RenderMode;
use inklayer_core::StrokeSettings;
use kurbo::{BezPath, Point};
use serde::{Deserialize, Serialize};

/// Thresholds and tunables for frame building.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderConfig {
    /// Below this zoom nothing but the clear is painted.
    pub min_scale: f64,
    /// Adaptive mode kicks in below this zoom...
    pub adaptive_scale: f64,
    /// ...when there are more strokes than this...
    pub adaptive_stroke_threshold: usize,
    /// ...or more shapes than this.
    pub adaptive_shape_threshold: usize,
    /// Extra culling margin in device pixels used in adaptive mode.
    pub cull_margin: f64,
    /// Upper bound on the decimation step.
    pub max_point_skip: usize,
    /// Points per unit of decimation step before zoom is applied.
    pub points_per_skip: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.1,
            adaptive_scale: 0.5,
            adaptive_stroke_threshold: 1000,
            adaptive_shape_threshold: 500,
            cull_margin: 100.0,
            max_point_skip: 8,
            points_per_skip: 50.0,
        }
    }
}

impl RenderConfig {
    /// Pick the rendering mode for a store of the given size at `scale`.
    pub fn select_mode(&self, strokes: usize, shapes: usize, scale: f64) -> RenderMode {
        if scale < self.min_scale {
            RenderMode::Skipped
        } else if scale < self.adaptive_scale
            && (strokes > self.adaptive_stroke_threshold || shapes > self.adaptive_shape_threshold)
        {
            RenderMode::Adaptive
        } else {
            RenderMode::Detailed
        }
    }

    /// Decimation step for a stroke of `len` points at `scale`.
    ///
    /// Longer strokes and lower zoom skip more points; the result is in
    /// `1..=max_point_skip`.
    pub fn point_skip(&self, len: usize, scale: f64) -> usize {
        let raw = len as f64 / self.points_per_skip / scale.max(f64::EPSILON);
        (raw.floor() as usize).clamp(1, self.max_point_skip.max(1))
    }
}

/// Keep every `skip`-th point; the first and last points are always kept.
pub fn decimate(points: &[Point], skip: usize) -> Vec<Point> {
    if skip <= 1 || points.len() <= 2 {
        return points.to_vec();
    }
    let mut kept: Vec<Point> = points.iter().step_by(skip).copied().collect();
    if (points.len() - 1) % skip != 0 {
        if let Some(last) = points.last() {
            kept.push(*last);
        }
    }
    kept
}

/// Strokes sharing a key are painted with one path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BatchKey {
    color: String,
    width_bits: u64,
    opacity_bits: u64,
}

impl BatchKey {
    pub fn new(settings: &StrokeSettings) -> Self {
        Self {
            color: settings.color.clone(),
            width_bits: settings.size.to_bits(),
            opacity_bits: settings.opacity.to_bits(),
        }
    }
}

/// Append a polyline as a new subpath. Single points become zero-length segments.
pub fn append_polyline(path: &mut BezPath, points: &[Point]) {
    let Some(first) = points.first() else {
        return;
    };
    path.move_to(*first);
    if points.len() == 1 {
        path.line_to(*first);
        return;
    }
    for point in &points[1..] {
        path.line_to(*point);
    }
}
