//! Freehand strokes.

use super::{InkPoint, PrimitiveId, generate_id, now_millis};
use crate::geometry;
use kurbo::{BezPath, Point, Rect};
use serde::{Deserialize, Serialize};

/// Tool that produced a stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeTool {
    #[default]
    Pen,
    /// Transient; eraser strokes are never committed or painted.
    Eraser,
}

/// Brush settings for a stroke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeSettings {
    /// Brush diameter in content units.
    pub size: f64,
    /// CSS-style color string, e.g. `#1e1e1e`.
    pub color: String,
    /// Overall opacity (0.0 = fully transparent, 1.0 = fully opaque).
    pub opacity: f64,
}

impl Default for StrokeSettings {
    fn default() -> Self {
        Self {
            size: 2.0,
            color: "#000000".to_string(),
            opacity: 1.0,
        }
    }
}

/// A committed freehand stroke (ordered content-space points).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub id: PrimitiveId,
    pub points: Vec<InkPoint>,
    pub tool: StrokeTool,
    pub settings: StrokeSettings,
    /// Creation time in milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl Stroke {
    /// Create a stroke with a fresh id and the current timestamp.
    pub fn new(points: Vec<InkPoint>, tool: StrokeTool, settings: StrokeSettings) -> Self {
        Self {
            id: generate_id("stroke"),
            points,
            tool,
            settings,
            timestamp: now_millis(),
        }
    }

    /// Create a pen stroke.
    pub fn pen(points: Vec<InkPoint>, settings: StrokeSettings) -> Self {
        Self::new(points, StrokeTool::Pen, settings)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_eraser(&self) -> bool {
        self.tool == StrokeTool::Eraser
    }

    /// Point positions without pressure.
    pub fn positions(&self) -> impl Iterator<Item = Point> + '_ {
        self.points.iter().map(InkPoint::position)
    }

    /// Tight bounding box of the centerline (zero rect when empty).
    pub fn bounds(&self) -> Rect {
        geometry::points_bounds(self.positions()).unwrap_or(Rect::ZERO)
    }

    /// Bounding box including half the brush size, used for culling.
    pub fn render_bounds(&self) -> Rect {
        let half = self.settings.size / 2.0;
        self.bounds().inflate(half, half)
    }

    /// Check whether a circular eraser touches this stroke.
    pub fn intersects_circle(&self, center: Point, radius: f64) -> bool {
        let positions: Vec<Point> = self.positions().collect();
        geometry::polyline_intersects_circle(&positions, center, radius)
    }

    /// Apply one Laplacian smoothing pass; pressure values are kept as-is.
    pub fn smooth(&mut self, factor: f64) {
        if self.points.len() < 3 {
            return;
        }
        let positions: Vec<Point> = self.positions().collect();
        let smoothed = geometry::smooth_polyline(&positions, factor);
        for (point, position) in self.points.iter_mut().zip(smoothed) {
            *point = point.with_position(position);
        }
    }

    /// Polyline path for rendering.
    ///
    /// A single-point stroke becomes a zero-length segment so round caps paint a dot.
    pub fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        let Some(first) = self.points.first() else {
            return path;
        };
        path.move_to(first.position());
        if self.points.len() == 1 {
            path.line_to(first.position());
            return path;
        }
        for point in self.points.iter().skip(1) {
            path.line_to(point.position());
        }
        path
    }
}
