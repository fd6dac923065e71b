//! Stamped geometric shapes (rectangle, circle, line).

use super::{PrimitiveId, generate_id, now_millis};
use crate::geometry;
use kurbo::{BezPath, Ellipse, Point, Rect, Shape as KurboShape, Vec2};
use serde::{Deserialize, Serialize};

/// Kind of stamped shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Rectangle,
    /// An axis-aligned ellipse inscribed in the bounds.
    Circle,
    /// A segment from the top-left to the bottom-right corner of the bounds.
    Line,
}

/// Axis-aligned bounds: top-left origin plus non-negative size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Normalized bounds of a drag from `start` to `end`.
    pub fn from_corners(start: Point, end: Point) -> Self {
        Self::from(geometry::rect_from_corners(start, end))
    }

    /// As a kurbo Rect.
    pub fn as_rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

impl From<Rect> for Bounds {
    fn from(rect: Rect) -> Self {
        let rect = rect.abs();
        Self::new(rect.x0, rect.y0, rect.width(), rect.height())
    }
}

/// Style properties for shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeSettings {
    pub stroke_color: String,
    pub fill_color: String,
    pub stroke_width: f64,
    /// Whether `fill_color` is painted.
    pub filled: bool,
}

impl Default for ShapeSettings {
    fn default() -> Self {
        Self {
            stroke_color: "#000000".to_string(),
            fill_color: "transparent".to_string(),
            stroke_width: 2.0,
            filled: false,
        }
    }
}

/// A committed shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub id: PrimitiveId,
    #[serde(rename = "type")]
    pub kind: ShapeKind,
    pub bounds: Bounds,
    pub settings: ShapeSettings,
    /// Creation time in milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl Shape {
    /// Create a shape with a fresh id and the current timestamp.
    pub fn new(kind: ShapeKind, bounds: Bounds, settings: ShapeSettings) -> Self {
        Self {
            id: generate_id("shape"),
            kind,
            bounds,
            settings,
            timestamp: now_millis(),
        }
    }

    /// Create a shape from two content-space drag endpoints.
    pub fn from_drag(start: Point, end: Point, kind: ShapeKind, settings: ShapeSettings) -> Self {
        Self::new(kind, Bounds::from_corners(start, end), settings)
    }

    /// Bounding box in content space.
    pub fn bounds(&self) -> Rect {
        self.bounds.as_rect()
    }

    /// Bounding box including half the stroke width, used for culling.
    pub fn render_bounds(&self) -> Rect {
        let half = self.settings.stroke_width / 2.0;
        self.bounds().inflate(half, half)
    }

    /// Radii of the inscribed ellipse.
    pub fn radii(&self) -> Vec2 {
        Vec2::new(self.bounds.width / 2.0, self.bounds.height / 2.0)
    }

    /// Endpoints of a line shape.
    ///
    /// The drag direction is not stored, so the segment always runs from the
    /// top-left corner of the bounds to the bottom-right one.
    pub fn line_endpoints(&self) -> (Point, Point) {
        let rect = self.bounds();
        (Point::new(rect.x0, rect.y0), Point::new(rect.x1, rect.y1))
    }

    /// Check whether a circular eraser touches this shape.
    pub fn intersects_circle(&self, center: Point, radius: f64) -> bool {
        match self.kind {
            ShapeKind::Rectangle => geometry::rect_intersects_circle(self.bounds(), center, radius),
            ShapeKind::Circle => {
                geometry::ellipse_intersects_circle(self.bounds.center(), self.radii(), center, radius)
            }
            ShapeKind::Line => {
                let (start, end) = self.line_endpoints();
                geometry::segment_intersects_circle(start, end, center, radius)
            }
        }
    }

    /// Whether the fill should be painted.
    pub fn is_filled(&self) -> bool {
        self.settings.filled && self.kind != ShapeKind::Line
    }

    /// Path representation for rendering.
    pub fn to_path(&self) -> BezPath {
        match self.kind {
            ShapeKind::Rectangle => self.bounds().to_path(0.1),
            ShapeKind::Circle => {
                Ellipse::new(self.bounds.center(), self.radii(), 0.0).to_path(0.1)
            }
            ShapeKind::Line => {
                let (start, end) = self.line_endpoints();
                let mut path = BezPath::new();
                path.move_to(start);
                path.line_to(end);
                path
            }
        }
    }
}
