//! Drawing primitives: freehand strokes and stamped shapes.

mod shape;
mod stroke;

pub use shape::{Bounds, Shape, ShapeKind, ShapeSettings};
pub use stroke::{Stroke, StrokeSettings, StrokeTool};

use kurbo::Point;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(target_arch = "wasm32")]
use web_time::{SystemTime, UNIX_EPOCH};
#[cfg(not(target_arch = "wasm32"))]
use std::time::{SystemTime, UNIX_EPOCH};

/// Unique identifier for strokes and shapes.
///
/// Kept as a string so payloads written by other editors round-trip untouched.
pub type PrimitiveId = String;

/// Generate a fresh identifier, e.g. `stroke-0f8fad5b-...`.
pub(crate) fn generate_id(prefix: &str) -> PrimitiveId {
    format!("{}-{}", prefix, Uuid::new_v4())
}

/// Milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// A sampled pointer position with optional pen pressure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InkPoint {
    pub x: f64,
    pub y: f64,
    /// Pen pressure in `[0, 1]`, when the input device reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure: Option<f64>,
}

impl InkPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, pressure: None }
    }

    pub fn with_pressure(x: f64, y: f64, pressure: f64) -> Self {
        Self {
            x,
            y,
            pressure: Some(pressure),
        }
    }

    /// Position as a kurbo point.
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Same pressure, new position.
    pub fn with_position(&self, position: Point) -> Self {
        Self {
            x: position.x,
            y: position.y,
            pressure: self.pressure,
        }
    }
}

impl From<Point> for InkPoint {
    fn from(point: Point) -> Self {
        Self::new(point.x, point.y)
    }
}

impl From<InkPoint> for Point {
    fn from(point: InkPoint) -> Self {
        point.position()
    }
}
