//! Primitive store and the persisted drawing payload.

use crate::shapes::{PrimitiveId, Shape, Stroke, StrokeTool};
use kurbo::Rect;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Payload version written by this engine.
pub const PAYLOAD_VERSION: &str = "1.0";

/// Problems found by [`DrawingPayload::validate`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PayloadError {
    #[error("Duplicate primitive id: {0}")]
    DuplicateId(PrimitiveId),
    #[error("Stroke {0} has no points")]
    EmptyStroke(PrimitiveId),
    #[error("Stroke {0} is an eraser stroke")]
    EraserStroke(PrimitiveId),
    #[error("Stroke {id} has invalid size {size}")]
    InvalidSize { id: PrimitiveId, size: f64 },
    #[error("Stroke {id} has opacity {opacity} outside [0, 1]")]
    InvalidOpacity { id: PrimitiveId, opacity: f64 },
    #[error("Stroke {id} has pressure {pressure} outside [0, 1]")]
    InvalidPressure { id: PrimitiveId, pressure: f64 },
    #[error("Shape {id} has invalid stroke width {width}")]
    InvalidStrokeWidth { id: PrimitiveId, width: f64 },
    #[error("Shape {0} has negative or non-finite bounds")]
    InvalidBounds(PrimitiveId),
}

/// The unit that crosses the engine boundary for persistence.
///
/// Usually embedded as a sub-object of a larger host document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawingPayload {
    /// Opaque to the engine; passed through unchanged.
    pub version: String,
    pub strokes: Vec<Stroke>,
    pub shapes: Vec<Shape>,
}

impl Default for DrawingPayload {
    fn default() -> Self {
        Self {
            version: PAYLOAD_VERSION.to_string(),
            strokes: Vec::new(),
            shapes: Vec::new(),
        }
    }
}

impl DrawingPayload {
    /// Empty payload with the current version.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty() && self.shapes.is_empty()
    }

    /// Serialize the payload to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize a payload from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Check the structural invariants of the payload.
    ///
    /// The engine itself imports payloads without this check; callers that
    /// want strict input handling run it first.
    pub fn validate(&self) -> Result<(), PayloadError> {
        let mut seen = HashSet::new();

        for stroke in &self.strokes {
            if !seen.insert(stroke.id.as_str()) {
                return Err(PayloadError::DuplicateId(stroke.id.clone()));
            }
            if stroke.tool == StrokeTool::Eraser {
                return Err(PayloadError::EraserStroke(stroke.id.clone()));
            }
            if stroke.points.is_empty() {
                return Err(PayloadError::EmptyStroke(stroke.id.clone()));
            }
            let settings = &stroke.settings;
            if !(settings.size > 0.0 && settings.size.is_finite()) {
                return Err(PayloadError::InvalidSize {
                    id: stroke.id.clone(),
                    size: settings.size,
                });
            }
            if !(0.0..=1.0).contains(&settings.opacity) {
                return Err(PayloadError::InvalidOpacity {
                    id: stroke.id.clone(),
                    opacity: settings.opacity,
                });
            }
            if let Some(pressure) = stroke
                .points
                .iter()
                .filter_map(|p| p.pressure)
                .find(|p| !(0.0..=1.0).contains(p))
            {
                return Err(PayloadError::InvalidPressure {
                    id: stroke.id.clone(),
                    pressure,
                });
            }
        }

        for shape in &self.shapes {
            if !seen.insert(shape.id.as_str()) {
                return Err(PayloadError::DuplicateId(shape.id.clone()));
            }
            let width = shape.settings.stroke_width;
            if !(width > 0.0 && width.is_finite()) {
                return Err(PayloadError::InvalidStrokeWidth {
                    id: shape.id.clone(),
                    width,
                });
            }
            let b = &shape.bounds;
            let finite = [b.x, b.y, b.width, b.height].iter().all(|v| v.is_finite());
            if !finite || b.width < 0.0 || b.height < 0.0 {
                return Err(PayloadError::InvalidBounds(shape.id.clone()));
            }
        }

        Ok(())
    }
}

/// Ordered, in-memory collection of committed strokes and shapes.
///
/// Strokes and shapes keep insertion order, which is also paint order.
#[derive(Debug, Clone)]
pub struct PrimitiveStore {
    version: String,
    strokes: Vec<Stroke>,
    shapes: Vec<Shape>,
}

impl Default for PrimitiveStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PrimitiveStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            version: PAYLOAD_VERSION.to_string(),
            strokes: Vec::new(),
            shapes: Vec::new(),
        }
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn stroke_count(&self) -> usize {
        self.strokes.len()
    }

    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    /// Total number of primitives.
    pub fn len(&self) -> usize {
        self.strokes.len() + self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty() && self.shapes.is_empty()
    }

    /// Append a stroke (paints above everything added before it).
    pub fn add_stroke(&mut self, stroke: Stroke) {
        self.strokes.push(stroke);
    }

    /// Append a shape.
    pub fn add_shape(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }

    pub fn stroke(&self, id: &str) -> Option<&Stroke> {
        self.strokes.iter().find(|s| s.id == id)
    }

    pub fn shape(&self, id: &str) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.id == id)
    }

    /// Remove a stroke or shape by id.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.len();
        self.strokes.retain(|s| s.id != id);
        self.shapes.retain(|s| s.id != id);
        self.len() != before
    }

    /// Remove every stroke matching the predicate, returning the removed ids.
    pub fn remove_strokes_where(&mut self, mut pred: impl FnMut(&Stroke) -> bool) -> Vec<PrimitiveId> {
        let mut removed = Vec::new();
        self.strokes.retain(|s| {
            if pred(s) {
                removed.push(s.id.clone());
                false
            } else {
                true
            }
        });
        removed
    }

    /// Remove every shape matching the predicate, returning the removed ids.
    pub fn remove_shapes_where(&mut self, mut pred: impl FnMut(&Shape) -> bool) -> Vec<PrimitiveId> {
        let mut removed = Vec::new();
        self.shapes.retain(|s| {
            if pred(s) {
                removed.push(s.id.clone());
                false
            } else {
                true
            }
        });
        removed
    }

    /// Empty both collections.
    pub fn clear(&mut self) {
        self.strokes.clear();
        self.shapes.clear();
    }

    /// Union of all primitive bounds, or `None` when empty.
    pub fn content_bounds(&self) -> Option<Rect> {
        let strokes = self.strokes.iter().filter(|s| !s.is_empty()).map(Stroke::bounds);
        let shapes = self.shapes.iter().map(Shape::bounds);
        strokes.chain(shapes).reduce(|acc, r| acc.union(r))
    }

    /// Replace the contents with a copy of `payload`. No validation is done.
    pub fn import(&mut self, payload: &DrawingPayload) {
        self.version = payload.version.clone();
        self.strokes = payload.strokes.clone();
        self.shapes = payload.shapes.clone();
    }

    /// Snapshot the current contents.
    pub fn export(&self) -> DrawingPayload {
        DrawingPayload {
            version: self.version.clone(),
            strokes: self.strokes.clone(),
            shapes: self.shapes.clone(),
        }
    }
}
