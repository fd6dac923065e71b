//! Circular eraser: hit-testing and removal of whole primitives.

use crate::shapes::PrimitiveId;
use crate::store::PrimitiveStore;
use kurbo::Point;

/// A circular eraser footprint in content space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Eraser {
    pub center: Point,
    pub radius: f64,
}

/// Primitives removed by one erase pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EraseOutcome {
    pub strokes: Vec<PrimitiveId>,
    pub shapes: Vec<PrimitiveId>,
}

impl EraseOutcome {
    /// Whether anything was removed (and a repaint is needed).
    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty() && self.shapes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.strokes.len() + self.shapes.len()
    }
}

impl Eraser {
    pub fn new(center: Point, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Ids of every primitive the eraser touches, without removing anything.
    pub fn hits(&self, store: &PrimitiveStore) -> EraseOutcome {
        EraseOutcome {
            strokes: store
                .strokes()
                .iter()
                .filter(|s| s.intersects_circle(self.center, self.radius))
                .map(|s| s.id.clone())
                .collect(),
            shapes: store
                .shapes()
                .iter()
                .filter(|s| s.intersects_circle(self.center, self.radius))
                .map(|s| s.id.clone())
                .collect(),
        }
    }

    /// Remove every primitive the eraser touches. There is no partial erasure.
    pub fn apply(&self, store: &mut PrimitiveStore) -> EraseOutcome {
        let (center, radius) = (self.center, self.radius);
        let strokes = store.remove_strokes_where(|s| s.intersects_circle(center, radius));
        let shapes = store.remove_shapes_where(|s| s.intersects_circle(center, radius));
        let outcome = EraseOutcome { strokes, shapes };
        if !outcome.is_empty() {
            log::debug!(
                "Eraser at ({:.1}, {:.1}) r={:.1} removed {} primitive(s)",
                center.x,
                center.y,
                radius,
                outcome.len()
            );
        }
        outcome
    }
}
