//! The engine's mutable state as one explicit record.
//!
//! Every operation is a transition on [`EngineState`] that returns a
//! [`Repaint`] describing what must be painted. Nothing here touches a
//! surface, so the whole lifecycle can be tested without one.

use crate::eraser::{EraseOutcome, Eraser};
use crate::geometry::DEFAULT_SMOOTHING_FACTOR;
use crate::scheduler::{FrameAction, FrameHost, FrameToken, RenderScheduler};
use crate::shapes::{InkPoint, PrimitiveId, Shape, ShapeKind, ShapeSettings, StrokeSettings, StrokeTool};
use crate::store::{DrawingPayload, PrimitiveStore};
use crate::tools::{ActiveSession, SessionState, SessionStep};
use crate::transform::ViewTransform;
use kurbo::{Point, Vec2};

/// Paint work produced by a state transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Repaint {
    /// Nothing visible changed.
    None,
    /// Paint one new pen segment on top of the current frame.
    Segment {
        from: Option<InkPoint>,
        to: InkPoint,
        settings: StrokeSettings,
    },
    /// Clear and repaint everything now.
    Full,
    /// Full repaint plus a transient shape that is not stored.
    Preview(Shape),
    /// A repaint was requested from the frame host.
    Scheduled,
}

/// Tunables for the state transitions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateOptions {
    /// Weight of the Laplacian pass applied when a stroke is committed.
    pub smoothing_factor: f64,
    /// Eraser radius = brush size × this factor (device pixels, before zoom).
    pub eraser_radius_factor: f64,
}

impl Default for StateOptions {
    fn default() -> Self {
        Self {
            smoothing_factor: DEFAULT_SMOOTHING_FACTOR,
            eraser_radius_factor: 0.5,
        }
    }
}

/// Everything the drawing engine mutates.
#[derive(Debug, Clone, Default)]
pub struct EngineState {
    pub store: PrimitiveStore,
    pub transform: ViewTransform,
    pub session: SessionState,
    pub scheduler: RenderScheduler,
    pub options: StateOptions,
    destroyed: bool,
}

impl EngineState {
    pub fn new(transform: ViewTransform, scheduler: RenderScheduler, options: StateOptions) -> Self {
        Self {
            store: PrimitiveStore::new(),
            transform,
            session: SessionState::Idle,
            scheduler,
            options,
            destroyed: false,
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Content-space eraser radius for a device-space brush size.
    pub fn eraser_radius(&self, size: f64) -> f64 {
        self.transform
            .length_to_content(size * self.options.eraser_radius_factor)
    }

    /// Pointer down: open a session, committing any session still active.
    pub fn start_drawing(&mut self, device: InkPoint, tool: StrokeTool, settings: StrokeSettings) -> Repaint {
        let point = self.transform.to_content(device);
        let (previous, step) = self.session.begin(tool, settings, point);
        let committed = previous.is_some_and(|session| self.commit(session));
        let repaint = self.apply_step(step);
        if committed && repaint != Repaint::Full {
            // The auto-committed stroke was smoothed, so the old overlay is stale.
            return Repaint::Full;
        }
        repaint
    }

    /// Pointer move: extend the active session.
    pub fn continue_drawing(&mut self, device: InkPoint) -> Repaint {
        if !self.session.is_active() {
            return Repaint::None;
        }
        let point = self.transform.to_content(device);
        let step = self.session.push(point);
        self.apply_step(step)
    }

    /// Pointer up: commit the pen stroke, if any.
    pub fn end_drawing(&mut self) -> Repaint {
        let committed = match self.session.finish() {
            Some(session) => self.commit(session),
            None => false,
        };
        if committed { Repaint::Full } else { Repaint::None }
    }

    fn commit(&mut self, session: ActiveSession) -> bool {
        match session.into_stroke(self.options.smoothing_factor) {
            Some(stroke) => {
                log::debug!("Committed stroke {} ({} points)", stroke.id, stroke.len());
                self.store.add_stroke(stroke);
                true
            }
            None => false,
        }
    }

    fn apply_step(&mut self, step: SessionStep) -> Repaint {
        match step {
            SessionStep::Ignored => Repaint::None,
            SessionStep::PenSegment { from, to, settings } => Repaint::Segment { from, to, settings },
            SessionStep::Erase { at, settings } => {
                let radius = self.eraser_radius(settings.size);
                let outcome = self.erase_content(at.position(), radius);
                if outcome.is_empty() { Repaint::None } else { Repaint::Full }
            }
        }
    }

    /// Standalone erase at a device-space point with a device-space brush size.
    pub fn erase(&mut self, device: InkPoint, size: f64) -> (EraseOutcome, Repaint) {
        let center = self.transform.to_content(device).position();
        let outcome = self.erase_content(center, self.eraser_radius(size));
        let repaint = if outcome.is_empty() { Repaint::None } else { Repaint::Full };
        (outcome, repaint)
    }

    /// Erase with a content-space center and radius.
    pub fn erase_content(&mut self, center: Point, radius: f64) -> EraseOutcome {
        Eraser::new(center, radius).apply(&mut self.store)
    }

    /// Shape built from two device-space drag endpoints.
    pub fn shape_from_drag(&self, start: InkPoint, end: InkPoint, kind: ShapeKind, settings: ShapeSettings) -> Shape {
        let start = self.transform.to_content(start).position();
        let end = self.transform.to_content(end).position();
        Shape::from_drag(start, end, kind, settings)
    }

    /// Commit a shape from a device-space drag.
    pub fn draw_shape(
        &mut self,
        start: InkPoint,
        end: InkPoint,
        kind: ShapeKind,
        settings: ShapeSettings,
    ) -> (PrimitiveId, Repaint) {
        let shape = self.shape_from_drag(start, end, kind, settings);
        let id = shape.id.clone();
        log::debug!("Committed {:?} shape {}", shape.kind, id);
        self.store.add_shape(shape);
        (id, Repaint::Full)
    }

    /// Preview a shape from a device-space drag without storing it.
    pub fn preview_shape(&self, start: InkPoint, end: InkPoint, kind: ShapeKind, settings: ShapeSettings) -> Repaint {
        Repaint::Preview(self.shape_from_drag(start, end, kind, settings))
    }

    /// Throttled viewport update from the host.
    pub fn set_viewport_transform(&mut self, scale: f64, offset: Vec2, host: &mut dyn FrameHost) -> Repaint {
        if self.destroyed || !self.transform.set_transform(scale, offset) {
            return Repaint::None;
        }
        self.scheduler.request(host);
        Repaint::Scheduled
    }

    /// Immediate viewport update: cancels any pending frame and repaints now.
    pub fn force_viewport_sync(&mut self, scale: f64, offset: Vec2, host: &mut dyn FrameHost) -> Repaint {
        self.transform.force_sync(scale, offset);
        if self.destroyed {
            return Repaint::None;
        }
        self.scheduler.force(host);
        Repaint::Full
    }

    /// A frame callback from the host fired.
    pub fn on_frame(&mut self, token: FrameToken, host: &mut dyn FrameHost) -> Repaint {
        if self.destroyed {
            return Repaint::None;
        }
        match self.scheduler.on_frame(token, host) {
            FrameAction::Redraw => Repaint::Full,
            FrameAction::Deferred(_) | FrameAction::Stale => Repaint::None,
        }
    }

    /// Replace the store with a copy of `payload`.
    pub fn import_data(&mut self, payload: &DrawingPayload) -> Repaint {
        self.store.import(payload);
        log::info!(
            "Imported drawing: {} stroke(s), {} shape(s)",
            self.store.stroke_count(),
            self.store.shape_count()
        );
        Repaint::Full
    }

    /// Snapshot the store.
    pub fn export_data(&self) -> DrawingPayload {
        self.store.export()
    }

    /// Empty the store.
    pub fn clear(&mut self) -> Repaint {
        self.store.clear();
        Repaint::Full
    }

    /// Release the pending frame. Safe to call more than once.
    pub fn destroy(&mut self, host: &mut dyn FrameHost) {
        self.scheduler.cancel(host);
        self.session = SessionState::Idle;
        self.destroyed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::ManualFrameHost;

    fn pen() -> StrokeSettings {
        StrokeSettings::default()
    }

    #[test]
    fn test_pen_scenario() {
        let mut state = EngineState::default();
        state.start_drawing(InkPoint::new(100.0, 100.0), StrokeTool::Pen, pen());
        let repaint = state.continue_drawing(InkPoint::new(150.0, 150.0));
        assert!(matches!(repaint, Repaint::Segment { from: Some(_), .. }));
        assert_eq!(state.end_drawing(), Repaint::Full);

        let data = state.export_data();
        assert_eq!(data.strokes.len(), 1);
        assert_eq!(
            data.strokes[0].points,
            vec![InkPoint::new(100.0, 100.0), InkPoint::new(150.0, 150.0)]
        );
    }

    #[test]
    fn test_stroke_is_committed_in_content_space() {
        let mut state = EngineState::default();
        state.transform.force_sync(2.0, Vec2::new(10.0, 20.0));
        state.start_drawing(InkPoint::new(110.0, 220.0), StrokeTool::Pen, pen());
        state.end_drawing();
        let point = state.export_data().strokes[0].points[0];
        assert!((point.x - 50.0).abs() < f64::EPSILON);
        assert!((point.y - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_out_of_order_calls_are_ignored() {
        let mut state = EngineState::default();
        assert_eq!(state.continue_drawing(InkPoint::new(1.0, 1.0)), Repaint::None);
        assert_eq!(state.end_drawing(), Repaint::None);
        assert!(state.export_data().strokes.is_empty());
    }

    #[test]
    fn test_end_drawing_repaints_only_on_commit() {
        let mut state = EngineState::default();
        state.start_drawing(InkPoint::new(5.0, 5.0), StrokeTool::Pen, pen());
        assert_eq!(state.end_drawing(), Repaint::Full);
        assert!(!state.session.is_active());

        state.start_drawing(InkPoint::new(500.0, 500.0), StrokeTool::Eraser, pen());
        assert_eq!(state.end_drawing(), Repaint::None);
        assert!(!state.session.is_active());
        assert_eq!(state.export_data().strokes.len(), 1);
    }

    #[test]
    fn test_restart_auto_commits() {
        let mut state = EngineState::default();
        state.start_drawing(InkPoint::new(0.0, 0.0), StrokeTool::Pen, pen());
        state.continue_drawing(InkPoint::new(10.0, 0.0));
        assert_eq!(
            state.start_drawing(InkPoint::new(50.0, 50.0), StrokeTool::Pen, pen()),
            Repaint::Full
        );
        state.end_drawing();
        assert_eq!(state.export_data().strokes.len(), 2);
    }

    #[test]
    fn test_eraser_session_erases_incrementally() {
        let mut state = EngineState::default();
        state.start_drawing(InkPoint::new(0.0, 0.0), StrokeTool::Pen, pen());
        state.end_drawing();
        state.start_drawing(InkPoint::new(500.0, 500.0), StrokeTool::Pen, pen());
        state.end_drawing();

        let eraser = StrokeSettings { size: 10.0, ..pen() };
        assert_eq!(
            state.start_drawing(InkPoint::new(200.0, 200.0), StrokeTool::Eraser, eraser),
            Repaint::None
        );
        assert_eq!(state.continue_drawing(InkPoint::new(2.0, 2.0)), Repaint::Full);
        assert_eq!(state.export_data().strokes.len(), 1);
        // Nothing is committed for the eraser itself
        assert_eq!(state.end_drawing(), Repaint::None);
        assert_eq!(state.export_data().strokes.len(), 1);
    }

    #[test]
    fn test_eraser_radius_follows_zoom() {
        let mut state = EngineState::default();
        assert!((state.eraser_radius(10.0) - 5.0).abs() < f64::EPSILON);
        state.transform.force_sync(2.0, Vec2::ZERO);
        assert!((state.eraser_radius(10.0) - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_preview_does_not_store() {
        let state = EngineState::default();
        let repaint = state.preview_shape(
            InkPoint::new(0.0, 0.0),
            InkPoint::new(10.0, 10.0),
            ShapeKind::Circle,
            ShapeSettings::default(),
        );
        assert!(matches!(repaint, Repaint::Preview(_)));
        assert!(state.export_data().shapes.is_empty());
    }

    #[test]
    fn test_dead_zone_skips_scheduling() {
        let mut host = ManualFrameHost::new();
        let mut state = EngineState::default();
        assert_eq!(state.set_viewport_transform(1.00005, Vec2::ZERO, &mut host), Repaint::None);
        assert_eq!(host.requested(), 0);
        assert_eq!(state.set_viewport_transform(1.5, Vec2::ZERO, &mut host), Repaint::Scheduled);
        assert_eq!(host.requested(), 1);
    }

    #[test]
    fn test_destroyed_state_ignores_frames() {
        let mut host = ManualFrameHost::new();
        let mut state = EngineState::default();
        state.set_viewport_transform(2.0, Vec2::ZERO, &mut host);
        let token = state.scheduler.pending().unwrap();
        state.destroy(&mut host);
        state.destroy(&mut host);
        assert_eq!(host.outstanding(), 0);
        assert_eq!(state.on_frame(token, &mut host), Repaint::None);
    }
}
