//! The drawing engine facade: owns a surface, a frame host and the engine
//! state, and turns every state transition into painted frames.

use crate::config::EngineConfig;
use inklayer_core::{
    DrawingPayload, EngineState, FrameHost, FrameToken, InkPoint, PayloadError, PrimitiveId, PrimitiveStore,
    RenderScheduler, Repaint, Shape, ShapeKind, ShapeSettings, StrokeSettings, StrokeTool, ViewTransform,
};
use inklayer_render::{RenderContext, Renderer, RendererError, Surface};
use kurbo::Vec2;
use thiserror::Error;

/// Engine errors.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Surface error: {0}")]
    Surface(#[from] RendererError),
    #[error("Invalid payload: {0}")]
    InvalidPayload(#[from] PayloadError),
    #[error("Payload JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Interactive drawing engine bound to one surface.
///
/// Pointer coordinates passed in are device space; everything stored is
/// content space.
pub struct DrawingEngine<S: Surface, H: FrameHost> {
    surface: S,
    host: H,
    renderer: Renderer,
    state: EngineState,
}

impl<S: Surface, H: FrameHost> DrawingEngine<S, H> {
    /// Bind to a surface and paint the initial (empty) frame.
    ///
    /// Fails when the surface cannot provide a drawing context.
    pub fn new(mut surface: S, host: H, config: EngineConfig) -> EngineResult<Self> {
        if let Err(e) = surface.acquire_context() {
            log::warn!("Failed to acquire drawing context: {}", e);
            return Err(e.into());
        }
        let physical = surface.physical_size();
        surface.configure(physical)?;

        let state = EngineState::new(
            ViewTransform::with_dead_zone(config.dead_zone),
            RenderScheduler::new(config.throttle_ms),
            config.state_options(),
        );
        let mut engine = Self {
            surface,
            host,
            renderer: Renderer::new(config.render),
            state,
        };
        log::info!(
            "Drawing engine ready: {}x{} @ {}x",
            physical.width,
            physical.height,
            engine.surface.scale_factor()
        );
        engine.redraw()?;
        Ok(engine)
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn store(&self) -> &PrimitiveStore {
        &self.state.store
    }

    pub fn transform(&self) -> &ViewTransform {
        &self.state.transform
    }

    pub fn is_destroyed(&self) -> bool {
        self.state.is_destroyed()
    }

    /// Number of stored strokes and shapes.
    pub fn primitive_count(&self) -> usize {
        self.state.store.len()
    }

    /// Whether a drawing session is active.
    pub fn is_drawing(&self) -> bool {
        self.state.session.is_active()
    }

    /// Re-read surface size and DPI, reconfigure the backing store and repaint.
    pub fn resize(&mut self) -> EngineResult<()> {
        if self.state.is_destroyed() {
            log::debug!("resize ignored: engine destroyed");
            return Ok(());
        }
        let physical = self.surface.physical_size();
        self.surface.configure(physical)?;
        log::debug!("Surface resized to {}x{}", physical.width, physical.height);
        self.redraw()
    }

    /// Release the pending frame. Safe to call more than once.
    pub fn destroy(&mut self) {
        if !self.state.is_destroyed() {
            log::debug!("Destroying drawing engine");
        }
        self.state.destroy(&mut self.host);
    }

    /// Set where the surface sits in device space.
    pub fn set_surface_origin(&mut self, origin: Vec2) {
        self.state.transform.surface_origin = origin;
    }

    pub fn start_drawing(&mut self, point: InkPoint, tool: StrokeTool, settings: StrokeSettings) -> EngineResult<()> {
        if self.state.is_destroyed() {
            return Ok(());
        }
        let repaint = self.state.start_drawing(point, tool, settings);
        self.apply(repaint)
    }

    pub fn continue_drawing(&mut self, point: InkPoint) -> EngineResult<()> {
        if !self.state.session.is_active() {
            log::debug!("continue_drawing ignored: no active session");
            return Ok(());
        }
        let repaint = self.state.continue_drawing(point);
        self.apply(repaint)
    }

    pub fn end_drawing(&mut self) -> EngineResult<()> {
        if !self.state.session.is_active() {
            log::debug!("end_drawing ignored: no active session");
            return Ok(());
        }
        let repaint = self.state.end_drawing();
        self.apply(repaint)
    }

    /// Commit a shape from two device-space drag endpoints.
    pub fn draw_shape(
        &mut self,
        start: InkPoint,
        end: InkPoint,
        kind: ShapeKind,
        settings: ShapeSettings,
    ) -> EngineResult<PrimitiveId> {
        let (id, repaint) = self.state.draw_shape(start, end, kind, settings);
        self.apply(repaint)?;
        Ok(id)
    }

    /// Paint a transient shape over a full redraw. Nothing is stored.
    pub fn preview_shape(
        &mut self,
        start: InkPoint,
        end: InkPoint,
        kind: ShapeKind,
        settings: ShapeSettings,
    ) -> EngineResult<()> {
        let repaint = self.state.preview_shape(start, end, kind, settings);
        self.apply(repaint)
    }

    /// Erase everything touched by a circle at a device-space point.
    ///
    /// Returns the number of primitives removed.
    pub fn erase(&mut self, point: InkPoint, size: f64) -> EngineResult<usize> {
        let (outcome, repaint) = self.state.erase(point, size);
        if !outcome.is_empty() {
            log::debug!(
                "Erased {} stroke(s) and {} shape(s)",
                outcome.strokes.len(),
                outcome.shapes.len()
            );
        }
        self.apply(repaint)?;
        Ok(outcome.len())
    }

    /// Throttled viewport update. Repaints on a later frame.
    pub fn set_viewport_transform(&mut self, scale: f64, offset: Vec2) -> EngineResult<()> {
        let repaint = self.state.set_viewport_transform(scale, offset, &mut self.host);
        self.apply(repaint)
    }

    /// Immediate viewport update: cancels any pending frame and repaints now.
    pub fn force_viewport_sync(&mut self, scale: f64, offset: Vec2) -> EngineResult<()> {
        let repaint = self.state.force_viewport_sync(scale, offset, &mut self.host);
        self.apply(repaint)
    }

    /// Deliver a frame callback previously requested from the host.
    pub fn on_frame(&mut self, token: FrameToken) -> EngineResult<()> {
        let repaint = self.state.on_frame(token, &mut self.host);
        self.apply(repaint)
    }

    pub fn screen_to_canvas(&self, point: InkPoint) -> InkPoint {
        self.state.transform.to_content(point)
    }

    pub fn canvas_to_screen(&self, point: InkPoint) -> InkPoint {
        self.state.transform.to_device(point)
    }

    /// Snapshot of the store.
    pub fn export_data(&self) -> DrawingPayload {
        self.state.export_data()
    }

    /// Replace the store with a copy of `payload`. No validation.
    pub fn import_data(&mut self, payload: &DrawingPayload) -> EngineResult<()> {
        let repaint = self.state.import_data(payload);
        self.apply(repaint)
    }

    /// Validate `payload`, then import it. The store is untouched on error.
    pub fn import_data_strict(&mut self, payload: &DrawingPayload) -> EngineResult<()> {
        if let Err(e) = payload.validate() {
            log::warn!("Rejected drawing payload: {}", e);
            return Err(e.into());
        }
        self.import_data(payload)
    }

    /// Serialize the store as JSON.
    pub fn export_json(&self) -> EngineResult<String> {
        Ok(self.export_data().to_json()?)
    }

    /// Parse and import a JSON payload.
    pub fn import_json(&mut self, json: &str) -> EngineResult<()> {
        let payload = DrawingPayload::from_json(json)?;
        self.import_data(&payload)
    }

    /// Empty the store and repaint.
    pub fn clear(&mut self) -> EngineResult<()> {
        let repaint = self.state.clear();
        self.apply(repaint)
    }

    /// Clear the surface and paint every visible primitive.
    pub fn redraw(&mut self) -> EngineResult<()> {
        self.paint_full(None)
    }

    fn apply(&mut self, repaint: Repaint) -> EngineResult<()> {
        match repaint {
            Repaint::None | Repaint::Scheduled => Ok(()),
            Repaint::Full => self.paint_full(None),
            Repaint::Preview(shape) => self.paint_full(Some(&shape)),
            Repaint::Segment { from, to, settings } => {
                if self.state.is_destroyed() {
                    return Ok(());
                }
                let ctx = self.render_context(None);
                let frame = self.renderer.segment_frame(&ctx, from, to, &settings);
                self.surface.present(&frame)?;
                Ok(())
            }
        }
    }

    fn paint_full(&mut self, preview: Option<&Shape>) -> EngineResult<()> {
        if self.state.is_destroyed() {
            log::debug!("Repaint skipped: engine destroyed");
            return Ok(());
        }
        let ctx = self.render_context(preview);
        let frame = self.renderer.build_frame(&ctx);
        self.surface.present(&frame)?;
        Ok(())
    }

    fn render_context<'a>(&'a self, preview: Option<&'a Shape>) -> RenderContext<'a> {
        let ctx = RenderContext::new(&self.state.store, &self.state.transform, self.surface.logical_size())
            .with_scale_factor(self.surface.scale_factor())
            .with_preview(preview);
        match self.state.session.active() {
            Some(session) if session.tool == StrokeTool::Pen => {
                ctx.with_live_stroke(&session.points, &session.settings)
            }
            _ => ctx,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inklayer_core::{Bounds, ManualFrameHost, Stroke};
    use inklayer_render::{DrawCommand, RecordingSurface, RenderMode};

    type TestEngine = DrawingEngine<RecordingSurface, ManualFrameHost>;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn engine() -> TestEngine {
        init_logger();
        DrawingEngine::new(
            RecordingSurface::new(800.0, 600.0),
            ManualFrameHost::new(),
            EngineConfig::default(),
        )
        .unwrap()
    }

    fn pen() -> StrokeSettings {
        StrokeSettings {
            size: 4.0,
            color: "#ff0000".to_string(),
            opacity: 1.0,
        }
    }

    fn presents(engine: &TestEngine) -> usize {
        engine.surface().present_count()
    }

    #[test]
    fn test_construction_paints_initial_frame() {
        let engine = engine();
        assert_eq!(presents(&engine), 1);
        assert!(engine.surface().last_frame().unwrap().is_full());
        assert!(engine.surface().configured_size().is_some());
        assert_eq!(engine.primitive_count(), 0);
    }

    #[test]
    fn test_construction_fails_without_context() {
        init_logger();
        let result = DrawingEngine::new(
            RecordingSurface::unavailable(800.0, 600.0),
            ManualFrameHost::new(),
            EngineConfig::default(),
        );
        assert!(matches!(
            result,
            Err(EngineError::Surface(RendererError::ContextUnavailable(_)))
        ));
    }

    #[test]
    fn test_pen_stroke_scenario() {
        let mut engine = engine();
        engine.force_viewport_sync(2.0, Vec2::new(100.0, 50.0)).unwrap();
        engine.surface_mut().clear_frames();

        engine
            .start_drawing(InkPoint::new(120.0, 70.0), StrokeTool::Pen, pen())
            .unwrap();
        engine.continue_drawing(InkPoint::new(140.0, 90.0)).unwrap();
        engine.continue_drawing(InkPoint::new(160.0, 70.0)).unwrap();
        assert!(engine.is_drawing());
        // Only incremental overlays while drawing.
        assert_eq!(engine.surface().full_frame_count(), 0);
        assert_eq!(presents(&engine), 3);

        engine.end_drawing().unwrap();
        assert!(!engine.is_drawing());
        assert_eq!(engine.surface().full_frame_count(), 1);

        let payload = engine.export_data();
        assert_eq!(payload.strokes.len(), 1);
        let stroke = &payload.strokes[0];
        assert!(stroke.id.starts_with("stroke-"));
        assert_eq!(stroke.len(), 3);
        // Endpoints are content space and untouched by smoothing.
        assert!((stroke.points[0].x - 10.0).abs() < f64::EPSILON);
        assert!((stroke.points[0].y - 10.0).abs() < f64::EPSILON);
        assert!((stroke.points[2].x - 30.0).abs() < f64::EPSILON);
        // Interior point pulled toward its neighbours: 20 + (10 + 10 - 40) * 0.3
        assert!((stroke.points[1].y - 14.0).abs() < 1e-9);
    }

    #[test]
    fn test_full_repaint_keeps_live_stroke() {
        let mut engine = engine();
        engine
            .start_drawing(InkPoint::new(10.0, 10.0), StrokeTool::Pen, pen())
            .unwrap();
        engine.continue_drawing(InkPoint::new(30.0, 40.0)).unwrap();
        engine.continue_drawing(InkPoint::new(50.0, 20.0)).unwrap();

        engine.host_mut().advance(100.0);
        engine.set_viewport_transform(1.5, Vec2::ZERO).unwrap();
        let token = engine.host_mut().take_frame().unwrap();
        engine.on_frame(token).unwrap();

        assert!(engine.is_drawing());
        let frame = engine.surface().last_frame().unwrap();
        assert!(frame.is_full());
        assert_eq!(frame.path_count(), 1);
        match frame.commands.last() {
            Some(DrawCommand::StrokePath { path, paint }) => {
                assert_eq!(path.elements().len(), 3);
                assert!((paint.width - 4.0).abs() < f64::EPSILON);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_restart_repaint_shows_new_dot() {
        let mut engine = engine();
        engine
            .start_drawing(InkPoint::new(10.0, 10.0), StrokeTool::Pen, pen())
            .unwrap();
        engine.continue_drawing(InkPoint::new(30.0, 40.0)).unwrap();
        // Auto-commits the first stroke and repaints in full.
        engine
            .start_drawing(InkPoint::new(200.0, 200.0), StrokeTool::Pen, pen())
            .unwrap();

        let frame = engine.surface().last_frame().unwrap();
        assert!(frame.is_full());
        assert_eq!(frame.stats.strokes_drawn, 1);
        assert_eq!(frame.path_count(), 2);
    }

    #[test]
    fn test_shape_scenario() {
        let mut engine = engine();
        let id = engine
            .draw_shape(
                InkPoint::new(300.0, 200.0),
                InkPoint::new(100.0, 50.0),
                ShapeKind::Rectangle,
                ShapeSettings::default(),
            )
            .unwrap();
        assert!(id.starts_with("shape-"));
        let shape = engine.store().shape(&id).unwrap();
        assert_eq!(shape.bounds, Bounds::new(100.0, 50.0, 200.0, 150.0));
        assert_eq!(engine.surface().full_frame_count(), 2);
    }

    #[test]
    fn test_eraser_scenario() {
        let mut engine = engine();
        let near = Stroke::pen(
            vec![InkPoint::new(0.0, 0.0), InkPoint::new(100.0, 0.0)],
            StrokeSettings::default(),
        );
        let far = Stroke::pen(
            vec![InkPoint::new(0.0, 500.0), InkPoint::new(100.0, 500.0)],
            StrokeSettings::default(),
        );
        let payload = DrawingPayload {
            strokes: vec![near, far.clone()],
            ..DrawingPayload::new()
        };
        engine.import_data(&payload).unwrap();

        // Size 20 -> radius 10; the circle at (50, 5) touches y = 0.
        let removed = engine.erase(InkPoint::new(50.0, 5.0), 20.0).unwrap();
        assert_eq!(removed, 1);
        assert_eq!(engine.store().stroke_count(), 1);
        assert_eq!(engine.store().strokes()[0].id, far.id);

        let before = presents(&engine);
        assert_eq!(engine.erase(InkPoint::new(400.0, 300.0), 20.0).unwrap(), 0);
        assert_eq!(presents(&engine), before);
    }

    #[test]
    fn test_eraser_session_commits_nothing() {
        let mut engine = engine();
        engine
            .draw_shape(
                InkPoint::new(0.0, 0.0),
                InkPoint::new(50.0, 50.0),
                ShapeKind::Rectangle,
                ShapeSettings::default(),
            )
            .unwrap();
        engine
            .start_drawing(InkPoint::new(400.0, 400.0), StrokeTool::Eraser, pen())
            .unwrap();
        engine.continue_drawing(InkPoint::new(25.0, 25.0)).unwrap();
        engine.end_drawing().unwrap();
        assert_eq!(engine.primitive_count(), 0);
    }

    #[test]
    fn test_viewport_dead_zone_and_throttle() {
        let mut engine = engine();
        engine.force_viewport_sync(1.0, Vec2::ZERO).unwrap();
        let base = presents(&engine);

        engine.set_viewport_transform(1.0005, Vec2::new(0.05, 0.0)).unwrap();
        assert_eq!(engine.host().requested(), 0);

        engine.set_viewport_transform(1.5, Vec2::new(20.0, 0.0)).unwrap();
        engine.set_viewport_transform(1.6, Vec2::new(30.0, 0.0)).unwrap();
        assert_eq!(engine.host().outstanding(), 1);
        assert_eq!(presents(&engine), base);

        // Fires too soon after the forced repaint: deferred.
        let token = engine.host_mut().take_frame().unwrap();
        engine.on_frame(token).unwrap();
        assert_eq!(presents(&engine), base);

        engine.host_mut().advance(20.0);
        let token = engine.host_mut().take_frame().unwrap();
        engine.on_frame(token).unwrap();
        assert_eq!(presents(&engine), base + 1);
        assert!((engine.transform().scale - 1.6).abs() < f64::EPSILON);
    }

    #[test]
    fn test_force_sync_cancels_pending_frame() {
        let mut engine = engine();
        engine.host_mut().advance(100.0);
        engine.set_viewport_transform(2.0, Vec2::ZERO).unwrap();
        let token = engine.host_mut().take_frame().unwrap();

        engine.force_viewport_sync(3.0, Vec2::ZERO).unwrap();
        let after_force = presents(&engine);
        // The superseded token is ignored.
        engine.on_frame(token).unwrap();
        assert_eq!(presents(&engine), after_force);
    }

    #[test]
    fn test_screen_canvas_round_trip() {
        let mut engine = engine();
        engine.set_surface_origin(Vec2::new(10.0, 20.0));
        engine.force_viewport_sync(2.5, Vec2::new(-40.0, 15.0)).unwrap();
        let p = InkPoint::new(123.0, 456.0);
        let back = engine.canvas_to_screen(engine.screen_to_canvas(p));
        assert!((back.x - p.x).abs() < 1e-9);
        assert!((back.y - p.y).abs() < 1e-9);
    }

    #[test]
    fn test_import_export_round_trip() {
        let mut source = engine();
        source
            .start_drawing(InkPoint::new(10.0, 10.0), StrokeTool::Pen, pen())
            .unwrap();
        source.continue_drawing(InkPoint::new(20.0, 30.0)).unwrap();
        source.end_drawing().unwrap();
        source
            .draw_shape(
                InkPoint::new(0.0, 0.0),
                InkPoint::new(40.0, 40.0),
                ShapeKind::Circle,
                ShapeSettings::default(),
            )
            .unwrap();

        let json = source.export_json().unwrap();
        let mut target = engine();
        target.import_json(&json).unwrap();
        assert_eq!(target.export_data(), source.export_data());
    }

    #[test]
    fn test_export_is_a_snapshot() {
        let mut engine = engine();
        let snapshot = engine.export_data();
        engine
            .draw_shape(
                InkPoint::new(0.0, 0.0),
                InkPoint::new(10.0, 10.0),
                ShapeKind::Line,
                ShapeSettings::default(),
            )
            .unwrap();
        assert!(snapshot.is_empty());
        assert_eq!(engine.export_data().shapes.len(), 1);
    }

    #[test]
    fn test_import_strict_rejects_invalid() {
        let mut engine = engine();
        let payload = DrawingPayload {
            strokes: vec![Stroke::pen(Vec::new(), StrokeSettings::default())],
            ..DrawingPayload::new()
        };
        let result = engine.import_data_strict(&payload);
        assert!(matches!(result, Err(EngineError::InvalidPayload(_))));
        assert_eq!(engine.primitive_count(), 0);

        // The permissive path accepts it.
        engine.import_data(&payload).unwrap();
        assert_eq!(engine.primitive_count(), 1);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut engine = engine();
        engine
            .draw_shape(
                InkPoint::new(0.0, 0.0),
                InkPoint::new(10.0, 10.0),
                ShapeKind::Rectangle,
                ShapeSettings::default(),
            )
            .unwrap();
        engine.clear().unwrap();
        let once = engine.export_data();
        engine.clear().unwrap();
        assert_eq!(engine.export_data(), once);
        assert!(once.is_empty());
    }

    #[test]
    fn test_preview_not_stored() {
        let mut engine = engine();
        engine
            .preview_shape(
                InkPoint::new(0.0, 0.0),
                InkPoint::new(50.0, 50.0),
                ShapeKind::Circle,
                ShapeSettings::default(),
            )
            .unwrap();
        assert_eq!(engine.primitive_count(), 0);
        let frame = engine.surface().last_frame().unwrap();
        assert!(frame.is_full());
        assert!(matches!(frame.commands.last(), Some(DrawCommand::StrokePath { .. })));
    }

    #[test]
    fn test_resize_reconfigures_surface() {
        let mut engine = engine();
        engine.surface_mut().set_logical_size(1024.0, 768.0);
        engine.surface_mut().set_scale_factor(2.0);
        engine.resize().unwrap();
        assert_eq!(
            engine.surface().configured_size(),
            Some(kurbo::Size::new(2048.0, 1536.0))
        );
        assert_eq!(presents(&engine), 2);
    }

    #[test]
    fn test_destroy_is_idempotent_and_stops_painting() {
        let mut engine = engine();
        engine.set_viewport_transform(2.0, Vec2::ZERO).unwrap();
        assert_eq!(engine.host().outstanding(), 1);

        engine.destroy();
        engine.destroy();
        assert!(engine.is_destroyed());
        assert_eq!(engine.host().outstanding(), 0);
        assert_eq!(engine.host().cancelled(), 1);

        let before = presents(&engine);
        engine.redraw().unwrap();
        engine.resize().unwrap();
        engine
            .start_drawing(InkPoint::new(0.0, 0.0), StrokeTool::Pen, pen())
            .unwrap();
        assert_eq!(presents(&engine), before);
        assert!(!engine.is_drawing());
    }

    #[test]
    fn test_zoomed_out_frame_is_empty() {
        let mut engine = engine();
        engine
            .draw_shape(
                InkPoint::new(0.0, 0.0),
                InkPoint::new(10.0, 10.0),
                ShapeKind::Rectangle,
                ShapeSettings::default(),
            )
            .unwrap();
        engine.force_viewport_sync(0.05, Vec2::ZERO).unwrap();
        let frame = engine.surface().last_frame().unwrap();
        assert_eq!(frame.stats.mode, RenderMode::Skipped);
        assert_eq!(frame.path_count(), 0);
    }
}
