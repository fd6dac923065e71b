//! Frame building: turns the primitive store into render commands.

use crate::adaptive::{self, BatchKey, RenderConfig};
use crate::color::{parse_color, with_opacity};
use crate::commands::{DrawCommand, Frame, RenderMode, RenderQuality, StrokePaint};
use inklayer_core::geometry::rects_overlap;
use inklayer_core::{InkPoint, PrimitiveStore, Shape, Stroke, StrokeSettings, ViewTransform};
use kurbo::{Affine, BezPath, Point, Size};
use std::collections::HashMap;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Rendering context unavailable: {0}")]
    ContextUnavailable(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Context for a single render frame.
pub struct RenderContext<'a> {
    /// Primitives to render.
    pub store: &'a PrimitiveStore,
    /// Content → logical surface pixels.
    pub transform: &'a ViewTransform,
    /// Viewport size in logical pixels.
    pub viewport_size: Size,
    /// Device pixel ratio (for HiDPI).
    pub scale_factor: f64,
    /// Transient shape painted on top of the stored content.
    pub preview: Option<&'a Shape>,
    /// Points of the pen stroke still being drawn, with its settings.
    pub live_stroke: Option<(&'a [InkPoint], &'a StrokeSettings)>,
}

impl<'a> RenderContext<'a> {
    /// Create a new render context.
    pub fn new(store: &'a PrimitiveStore, transform: &'a ViewTransform, viewport_size: Size) -> Self {
        Self {
            store,
            transform,
            viewport_size,
            scale_factor: 1.0,
            preview: None,
            live_stroke: None,
        }
    }

    /// Set the scale factor for HiDPI.
    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    /// Set the preview shape.
    pub fn with_preview(mut self, preview: Option<&'a Shape>) -> Self {
        self.preview = preview;
        self
    }

    /// Set the in-progress pen stroke so a full repaint keeps it visible.
    pub fn with_live_stroke(mut self, points: &'a [InkPoint], settings: &'a StrokeSettings) -> Self {
        self.live_stroke = Some((points, settings));
        self
    }

    /// Content space → physical pixels.
    pub fn device_transform(&self) -> Affine {
        Affine::scale(self.scale_factor) * self.transform.affine()
    }
}

/// Builds [`Frame`]s from a [`RenderContext`].
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Clear and repaint every visible primitive, plus the preview if any.
    pub fn build_frame(&self, ctx: &RenderContext) -> Frame {
        let mut frame = Frame::full();
        frame.push(DrawCommand::Clear);

        let scale = ctx.transform.scale;
        let mode = self
            .config
            .select_mode(ctx.store.stroke_count(), ctx.store.shape_count(), scale);
        frame.stats.mode = mode;
        if mode == RenderMode::Skipped {
            log::trace!("Scale {} below minimum, skipping content", scale);
            return frame;
        }

        frame.push(DrawCommand::SetTransform(ctx.device_transform()));
        let mut visible = ctx.transform.visible_rect(ctx.viewport_size);
        if mode == RenderMode::Adaptive {
            let margin = ctx.transform.length_to_content(self.config.cull_margin);
            visible = visible.inflate(margin, margin);
            frame.push(DrawCommand::SetQuality(RenderQuality::Low));
            self.push_batched_strokes(&mut frame, ctx.store.strokes(), visible, scale);
        } else {
            frame.push(DrawCommand::SetQuality(RenderQuality::High));
            for stroke in ctx.store.strokes() {
                if !Self::is_paintable(stroke) {
                    continue;
                }
                if !rects_overlap(stroke.render_bounds(), visible) {
                    frame.stats.culled += 1;
                    continue;
                }
                frame.push(DrawCommand::StrokePath {
                    path: stroke.to_path(),
                    paint: stroke_paint(&stroke.settings),
                });
                frame.stats.strokes_drawn += 1;
            }
        }

        for shape in ctx.store.shapes() {
            if !rects_overlap(shape.render_bounds(), visible) {
                frame.stats.culled += 1;
                continue;
            }
            push_shape(&mut frame, shape);
            frame.stats.shapes_drawn += 1;
        }

        if let Some((points, settings)) = ctx.live_stroke {
            let positions: Vec<Point> = points.iter().map(InkPoint::position).collect();
            if !positions.is_empty() {
                let mut path = BezPath::new();
                adaptive::append_polyline(&mut path, &positions);
                frame.push(DrawCommand::StrokePath {
                    path,
                    paint: stroke_paint(settings),
                });
            }
        }

        if let Some(preview) = ctx.preview {
            push_shape(&mut frame, preview);
        }

        log::trace!("Built frame: {:?}", frame.stats);
        frame
    }

    /// One live pen segment painted over the current contents.
    ///
    /// `from == None` paints a dot at `to`.
    pub fn segment_frame(
        &self,
        ctx: &RenderContext,
        from: Option<InkPoint>,
        to: InkPoint,
        settings: &StrokeSettings,
    ) -> Frame {
        let mut frame = Frame::overlay();
        if ctx.transform.scale < self.config.min_scale {
            return frame;
        }
        let end = to.position();
        let start = from.map_or(end, |p| p.position());
        let mut path = BezPath::new();
        path.move_to(start);
        path.line_to(end);

        frame.push(DrawCommand::SetTransform(ctx.device_transform()));
        frame.push(DrawCommand::StrokePath {
            path,
            paint: stroke_paint(settings),
        });
        frame
    }

    fn is_paintable(stroke: &Stroke) -> bool {
        !stroke.is_eraser() && !stroke.is_empty()
    }

    fn push_batched_strokes(&self, frame: &mut Frame, strokes: &[Stroke], visible: kurbo::Rect, scale: f64) {
        // Batches keep first-seen order.
        let mut batches: Vec<(StrokePaint, BezPath)> = Vec::new();
        let mut index: HashMap<BatchKey, usize> = HashMap::new();

        for stroke in strokes {
            if !Self::is_paintable(stroke) {
                continue;
            }
            if !rects_overlap(stroke.render_bounds(), visible) {
                frame.stats.culled += 1;
                continue;
            }
            let positions: Vec<Point> = stroke.positions().collect();
            let skip = self.config.point_skip(positions.len(), scale);
            let points = adaptive::decimate(&positions, skip);

            let slot = *index.entry(BatchKey::new(&stroke.settings)).or_insert_with(|| {
                batches.push((stroke_paint(&stroke.settings), BezPath::new()));
                batches.len() - 1
            });
            adaptive::append_polyline(&mut batches[slot].1, &points);
            frame.stats.strokes_drawn += 1;
        }

        frame.stats.batches = batches.len();
        for (paint, path) in batches {
            frame.push(DrawCommand::StrokePath { path, paint });
        }
    }
}

fn stroke_paint(settings: &StrokeSettings) -> StrokePaint {
    StrokePaint {
        color: with_opacity(parse_color(&settings.color), settings.opacity),
        width: settings.size,
    }
}

fn push_shape(frame: &mut Frame, shape: &Shape) {
    let path = shape.to_path();
    if shape.is_filled() {
        frame.push(DrawCommand::FillPath {
            path: path.clone(),
            color: parse_color(&shape.settings.fill_color),
        });
    }
    frame.push(DrawCommand::StrokePath {
        path,
        paint: StrokePaint {
            color: parse_color(&shape.settings.stroke_color),
            width: shape.settings.stroke_width,
        },
    });
}
