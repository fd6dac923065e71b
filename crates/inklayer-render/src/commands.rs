//! Render-command list produced by the renderer and consumed by surfaces.

use kurbo::{Affine, BezPath};
use peniko::Color;

/// Raster smoothing quality hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderQuality {
    #[default]
    High,
    Low,
}

/// How a full frame was rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// Zoomed out below the minimum scale; only the clear was emitted.
    Skipped,
    /// Every visible primitive drawn individually.
    #[default]
    Detailed,
    /// Decimated, batched, margin-culled, low quality.
    Adaptive,
}

/// Round-capped, round-joined stroke paint. Opacity is folded into `color`.
#[derive(Debug, Clone, Copy)]
pub struct StrokePaint {
    pub color: Color,
    pub width: f64,
}

/// A single drawing instruction.
#[derive(Debug, Clone)]
pub enum DrawCommand {
    /// Clear the whole surface.
    Clear,
    /// Content space → physical pixels for every following path.
    SetTransform(Affine),
    SetQuality(RenderQuality),
    StrokePath { path: BezPath, paint: StrokePaint },
    FillPath { path: BezPath, color: Color },
}

/// Whether a frame replaces or extends what is on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// Starts with [`DrawCommand::Clear`] and repaints everything.
    Full,
    /// Paints on top of the current contents (live pen segments).
    Overlay,
}

/// Counters describing a frame, for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    pub mode: RenderMode,
    pub strokes_drawn: usize,
    pub shapes_drawn: usize,
    pub culled: usize,
    /// Number of batched stroke paths (adaptive mode only).
    pub batches: usize,
}

/// An ordered list of draw commands.
#[derive(Debug, Clone)]
pub struct Frame {
    pub kind: FrameKind,
    pub commands: Vec<DrawCommand>,
    pub stats: FrameStats,
}

impl Frame {
    /// Empty full frame (the caller pushes `Clear` first).
    pub fn full() -> Self {
        Self {
            kind: FrameKind::Full,
            commands: Vec::new(),
            stats: FrameStats::default(),
        }
    }

    /// Empty overlay frame.
    pub fn overlay() -> Self {
        Self {
            kind: FrameKind::Overlay,
            commands: Vec::new(),
            stats: FrameStats::default(),
        }
    }

    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    pub fn is_full(&self) -> bool {
        self.kind == FrameKind::Full
    }

    /// Number of stroke and fill commands.
    pub fn path_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::StrokePath { .. } | DrawCommand::FillPath { .. }))
            .count()
    }

    /// Quality requested by the frame, if any.
    pub fn quality(&self) -> Option<RenderQuality> {
        self.commands.iter().find_map(|c| match c {
            DrawCommand::SetQuality(q) => Some(*q),
            _ => None,
        })
    }
}
