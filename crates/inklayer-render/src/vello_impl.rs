//! Vello-backed surface: replays frames into a `vello::Scene`.

use crate::commands::{DrawCommand, Frame, RenderQuality};
use crate::renderer::RenderResult;
use crate::surface::Surface;
use kurbo::{Affine, Cap, Join, Size, Stroke};
use peniko::Fill;
use vello::Scene;

/// Surface that records frames into a Vello scene.
///
/// The host owns the GPU side: after each present it renders
/// [`VelloSurface::scene`] with the antialiasing matching [`VelloSurface::quality`].
pub struct VelloSurface {
    /// The Vello scene being built.
    scene: Scene,
    size: Size,
    scale_factor: f64,
    quality: RenderQuality,
    /// Transform applied to paths until the next `SetTransform`.
    transform: Affine,
}

impl VelloSurface {
    pub fn new(size: Size, scale_factor: f64) -> Self {
        Self {
            scene: Scene::new(),
            size,
            scale_factor,
            quality: RenderQuality::High,
            transform: Affine::IDENTITY,
        }
    }

    /// Get the built scene for rendering.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Take ownership of the scene (resets internal scene).
    pub fn take_scene(&mut self) -> Scene {
        std::mem::take(&mut self.scene)
    }

    pub fn quality(&self) -> RenderQuality {
        self.quality
    }

    /// Update the logical size and DPI after a host resize.
    pub fn resize(&mut self, size: Size, scale_factor: f64) {
        self.size = size;
        self.scale_factor = scale_factor;
    }
}

impl Surface for VelloSurface {
    fn logical_size(&self) -> Size {
        self.size
    }

    fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    fn acquire_context(&mut self) -> RenderResult<()> {
        Ok(())
    }

    fn configure(&mut self, _physical_size: Size) -> RenderResult<()> {
        self.scene.reset();
        self.transform = Affine::IDENTITY;
        Ok(())
    }

    fn present(&mut self, frame: &Frame) -> RenderResult<()> {
        for command in &frame.commands {
            match command {
                DrawCommand::Clear => {
                    self.scene.reset();
                    self.transform = Affine::IDENTITY;
                }
                DrawCommand::SetTransform(transform) => self.transform = *transform,
                DrawCommand::SetQuality(quality) => self.quality = *quality,
                DrawCommand::StrokePath { path, paint } => {
                    let stroke = Stroke::new(paint.width)
                        .with_caps(Cap::Round)
                        .with_join(Join::Round);
                    self.scene.stroke(&stroke, self.transform, paint.color, None, path);
                }
                DrawCommand::FillPath { path, color } => {
                    self.scene.fill(Fill::NonZero, self.transform, *color, None, path);
                }
            }
        }
        Ok(())
    }
}
