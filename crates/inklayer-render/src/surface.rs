//! Drawing surface abstraction.

use crate::commands::Frame;
use crate::renderer::{RenderResult, RendererError};
use kurbo::Size;

/// Trait for drawing surfaces.
///
/// Implementations can replay frames into Vello, a 2D canvas, or a log.
pub trait Surface {
    /// Surface size in logical pixels.
    fn logical_size(&self) -> Size;

    /// Device pixel ratio.
    fn scale_factor(&self) -> f64 {
        1.0
    }

    /// Obtain the drawing context. Fails when none is available.
    fn acquire_context(&mut self) -> RenderResult<()>;

    /// Re-establish the backing store for the current logical size and DPI.
    fn configure(&mut self, _physical_size: Size) -> RenderResult<()> {
        Ok(())
    }

    /// Replay a frame.
    fn present(&mut self, frame: &Frame) -> RenderResult<()>;

    /// Physical size: logical size × device pixel ratio.
    fn physical_size(&self) -> Size {
        let size = self.logical_size();
        let dpr = self.scale_factor();
        Size::new(size.width * dpr, size.height * dpr)
    }
}

/// In-memory surface that keeps every presented frame.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    size: Size,
    scale_factor: f64,
    context_available: bool,
    configured: Option<Size>,
    frames: Vec<Frame>,
}

impl RecordingSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            size: Size::new(width, height),
            scale_factor: 1.0,
            context_available: true,
            configured: None,
            frames: Vec::new(),
        }
    }

    /// A surface that refuses to hand out a drawing context.
    pub fn unavailable(width: f64, height: f64) -> Self {
        Self {
            context_available: false,
            ..Self::new(width, height)
        }
    }

    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    /// Simulate the host resizing the surface.
    pub fn set_logical_size(&mut self, width: f64, height: f64) {
        self.size = Size::new(width, height);
    }

    pub fn set_scale_factor(&mut self, scale_factor: f64) {
        self.scale_factor = scale_factor;
    }

    /// Physical size passed to the last `configure` call.
    pub fn configured_size(&self) -> Option<Size> {
        self.configured
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn last_frame(&self) -> Option<&Frame> {
        self.frames.last()
    }

    pub fn present_count(&self) -> usize {
        self.frames.len()
    }

    /// Number of clear-and-repaint frames presented.
    pub fn full_frame_count(&self) -> usize {
        self.frames.iter().filter(|f| f.is_full()).count()
    }

    pub fn clear_frames(&mut self) {
        self.frames.clear();
    }
}

impl Surface for RecordingSurface {
    fn logical_size(&self) -> Size {
        self.size
    }

    fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    fn acquire_context(&mut self) -> RenderResult<()> {
        if self.context_available {
            Ok(())
        } else {
            Err(RendererError::ContextUnavailable("recording surface has no context".to_string()))
        }
    }

    fn configure(&mut self, physical_size: Size) -> RenderResult<()> {
        self.configured = Some(physical_size);
        Ok(())
    }

    fn present(&mut self, frame: &Frame) -> RenderResult<()> {
        self.frames.push(frame.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::DrawCommand;

    #[test]
    fn test_recording_surface() {
        let mut surface = RecordingSurface::new(200.0, 100.0).with_scale_factor(2.0);
        assert!(surface.acquire_context().is_ok());
        assert_eq!(surface.physical_size(), Size::new(400.0, 200.0));

        let mut full = Frame::full();
        full.push(DrawCommand::Clear);
        surface.present(&full).unwrap();
        surface.present(&Frame::overlay()).unwrap();

        assert_eq!(surface.present_count(), 2);
        assert_eq!(surface.full_frame_count(), 1);
        assert!(!surface.last_frame().unwrap().is_full());
    }

    #[test]
    fn test_unavailable_surface() {
        let mut surface = RecordingSurface::unavailable(10.0, 10.0);
        assert!(matches!(
            surface.acquire_context(),
            Err(RendererError::ContextUnavailable(_))
        ));
    }
}
