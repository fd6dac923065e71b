//! Viewport transform between device space and content space.

use crate::shapes::InkPoint;
use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Minimum scale change that counts as a viewport update.
pub const SCALE_DEAD_ZONE: f64 = 0.001;
/// Minimum offset change (per axis, device pixels) that counts as a viewport update.
pub const OFFSET_DEAD_ZONE: f64 = 0.1;

/// Thresholds below which `set_transform` ignores an update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeadZone {
    pub scale: f64,
    pub offset: f64,
}

impl Default for DeadZone {
    fn default() -> Self {
        Self {
            scale: SCALE_DEAD_ZONE,
            offset: OFFSET_DEAD_ZONE,
        }
    }
}

/// Pan/zoom state pushed in by the host viewport.
///
/// Device space is where pointer events live; content space is where strokes
/// and shapes are stored. `device = surface_origin + offset + content * scale`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    /// Viewport zoom factor (always > 0).
    pub scale: f64,
    /// Viewport pan in device pixels.
    pub offset: Vec2,
    /// Position of the surface's top-left corner in device space.
    pub surface_origin: Vec2,
    dead_zone: DeadZone,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset: Vec2::ZERO,
            surface_origin: Vec2::ZERO,
            dead_zone: DeadZone::default(),
        }
    }
}

impl ViewTransform {
    /// Identity transform.
    pub fn new() -> Self {
        Self::default()
    }

    /// Transform with custom dead-zone thresholds.
    pub fn with_dead_zone(dead_zone: DeadZone) -> Self {
        Self {
            dead_zone,
            ..Self::default()
        }
    }

    /// Content space → surface space, as used by the renderer.
    ///
    /// The surface origin is not part of this transform because the surface
    /// paints in its own local coordinates.
    pub fn affine(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.scale)
    }

    /// Surface space → content space.
    pub fn inverse_affine(&self) -> Affine {
        Affine::scale(1.0 / self.scale) * Affine::translate(-self.offset)
    }

    /// Convert a device-space point to content space. Pressure passes through.
    pub fn to_content(&self, device: InkPoint) -> InkPoint {
        let local = device.position() - self.surface_origin;
        device.with_position(self.inverse_affine() * local)
    }

    /// Convert a content-space point to device space. Pressure passes through.
    pub fn to_device(&self, content: InkPoint) -> InkPoint {
        let local = self.affine() * content.position();
        content.with_position(local + self.surface_origin)
    }

    /// Convert a device-space length (e.g. an eraser diameter) to content units.
    pub fn length_to_content(&self, device_length: f64) -> f64 {
        device_length / self.scale
    }

    /// Content-space rectangle visible through a surface of the given logical size.
    pub fn visible_rect(&self, surface_size: Size) -> Rect {
        let inverse = self.inverse_affine();
        let top_left = inverse * Point::ZERO;
        let bottom_right = inverse * Point::new(surface_size.width, surface_size.height);
        Rect::from_points(top_left, bottom_right)
    }

    /// Check whether `(scale, offset)` is far enough from the current state to matter.
    pub fn exceeds_dead_zone(&self, scale: f64, offset: Vec2) -> bool {
        (scale - self.scale).abs() > self.dead_zone.scale
            || (offset.x - self.offset.x).abs() > self.dead_zone.offset
            || (offset.y - self.offset.y).abs() > self.dead_zone.offset
    }

    /// Apply a host viewport update, ignoring changes inside the dead-zone.
    ///
    /// Returns `true` when the state changed.
    pub fn set_transform(&mut self, scale: f64, offset: Vec2) -> bool {
        if !self.exceeds_dead_zone(scale, offset) {
            return false;
        }
        self.scale = scale;
        self.offset = offset;
        true
    }

    /// Apply a host viewport update unconditionally.
    pub fn force_sync(&mut self, scale: f64, offset: Vec2) {
        self.scale = scale;
        self.offset = offset;
    }
}
