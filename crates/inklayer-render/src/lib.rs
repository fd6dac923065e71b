//! Inklayer Render Library
//!
//! Turns the primitive store into render-command frames and replays them
//! onto surfaces. The default surface uses Vello for GPU-accelerated rendering.

pub mod adaptive;
pub mod color;
pub mod commands;
mod renderer;
pub mod surface;

#[cfg(feature = "vello-renderer")]
mod vello_impl;

pub use adaptive::RenderConfig;
pub use color::parse_color;
pub use commands::{DrawCommand, Frame, FrameKind, FrameStats, RenderMode, RenderQuality, StrokePaint};
pub use renderer::{RenderContext, RenderResult, Renderer, RendererError};
pub use surface::{RecordingSurface, Surface};

#[cfg(feature = "vello-renderer")]
pub use vello_impl::VelloSurface;
