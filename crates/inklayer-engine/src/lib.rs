//! Inklayer Engine
//!
//! The drawing engine facade. Binds a [`Surface`](inklayer_render::Surface)
//! and a [`FrameHost`](inklayer_core::FrameHost) to the core state and
//! paints whatever each operation changes.

mod config;
mod engine;

pub use config::EngineConfig;
pub use engine::{DrawingEngine, EngineError, EngineResult};

pub use inklayer_core;
pub use inklayer_render;
