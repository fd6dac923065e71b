//! Inklayer Core Library
//!
//! Platform-agnostic data structures and logic for the Inklayer drawing
//! engine: primitives, the primitive store, coordinate transforms, the
//! eraser, the drawing session and frame scheduling.

pub mod eraser;
pub mod geometry;
pub mod scheduler;
pub mod shapes;
pub mod state;
pub mod store;
pub mod tools;
pub mod transform;

pub use eraser::{EraseOutcome, Eraser};
pub use scheduler::{FrameAction, FrameHost, FrameToken, ManualFrameHost, RenderScheduler, ScheduleOutcome};
pub use shapes::{Bounds, InkPoint, PrimitiveId, Shape, ShapeKind, ShapeSettings, Stroke, StrokeSettings, StrokeTool};
pub use state::{EngineState, Repaint, StateOptions};
pub use store::{DrawingPayload, PayloadError, PrimitiveStore};
pub use tools::{ActiveSession, SessionState, SessionStep};
pub use transform::{DeadZone, ViewTransform};
