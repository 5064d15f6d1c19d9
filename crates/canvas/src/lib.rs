//! Certificate design rendering.
//!
//! A design's code runs through the [`script`] interpreter against a
//! [`context::DrawingContext`]; when it cannot run, [`fallback`] paints a
//! built-in certificate instead. [`render::render_design`] ties the two
//! together and never fails.

pub mod context;
pub mod error;
pub mod fallback;
pub mod recording;
pub mod render;
pub mod script;

pub use context::{DrawingContext, Surface};
pub use error::ScriptError;
pub use recording::{DrawCommand, RecordingContext};
pub use render::{render_design, render_design_on, RenderOutcome};
