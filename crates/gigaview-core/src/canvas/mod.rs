//! World-space footprints and their placement on the shared canvas.

pub mod boundary;
pub mod compositor;

pub use boundary::Boundary;
pub use compositor::{CanvasCompositor, CanvasFrame};
