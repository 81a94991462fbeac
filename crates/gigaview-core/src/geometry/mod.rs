//! Coordinate-space primitives shared by the viewport engine.

pub mod affine;
pub mod rect;

pub use affine::AffineTransform;
pub use rect::PixelRect;
