use kurbo::Rect;

use crate::canvas::Boundary;
use crate::geometry::AffineTransform;

/// Current mapping from the canvas to the screen.
///
/// Canvas-local coordinates measure world units right of `canvas.min_x` and
/// down from `canvas.max_y`; `translate_x/translate_y` is where that corner
/// lands on screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewState {
    /// Screen pixels per world unit.
    pub scale_x: f64,
    pub scale_y: f64,
    pub translate_x: f64,
    pub translate_y: f64,
    /// Zoom steps taken since the last fit.
    pub zoom_level: i32,
    pub viewport_width: u32,
    pub viewport_height: u32,
}

impl ViewState {
    pub fn new(viewport_width: u32, viewport_height: u32) -> Self {
        Self {
            scale_x: 1.0,
            scale_y: 1.0,
            translate_x: 0.0,
            translate_y: 0.0,
            zoom_level: 0,
            viewport_width,
            viewport_height,
        }
    }

    /// Canvas-local to screen.
    pub fn transform(&self) -> AffineTransform {
        AffineTransform::translate(self.translate_x, self.translate_y)
            .compose(&AffineTransform::scale(self.scale_x, self.scale_y))
    }

    /// Take scale and translation from `t`, which must be axis aligned.
    pub(crate) fn set_transform(&mut self, t: &AffineTransform) {
        self.scale_x = t.scale_x();
        self.scale_y = t.scale_y();
        self.translate_x = t.translate_x();
        self.translate_y = t.translate_y();
    }

    /// World (y up) to screen (y down) for the given canvas.
    pub fn world_transform(&self, canvas: &Boundary) -> AffineTransform {
        let flip = AffineTransform::new([1.0, 0.0, 0.0, -1.0, -canvas.min_x(), canvas.max_y()]);
        self.transform().compose(&flip)
    }

    pub fn viewport_rect(&self) -> Rect {
        Rect::new(
            0.0,
            0.0,
            f64::from(self.viewport_width),
            f64::from(self.viewport_height),
        )
    }
}
