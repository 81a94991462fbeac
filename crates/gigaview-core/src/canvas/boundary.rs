use kurbo::{Rect, Vec2};

use crate::error::{Result, ViewerError};

/// Axis-aligned footprint in world units (degrees, metres, or source pixels
/// for a pixel-space canvas), plus its derived screen margin.
///
/// World Y grows upward while screen Y grows downward; the margin accounts
/// for the flip. `top`/`left` are only written by [`Boundary::calculate_margin`].
#[derive(Clone, Debug, PartialEq)]
pub struct Boundary {
    min_x: f64,
    max_x: f64,
    min_y: f64,
    max_y: f64,
    top: f64,
    left: f64,
}

impl Boundary {
    /// Create a footprint from its corners. Fails when an edge is not finite
    /// or a minimum exceeds its maximum.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Result<Self> {
        if ![min_x, min_y, max_x, max_y].iter().all(|v| v.is_finite()) {
            return Err(ViewerError::InvalidBoundary(format!(
                "non-finite extent [{min_x}, {min_y}, {max_x}, {max_y}]"
            )));
        }
        if min_x > max_x || min_y > max_y {
            return Err(ViewerError::InvalidBoundary(format!(
                "inverted extent [{min_x}, {min_y}, {max_x}, {max_y}]"
            )));
        }
        Ok(Self {
            min_x,
            max_x,
            min_y,
            max_y,
            top: 0.0,
            left: 0.0,
        })
    }

    /// Footprint of an unreferenced raster where one world unit is one pixel.
    pub fn pixel_space(width: u32, height: u32) -> Self {
        Self {
            min_x: 0.0,
            max_x: f64::from(width),
            min_y: 0.0,
            max_y: f64::from(height),
            top: 0.0,
            left: 0.0,
        }
    }

    pub fn min_x(&self) -> f64 {
        self.min_x
    }

    pub fn max_x(&self) -> f64 {
        self.max_x
    }

    pub fn min_y(&self) -> f64 {
        self.min_y
    }

    pub fn max_y(&self) -> f64 {
        self.max_y
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Screen offset of this footprint's top edge below the canvas top edge.
    pub fn top(&self) -> f64 {
        self.top
    }

    /// Screen offset of this footprint's left edge right of the canvas left edge.
    pub fn left(&self) -> f64 {
        self.left
    }

    pub fn margin(&self) -> Vec2 {
        Vec2::new(self.left, self.top)
    }

    /// World extent as a rectangle (y-up, so `y0` is `min_y`).
    pub fn world_rect(&self) -> Rect {
        Rect::new(self.min_x, self.min_y, self.max_x, self.max_y)
    }

    /// Recompute the screen margin relative to `canvas` at the given
    /// pixels-per-world-unit scale.
    pub fn calculate_margin(&mut self, canvas: &Boundary, ppu_x: f64, ppu_y: f64) {
        self.left = (self.min_x - canvas.min_x) * ppu_x;
        self.top = (canvas.max_y - self.max_y) * ppu_y;
    }

    /// Grow `canvas` to the union of itself and this footprint.
    ///
    /// Merging the same footprint again leaves `canvas` unchanged.
    pub fn merge_into(&self, canvas: &mut Boundary) {
        canvas.min_x = canvas.min_x.min(self.min_x);
        canvas.min_y = canvas.min_y.min(self.min_y);
        canvas.max_x = canvas.max_x.max(self.max_x);
        canvas.max_y = canvas.max_y.max(self.max_y);
    }

    /// Union of two footprints with a zero margin.
    pub fn union(&self, other: &Boundary) -> Boundary {
        let mut out = self.extent_only();
        other.merge_into(&mut out);
        out
    }

    pub fn contains(&self, other: &Boundary) -> bool {
        self.min_x <= other.min_x
            && self.min_y <= other.min_y
            && self.max_x >= other.max_x
            && self.max_y >= other.max_y
    }

    /// Same extent, margin reset.
    pub fn extent_only(&self) -> Boundary {
        Boundary {
            top: 0.0,
            left: 0.0,
            ..self.clone()
        }
    }
}

impl Default for Boundary {
    /// The whole globe in degrees.
    fn default() -> Self {
        Self {
            min_x: -180.0,
            max_x: 180.0,
            min_y: -90.0,
            max_y: 90.0,
            top: 0.0,
            left: 0.0,
        }
    }
}
