use kurbo::Rect;

/// A rectangle in whole pixels of some raster (level 0 or a pyramid level).
///
/// Width and height are never negative; an empty rectangle has a zero side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub const EMPTY: Self = Self {
        x: 0,
        y: 0,
        width: 0,
        height: 0,
    };

    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whole raster of `width` x `height`.
    pub fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    /// Smallest pixel rectangle covering `rect` after clipping it to
    /// `[0, extent_w] x [0, extent_h]`. Minimum edges are floored and maximum
    /// edges ceiled, so partially visible pixels are included.
    pub fn covering(rect: Rect, extent_w: u32, extent_h: u32) -> Self {
        let rect = rect.abs();
        let finite = [rect.x0, rect.y0, rect.x1, rect.y1]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            return Self::EMPTY;
        }
        let x0 = rect.x0.floor().clamp(0.0, f64::from(extent_w));
        let y0 = rect.y0.floor().clamp(0.0, f64::from(extent_h));
        let x1 = rect.x1.ceil().clamp(0.0, f64::from(extent_w));
        let y1 = rect.y1.ceil().clamp(0.0, f64::from(extent_h));
        if x1 <= x0 || y1 <= y0 || rect.width() <= 0.0 || rect.height() <= 0.0 {
            return Self::EMPTY;
        }
        Self::new(x0 as u32, y0 as u32, (x1 - x0) as u32, (y1 - y0) as u32)
    }

    /// Intersect with `[0, extent_w] x [0, extent_h]`.
    pub fn clamped_to(&self, extent_w: u32, extent_h: u32) -> Self {
        let x0 = self.x.min(extent_w);
        let y0 = self.y.min(extent_h);
        let x1 = self.right().min(extent_w);
        let y1 = self.bottom().min(extent_h);
        if x1 <= x0 || y1 <= y0 {
            return Self::EMPTY;
        }
        Self::new(x0, y0, x1 - x0, y1 - y0)
    }

    /// Map into a raster downsampled by `factor`, covering outward.
    pub fn downsampled(&self, factor: u32) -> Self {
        if factor <= 1 || self.is_empty() {
            return *self;
        }
        let x0 = self.x / factor;
        let y0 = self.y / factor;
        let x1 = self.right().div_ceil(factor);
        let y1 = self.bottom().div_ceil(factor);
        Self::new(x0, y0, x1 - x0, y1 - y0)
    }

    /// Map a rectangle of a raster downsampled by `factor` back to level 0.
    pub fn upsampled(&self, factor: u32) -> Self {
        let factor = factor.max(1);
        Self::new(
            self.x.saturating_mul(factor),
            self.y.saturating_mul(factor),
            self.width.saturating_mul(factor),
            self.height.saturating_mul(factor),
        )
    }

    pub fn to_rect(&self) -> Rect {
        Rect::new(
            f64::from(self.x),
            f64::from(self.y),
            f64::from(self.right()),
            f64::from(self.bottom()),
        )
    }
}

impl std::fmt::Display for PixelRect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{} {}x{})", self.x, self.y, self.width, self.height)
    }
}
