//! 2D affine transforms between device, canvas and image pixel spaces.
//!
//! The coefficients follow the usual column-vector convention
//! `[a, b, c, d, e, f]`:
//!
//! ```text
//! x' = a * x + c * y + e
//! y' = b * x + d * y + f
//! ```
//!
//! Transforms never round. Snapping to device pixels happens once, when a
//! frame plan turns a placement into a screen rectangle.

use kurbo::{Affine, Point, Rect, Vec2};

use crate::consts::SINGULAR_DETERMINANT_EPSILON;
use crate::error::{Result, ViewerError};

/// A 2D affine map stored as six `f64` coefficients.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AffineTransform(Affine);

impl AffineTransform {
    pub const IDENTITY: Self = Self(Affine::IDENTITY);

    /// Build from raw coefficients `[a, b, c, d, e, f]`.
    pub fn new(coeffs: [f64; 6]) -> Self {
        Self(Affine::new(coeffs))
    }

    pub fn translate(tx: f64, ty: f64) -> Self {
        Self(Affine::translate(Vec2::new(tx, ty)))
    }

    pub fn scale(sx: f64, sy: f64) -> Self {
        Self(Affine::scale_non_uniform(sx, sy))
    }

    /// Rotation about the origin, counter-clockwise in a y-up frame.
    pub fn rotate(radians: f64) -> Self {
        Self(Affine::rotate(radians))
    }

    /// Scale about `pivot`: `translate(+pivot) · scale · translate(-pivot)`.
    ///
    /// `pivot` is a fixed point of the result.
    pub fn scale_about(pivot: Point, sx: f64, sy: f64) -> Self {
        Self::translate(pivot.x, pivot.y)
            .compose(&Self::scale(sx, sy))
            .compose(&Self::translate(-pivot.x, -pivot.y))
    }

    /// Right-multiply: the result applies `other` first, then `self`.
    ///
    /// Composition is not commutative; callers must keep the order.
    pub fn compose(&self, other: &Self) -> Self {
        Self(self.0 * other.0)
    }

    pub fn apply(&self, pt: Point) -> Point {
        self.0 * pt
    }

    /// Transform the four corners of `rect` and return their bounding box.
    pub fn apply_rect(&self, rect: Rect) -> Rect {
        let rect = rect.abs();
        let corners = [
            self.apply(Point::new(rect.x0, rect.y0)),
            self.apply(Point::new(rect.x1, rect.y0)),
            self.apply(Point::new(rect.x0, rect.y1)),
            self.apply(Point::new(rect.x1, rect.y1)),
        ];
        let mut min = corners[0];
        let mut max = corners[0];
        for c in &corners[1..] {
            min.x = min.x.min(c.x);
            min.y = min.y.min(c.y);
            max.x = max.x.max(c.x);
            max.y = max.y.max(c.y);
        }
        Rect::new(min.x, min.y, max.x, max.y)
    }

    pub fn determinant(&self) -> f64 {
        self.0.determinant()
    }

    /// Inverse map. Fails on a (near-)zero or non-finite determinant,
    /// which happens when a scale collapsed to zero.
    pub fn invert(&self) -> Result<Self> {
        let determinant = self.determinant();
        if !determinant.is_finite() || determinant.abs() < SINGULAR_DETERMINANT_EPSILON {
            return Err(ViewerError::SingularTransform { determinant });
        }
        Ok(Self(self.0.inverse()))
    }

    pub fn scale_x(&self) -> f64 {
        self.0.as_coeffs()[0]
    }

    pub fn scale_y(&self) -> f64 {
        self.0.as_coeffs()[3]
    }

    pub fn translate_x(&self) -> f64 {
        self.0.as_coeffs()[4]
    }

    pub fn translate_y(&self) -> f64 {
        self.0.as_coeffs()[5]
    }

    pub fn coeffs(&self) -> [f64; 6] {
        self.0.as_coeffs()
    }

    /// True when the map has no rotation or shear component.
    pub fn is_axis_aligned(&self) -> bool {
        let c = self.0.as_coeffs();
        c[1] == 0.0 && c[2] == 0.0
    }

    pub fn as_affine(&self) -> Affine {
        self.0
    }
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<Affine> for AffineTransform {
    fn from(affine: Affine) -> Self {
        Self(affine)
    }
}
