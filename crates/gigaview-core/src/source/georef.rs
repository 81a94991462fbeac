//! Affine georeferencing read from ESRI world files.

use std::path::{Path, PathBuf};

use kurbo::Point;

use crate::canvas::Boundary;
use crate::error::{Result, ViewerError};

/// Pixel-to-world affine in GDAL coefficient order.
///
/// ```text
/// x = origin_x + px * pixel_width + py * row_rotation
/// y = origin_y + px * col_rotation + py * pixel_height
/// ```
///
/// `(px, py)` are continuous pixel coordinates with `(0, 0)` at the outer
/// corner of the upper-left pixel. North-up rasters have zero rotations and a
/// negative `pixel_height`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform {
    pub origin_x: f64,
    pub pixel_width: f64,
    pub row_rotation: f64,
    pub origin_y: f64,
    pub col_rotation: f64,
    pub pixel_height: f64,
}

impl GeoTransform {
    /// North-up transform without rotation.
    pub fn new(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self {
            origin_x,
            pixel_width,
            row_rotation: 0.0,
            origin_y,
            col_rotation: 0.0,
            pixel_height,
        }
    }

    /// Parse the six-line world file body `A D B E C F`.
    ///
    /// World files anchor `C`/`F` on the centre of the upper-left pixel; the
    /// result is shifted half a pixel to its outer corner.
    pub fn from_world_file_str(text: &str) -> Result<Self> {
        let values: Vec<f64> = text
            .split_whitespace()
            .map(|tok| {
                tok.parse::<f64>()
                    .map_err(|_| ViewerError::InvalidWorldFile(format!("not a number: {tok:?}")))
            })
            .collect::<Result<_>>()?;
        if values.len() != 6 {
            return Err(ViewerError::InvalidWorldFile(format!(
                "expected 6 values, found {}",
                values.len()
            )));
        }
        if let Some(v) = values.iter().find(|v| !v.is_finite()) {
            return Err(ViewerError::InvalidWorldFile(format!("non-finite value {v}")));
        }
        let [a, d, b, e, c, f] = [values[0], values[1], values[2], values[3], values[4], values[5]];
        Ok(Self {
            origin_x: c - 0.5 * a - 0.5 * b,
            pixel_width: a,
            row_rotation: b,
            origin_y: f - 0.5 * d - 0.5 * e,
            col_rotation: d,
            pixel_height: e,
        })
    }

    pub fn read_world_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_world_file_str(&text)
    }

    /// Look for a world file next to `raster` and parse the first one found.
    pub fn find_sidecar(raster: &Path) -> Result<Option<Self>> {
        for candidate in sidecar_candidates(raster) {
            if candidate.is_file() {
                return Self::read_world_file(&candidate).map(Some);
            }
        }
        Ok(None)
    }

    pub fn pixel_to_world(&self, px: f64, py: f64) -> Point {
        Point::new(
            self.origin_x + px * self.pixel_width + py * self.row_rotation,
            self.origin_y + px * self.col_rotation + py * self.pixel_height,
        )
    }

    /// Bounding box of the four outer corners of a `width` x `height` raster.
    pub fn footprint(&self, width: u32, height: u32) -> Result<Boundary> {
        let (w, h) = (f64::from(width), f64::from(height));
        let corners = [
            self.pixel_to_world(0.0, 0.0),
            self.pixel_to_world(0.0, h),
            self.pixel_to_world(w, h),
            self.pixel_to_world(w, 0.0),
        ];
        let min_x = corners.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
        let max_x = corners.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
        let min_y = corners.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
        let max_y = corners.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);
        Boundary::new(min_x, min_y, max_x, max_y)
    }
}

/// World file names conventionally paired with `raster`: `x.pgw` and
/// `x.pngw` for `x.png`, and `x.wld` for any extension.
pub fn sidecar_candidates(raster: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    if let Some(ext) = raster.extension().and_then(|e| e.to_str()) {
        let ext = ext.to_ascii_lowercase();
        if let (Some(first), Some(last)) = (ext.chars().next(), ext.chars().last()) {
            out.push(raster.with_extension(format!("{first}{last}w")));
        }
        out.push(raster.with_extension(format!("{ext}w")));
    }
    out.push(raster.with_extension("wld"));
    out
}
