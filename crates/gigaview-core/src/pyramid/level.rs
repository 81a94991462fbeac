use serde::{Deserialize, Serialize};

/// One precomputed resolution of a raster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PyramidLevel {
    /// Downsample factor relative to level 0 (level 0 has factor 1).
    pub factor: u32,
    /// Actual pixel width of this level.
    pub width: u32,
    /// Actual pixel height of this level.
    pub height: u32,
}

impl PyramidLevel {
    /// Level extent for `factor`: `ceil(size / factor)`, never below one pixel.
    pub fn for_factor(pixel_width: u32, pixel_height: u32, factor: u32) -> Self {
        let factor = factor.max(1);
        Self {
            factor,
            width: pixel_width.div_ceil(factor).max(1),
            height: pixel_height.div_ceil(factor).max(1),
        }
    }

    pub fn is_full_resolution(&self) -> bool {
        self.factor == 1
    }
}

/// Build the level table for a raster from an ascending factor list.
pub fn build_levels(pixel_width: u32, pixel_height: u32, factors: &[u32]) -> Vec<PyramidLevel> {
    factors
        .iter()
        .map(|&f| PyramidLevel::for_factor(pixel_width, pixel_height, f))
        .collect()
}
