//! Level-of-detail selection.
//!
//! Given how many screen pixels one level-0 source pixel covers, pick the
//! coarsest pyramid level that still supplies at least one level pixel per
//! screen pixel, then translate the visible screen area into that level's
//! pixel grid. Everything here is a pure function of its arguments.

use kurbo::{Rect, Size};

use crate::consts::LEVEL_SELECTION_TOLERANCE;
use crate::error::{Result, ViewerError};
use crate::geometry::{AffineTransform, PixelRect};
use crate::pyramid::PyramidLevel;

/// A fetch window inside one pyramid level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LevelWindow {
    pub level_index: usize,
    pub factor: u32,
    /// Rectangle in the level's own pixels, clamped to its extent.
    pub rect: PixelRect,
}

impl LevelWindow {
    /// An empty window must not be fetched.
    pub fn is_empty(&self) -> bool {
        self.rect.is_empty()
    }

    /// The level-0 pixels this window covers, clamped to the raster.
    pub fn level0_rect(&self, pixel_width: u32, pixel_height: u32) -> PixelRect {
        self.rect
            .upsampled(self.factor)
            .clamped_to(pixel_width, pixel_height)
    }
}

/// Screen pixels per level-0 source pixel for a raster drawn at `view`.
///
/// The larger of the two axes wins so neither axis is undersampled.
pub fn zoom_factor(view: Size, pixel_width: u32, pixel_height: u32) -> f64 {
    if pixel_width == 0 || pixel_height == 0 {
        return 0.0;
    }
    let zx = view.width / f64::from(pixel_width);
    let zy = view.height / f64::from(pixel_height);
    zx.max(zy)
}

/// Index of the coarsest level whose pixels are no larger than a screen
/// pixel, i.e. the largest factor with `zoom * factor <= 1`.
///
/// The chosen level always has at least as many pixels as the screen
/// region it fills, so it never undersamples; the next coarser level would.
/// Falls back to level 0 when the view is magnified. `levels` must be in
/// ascending factor order; a larger zoom never selects a coarser level.
pub fn select_level(levels: &[PyramidLevel], zoom: f64) -> usize {
    if !zoom.is_finite() || zoom <= 0.0 {
        return 0;
    }
    let mut chosen = 0;
    for (i, level) in levels.iter().enumerate() {
        if zoom * f64::from(level.factor) <= 1.0 + LEVEL_SELECTION_TOLERANCE {
            chosen = i;
        } else {
            break;
        }
    }
    chosen
}

/// Map a level-0 rectangle into level `index`, clamped to that level's
/// actual extent. Level 0 is passed through unscaled.
pub fn map_to_level(
    level0_rect: PixelRect,
    levels: &[PyramidLevel],
    index: usize,
) -> Result<LevelWindow> {
    let level = levels.get(index).ok_or(ViewerError::LevelOutOfRange {
        index,
        count: levels.len(),
    })?;
    let rect = if level.is_full_resolution() {
        level0_rect.clamped_to(level.width, level.height)
    } else {
        level0_rect
            .downsampled(level.factor)
            .clamped_to(level.width, level.height)
    };
    Ok(LevelWindow {
        level_index: index,
        factor: level.factor,
        rect,
    })
}

/// Full planning step for one raster: choose the level for `zoom`, pull
/// `screen_rect` back into level-0 pixels through `image_to_screen`, and
/// express the result in the chosen level's pixels.
///
/// Returns an empty window when the screen area misses the raster.
pub fn plan_window(
    screen_rect: Rect,
    image_to_screen: &AffineTransform,
    pixel_width: u32,
    pixel_height: u32,
    levels: &[PyramidLevel],
    zoom: f64,
) -> Result<LevelWindow> {
    let index = select_level(levels, zoom);
    let to_image = image_to_screen.invert()?;
    let level0 = PixelRect::covering(to_image.apply_rect(screen_rect), pixel_width, pixel_height);
    if level0.is_empty() {
        let factor = levels.get(index).map_or(1, |l| l.factor);
        return Ok(LevelWindow {
            level_index: index,
            factor,
            rect: PixelRect::EMPTY,
        });
    }
    map_to_level(level0, levels, index)
}
