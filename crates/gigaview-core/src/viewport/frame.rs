use kurbo::Rect;

use crate::geometry::PixelRect;
use crate::pyramid::LevelWindow;
use crate::viewport::{ImageId, ViewState};

/// What to fetch for one image and where to draw it.
#[derive(Clone, Debug, PartialEq)]
pub struct ImagePlacement {
    pub image: ImageId,
    /// Window in the selected pyramid level's pixels.
    pub window: LevelWindow,
    /// The same window in level-0 pixels.
    pub source_rect: PixelRect,
    /// Destination on screen, rounded to device pixels. May extend past the
    /// viewport by less than one source pixel.
    pub screen_rect: Rect,
    pub target_width: u32,
    pub target_height: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// No part of the image is inside the viewport.
    OutOfView,
    /// The image-to-screen transform cannot be inverted or the image covers
    /// less than a device pixel.
    Degenerate,
}

/// Per-redraw plan for every registered image.
#[derive(Clone, Debug, PartialEq)]
pub struct FramePlan {
    pub view: ViewState,
    pub placements: Vec<ImagePlacement>,
    pub skipped: Vec<(ImageId, SkipReason)>,
}

impl FramePlan {
    pub fn placement(&self, image: ImageId) -> Option<&ImagePlacement> {
        self.placements.iter().find(|p| p.image == image)
    }

    pub fn skip_reason(&self, image: ImageId) -> Option<SkipReason> {
        self.skipped
            .iter()
            .find(|(id, _)| *id == image)
            .map(|(_, reason)| *reason)
    }
}
