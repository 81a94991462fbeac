use kurbo::Size;
use tracing::debug;

use crate::canvas::Boundary;
use crate::error::{Result, ViewerError};
use crate::viewport::RegisteredImage;

/// Coordinate frame the shared canvas is expressed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CanvasFrame {
    /// Footprints come from georeferencing; any number of images may share it.
    Geographic,
    /// A single unreferenced raster measured in its own pixels.
    PixelSpace,
}

impl std::fmt::Display for CanvasFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Geographic => write!(f, "Geographic"),
            Self::PixelSpace => write!(f, "Pixel space"),
        }
    }
}

/// Owner of the canvas boundary: the union of every registered footprint.
#[derive(Clone, Debug, Default)]
pub struct CanvasCompositor {
    canvas: Option<Boundary>,
    frame: Option<CanvasFrame>,
}

impl CanvasCompositor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn canvas(&self) -> Option<&Boundary> {
        self.canvas.as_ref()
    }

    pub fn frame(&self) -> Option<CanvasFrame> {
        self.frame
    }

    pub fn is_georeferenced(&self) -> bool {
        self.frame == Some(CanvasFrame::Geographic)
    }

    /// Decide which footprint a new raster joins the canvas with.
    ///
    /// The first raster may be unreferenced and then defines a pixel-space
    /// canvas. Every later raster must carry a footprint and the canvas must
    /// be geographic; otherwise the add is rejected so that no image lands at
    /// a made-up origin.
    pub fn admit(
        &self,
        name: &str,
        footprint: Option<&Boundary>,
        pixel_width: u32,
        pixel_height: u32,
    ) -> Result<(Boundary, CanvasFrame)> {
        match (self.frame, footprint) {
            (None, Some(b)) => Ok((b.extent_only(), CanvasFrame::Geographic)),
            (None, None) => Ok((
                Boundary::pixel_space(pixel_width, pixel_height),
                CanvasFrame::PixelSpace,
            )),
            (Some(CanvasFrame::Geographic), Some(b)) => {
                Ok((b.extent_only(), CanvasFrame::Geographic))
            }
            (Some(_), _) => Err(ViewerError::NoSpatialReference {
                name: name.to_string(),
            }),
        }
    }

    /// Recompute the canvas from scratch as the union of `footprints`.
    pub fn rebuild<'a>(
        &mut self,
        footprints: impl IntoIterator<Item = &'a Boundary>,
        frame: CanvasFrame,
    ) {
        let mut canvas: Option<Boundary> = None;
        for b in footprints {
            match canvas.as_mut() {
                Some(c) => b.merge_into(c),
                None => canvas = Some(b.extent_only()),
            }
        }
        if let Some(ref c) = canvas {
            debug!(
                min_x = c.min_x(),
                min_y = c.min_y(),
                max_x = c.max_x(),
                max_y = c.max_y(),
                "Canvas boundary rebuilt"
            );
        }
        self.frame = canvas.as_ref().map(|_| frame);
        self.canvas = canvas;
    }

    /// Size every image on screen at `scale_x`/`scale_y` pixels per world
    /// unit and place it relative to the canvas origin.
    pub fn layout(&self, images: &mut [RegisteredImage], scale_x: f64, scale_y: f64) {
        let Some(canvas) = self.canvas.as_ref() else {
            return;
        };
        for image in images.iter_mut() {
            let b = image.boundary();
            let view = Size::new(b.width() * scale_x, b.height() * scale_y);
            image.set_layout(canvas, view, scale_x, scale_y);
        }
    }
}
