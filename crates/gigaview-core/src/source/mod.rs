//! The raster source collaborator.
//!
//! The viewport engine never decodes pixels. It talks to a [`RasterSource`]
//! to open rasters and to a [`RasterDataset`] to read windows of a pyramid
//! level. [`image_source`] is a reference implementation backed by the
//! `image` crate.

pub mod georef;
pub mod image_source;

use std::path::Path;
use std::sync::Arc;

use kurbo::{Point, Size};
use ndarray::Array3;

use crate::canvas::Boundary;
use crate::error::Result;
use crate::fetch::CancellationToken;
use crate::geometry::PixelRect;
use crate::pyramid::PyramidLevel;

pub use georef::GeoTransform;
pub use image_source::{ImageDataset, ImageRasterSource};

/// What a raster source reports about an opened raster.
#[derive(Clone, Debug, PartialEq)]
pub struct RasterInfo {
    pub name: String,
    pub pixel_width: u32,
    pub pixel_height: u32,
    pub band_count: u32,
    pub data_type: String,
    /// Container format, e.g. `PNG`; `memory` for rasters built in process.
    pub file_type: String,
    /// World units per pixel along x and y, signed as in the geotransform.
    pub pixel_size: Option<Size>,
    /// Available pyramid levels in ascending factor order; level 0 is full size.
    pub levels: Vec<PyramidLevel>,
    /// World footprint, absent for unreferenced rasters.
    pub boundary: Option<Boundary>,
}

impl RasterInfo {
    pub fn summary(&self) -> ImageSummary {
        ImageSummary {
            file_name: self.name.clone(),
            width: self.pixel_width,
            height: self.pixel_height,
            band_count: self.band_count,
            data_type: self.data_type.clone(),
            file_type: self.file_type.clone(),
            pixel_size: self.pixel_size,
        }
    }
}

/// Status-display summary published when a raster is opened.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageSummary {
    pub file_name: String,
    pub width: u32,
    pub height: u32,
    pub band_count: u32,
    pub data_type: String,
    pub file_type: String,
    pub pixel_size: Option<Size>,
}

/// Interleaved 8-bit pixels, shape = (height, width, channels).
#[derive(Clone, Debug, PartialEq)]
pub struct PixelBuffer {
    pub data: Array3<u8>,
}

impl PixelBuffer {
    pub fn new(data: Array3<u8>) -> Self {
        Self { data }
    }

    pub fn width(&self) -> usize {
        self.data.dim().1
    }

    pub fn height(&self) -> usize {
        self.data.dim().0
    }

    pub fn channels(&self) -> usize {
        self.data.dim().2
    }

    /// Pixel at `(x, y)` expanded to RGBA (grey and grey+alpha are replicated).
    pub fn rgba(&self, x: usize, y: usize) -> [u8; 4] {
        let px = self.data.slice(ndarray::s![y, x, ..]);
        match px.len() {
            1 => [px[0], px[0], px[0], 255],
            2 => [px[0], px[0], px[0], px[1]],
            3 => [px[0], px[1], px[2], 255],
            _ => [px[0], px[1], px[2], px[3]],
        }
    }
}

/// Opens rasters and builds their pyramids.
pub trait RasterSource: Send + Sync {
    /// Open `path`. `progress` receives the pyramid build fraction in `0.0..=1.0`
    /// and may be ignored by the caller.
    fn open(&self, path: &Path, progress: &dyn Fn(f64)) -> Result<Arc<dyn RasterDataset>>;
}

/// One opened raster. Shared with the fetch worker, hence `Send + Sync`.
pub trait RasterDataset: Send + Sync {
    fn info(&self) -> &RasterInfo;

    /// Read `rect` (in the pixels of level `level_index`) resampled to
    /// `target_width` x `target_height`.
    ///
    /// Implementations should poll `cancel` and return
    /// [`crate::error::ViewerError::Cancelled`] once it is set.
    fn fetch_pixels(
        &self,
        level_index: usize,
        rect: PixelRect,
        target_width: u32,
        target_height: u32,
        cancel: &CancellationToken,
    ) -> Result<PixelBuffer>;

    /// World coordinate of a level-0 pixel position, if georeferenced.
    fn image_to_world(&self, _x: f64, _y: f64) -> Option<Point> {
        None
    }
}
