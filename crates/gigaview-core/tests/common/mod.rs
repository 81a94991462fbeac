#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use image::{DynamicImage, Rgb, RgbImage};

use gigaview_core::canvas::Boundary;
use gigaview_core::consts::DEFAULT_PYRAMID_FACTORS;
use gigaview_core::error::{Result, ViewerError};
use gigaview_core::fetch::CancellationToken;
use gigaview_core::geometry::PixelRect;
use gigaview_core::pyramid::build_levels;
use gigaview_core::source::{
    GeoTransform, ImageDataset, PixelBuffer, RasterDataset, RasterInfo,
};

/// RGB image where red encodes the column and green the row (both mod 256).
pub fn gradient_image(width: u32, height: u32) -> DynamicImage {
    let img = RgbImage::from_fn(width, height, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 7]));
    DynamicImage::ImageRgb8(img)
}

/// Solid RGB image.
pub fn solid_image(width: u32, height: u32, rgb: [u8; 3]) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(rgb)))
}

/// Georeferenced in-memory dataset covering `[min_x, min_y, max_x, max_y]`.
pub fn geo_dataset(name: &str, img: &DynamicImage, extent: [f64; 4]) -> Arc<ImageDataset> {
    let [min_x, min_y, max_x, max_y] = extent;
    let geo = GeoTransform::new(
        min_x,
        max_y,
        (max_x - min_x) / f64::from(img.width()),
        -(max_y - min_y) / f64::from(img.height()),
    );
    Arc::new(
        ImageDataset::from_image(name, img, Some(geo), &DEFAULT_PYRAMID_FACTORS, &|_| {}).unwrap(),
    )
}

/// Unreferenced in-memory dataset.
pub fn plain_dataset(name: &str, img: &DynamicImage) -> Arc<ImageDataset> {
    Arc::new(ImageDataset::from_image(name, img, None, &DEFAULT_PYRAMID_FACTORS, &|_| {}).unwrap())
}

/// Raster metadata without pixels, for controller-only tests.
pub fn raster_info(name: &str, width: u32, height: u32, extent: Option<[f64; 4]>) -> RasterInfo {
    RasterInfo {
        name: name.to_string(),
        pixel_width: width,
        pixel_height: height,
        band_count: 3,
        data_type: "Rgb8".to_string(),
        file_type: "memory".to_string(),
        pixel_size: None,
        levels: build_levels(width, height, &DEFAULT_PYRAMID_FACTORS),
        boundary: extent.map(|[a, b, c, d]| Boundary::new(a, b, c, d).unwrap()),
    }
}

pub fn world_info(width: u32, height: u32) -> RasterInfo {
    raster_info("world", width, height, Some([-180.0, -90.0, 180.0, 90.0]))
}

/// Wraps a real dataset and fails every fetch while `failing` is set.
pub struct FlakyDataset {
    inner: Arc<ImageDataset>,
    failing: AtomicBool,
}

impl FlakyDataset {
    pub fn new(inner: Arc<ImageDataset>) -> Arc<Self> {
        Arc::new(Self {
            inner,
            failing: AtomicBool::new(false),
        })
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl RasterDataset for FlakyDataset {
    fn info(&self) -> &RasterInfo {
        self.inner.info()
    }

    fn fetch_pixels(
        &self,
        level_index: usize,
        rect: PixelRect,
        target_width: u32,
        target_height: u32,
        cancel: &CancellationToken,
    ) -> Result<PixelBuffer> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ViewerError::Fetch {
                reason: "disk unplugged".into(),
            });
        }
        self.inner
            .fetch_pixels(level_index, rect, target_width, target_height, cancel)
    }
}

pub fn assert_close(actual: f64, expected: f64, eps: f64) {
    assert!(
        (actual - expected).abs() < eps,
        "expected {expected}, got {actual}"
    );
}
