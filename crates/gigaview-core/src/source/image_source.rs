//! Reference raster source backed by the `image` crate.
//!
//! The whole raster is decoded up front and a nearest-neighbour pyramid is
//! built in memory, one level per configured factor. Georeferencing comes
//! from a world-file sidecar when one exists.

use std::path::Path;
use std::sync::Arc;

use image::{ColorType, DynamicImage, ImageFormat};
use kurbo::{Point, Size};
use ndarray::parallel::prelude::*;
use ndarray::{Array3, Axis};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::consts::{DEFAULT_PYRAMID_FACTORS, FETCH_ROW_BAND};
use crate::error::{Result, ViewerError};
use crate::fetch::CancellationToken;
use crate::geometry::PixelRect;
use crate::pyramid::build_levels;
use crate::source::{GeoTransform, PixelBuffer, RasterDataset, RasterInfo, RasterSource};

/// Opens PNG/JPEG/TIFF/... files from disk.
#[derive(Clone, Debug)]
pub struct ImageRasterSource {
    factors: Vec<u32>,
}

impl ImageRasterSource {
    pub fn new(factors: Vec<u32>) -> Self {
        Self { factors }
    }
}

impl Default for ImageRasterSource {
    fn default() -> Self {
        Self::new(DEFAULT_PYRAMID_FACTORS.to_vec())
    }
}

impl RasterSource for ImageRasterSource {
    fn open(&self, path: &Path, progress: &dyn Fn(f64)) -> Result<Arc<dyn RasterDataset>> {
        let img = image::open(path).map_err(|e| ViewerError::UnreadableSource {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let geo = GeoTransform::find_sidecar(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        info!(
            path = %path.display(),
            width = img.width(),
            height = img.height(),
            georeferenced = geo.is_some(),
            "Opened raster"
        );
        let mut dataset = ImageDataset::from_image(name, &img, geo, &self.factors, progress)?;
        if let Some(ext) = ImageFormat::from_path(path)
            .ok()
            .and_then(|f| f.extensions_str().first())
        {
            dataset.info.file_type = ext.to_uppercase();
        }
        Ok(Arc::new(dataset))
    }
}

/// A decoded raster and its in-memory pyramid.
#[derive(Debug)]
pub struct ImageDataset {
    info: RasterInfo,
    /// One `(height, width, channels)` array per pyramid level.
    levels: Vec<Array3<u8>>,
    geo: Option<GeoTransform>,
}

impl ImageDataset {
    /// Build from a decoded image. Greyscale stays one channel, grey+alpha
    /// two, RGB three; everything else becomes RGBA.
    ///
    /// A single grey band is stretched linearly from its own min/max onto
    /// 0..=255, so narrow-range 16-bit data stays visible.
    pub fn from_image(
        name: impl Into<String>,
        img: &DynamicImage,
        geo: Option<GeoTransform>,
        factors: &[u32],
        progress: &dyn Fn(f64),
    ) -> Result<Self> {
        let data_type = format!("{:?}", img.color());
        let (w, h) = (img.width() as usize, img.height() as usize);
        let (channels, raw) = match img.color() {
            ColorType::L8 | ColorType::L16 => (1, stretch_to_u8(img.to_luma16().as_raw())),
            ColorType::La8 | ColorType::La16 => (2, img.to_luma_alpha8().into_raw()),
            ColorType::Rgb8 | ColorType::Rgb16 | ColorType::Rgb32F => (3, img.to_rgb8().into_raw()),
            _ => (4, img.to_rgba8().into_raw()),
        };
        let base = Array3::from_shape_vec((h, w, channels), raw).map_err(|e| {
            ViewerError::Fetch {
                reason: format!("decoded buffer has unexpected shape: {e}"),
            }
        })?;
        let mut dataset = Self::from_array(name, base, geo, factors, progress)?;
        dataset.info.data_type = data_type;
        Ok(dataset)
    }

    /// Build from an interleaved `(height, width, channels)` array.
    pub fn from_array(
        name: impl Into<String>,
        base: Array3<u8>,
        geo: Option<GeoTransform>,
        factors: &[u32],
        progress: &dyn Fn(f64),
    ) -> Result<Self> {
        let (h, w, c) = base.dim();
        if w == 0 || h == 0 || c == 0 {
            return Err(ViewerError::InvalidBoundary(format!(
                "raster has no pixels ({w}x{h}x{c})"
            )));
        }
        let (pw, ph) = (w as u32, h as u32);
        let factors: Vec<u32> = if factors.is_empty() { vec![1] } else { factors.to_vec() };
        let level_table = build_levels(pw, ph, &factors);
        let boundary = geo.map(|g| g.footprint(pw, ph)).transpose()?;

        let total = level_table.len() as f64;
        let mut levels = Vec::with_capacity(level_table.len());
        for (i, level) in level_table.iter().enumerate() {
            let data = if level.is_full_resolution() {
                base.clone()
            } else {
                decimate(&base, level.factor, level.width as usize, level.height as usize)
            };
            debug!(
                factor = level.factor,
                width = level.width,
                height = level.height,
                "Built pyramid level"
            );
            levels.push(data);
            progress((i + 1) as f64 / total);
        }

        let info = RasterInfo {
            name: name.into(),
            pixel_width: pw,
            pixel_height: ph,
            band_count: c as u32,
            data_type: format!("U8x{c}"),
            file_type: "memory".to_string(),
            pixel_size: geo.map(|g| Size::new(g.pixel_width, g.pixel_height)),
            levels: level_table,
            boundary,
        };
        Ok(Self { info, levels, geo })
    }

    pub fn geo_transform(&self) -> Option<&GeoTransform> {
        self.geo.as_ref()
    }
}

/// Linear min/max stretch of one band. A flat band keeps its 8-bit value.
fn stretch_to_u8(values: &[u16]) -> Vec<u8> {
    let (min, max) = values
        .par_iter()
        .fold(|| (u16::MAX, u16::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)))
        .reduce(|| (u16::MAX, u16::MIN), |a, b| (a.0.min(b.0), a.1.max(b.1)));
    if min >= max {
        return values.par_iter().map(|&v| (v >> 8) as u8).collect();
    }
    debug!(min, max, "Stretching grey band");
    let rate = 255.0 / f64::from(max - min);
    values
        .par_iter()
        .map(|&v| (f64::from(v - min) * rate).round() as u8)
        .collect()
}

impl RasterDataset for ImageDataset {
    fn info(&self) -> &RasterInfo {
        &self.info
    }

    fn fetch_pixels(
        &self,
        level_index: usize,
        rect: PixelRect,
        target_width: u32,
        target_height: u32,
        cancel: &CancellationToken,
    ) -> Result<PixelBuffer> {
        let level = self.levels.get(level_index).ok_or(ViewerError::LevelOutOfRange {
            index: level_index,
            count: self.levels.len(),
        })?;
        let (lh, lw, channels) = level.dim();
        let rect = rect.clamped_to(lw as u32, lh as u32);
        if rect.is_empty() {
            return Err(ViewerError::Fetch {
                reason: format!("window {rect} is outside level {level_index}"),
            });
        }
        if target_width == 0 || target_height == 0 {
            return Err(ViewerError::Fetch {
                reason: format!("zero-sized target {target_width}x{target_height}"),
            });
        }

        let (tw, th) = (target_width as usize, target_height as usize);
        let step_x = f64::from(rect.width) / tw as f64;
        let step_y = f64::from(rect.height) / th as f64;
        let src_cols: Vec<usize> = (0..tw)
            .map(|tx| sample_index(rect.x, rect.width, step_x, tx))
            .collect();

        let mut out = Array3::<u8>::zeros((th, tw, channels));
        for (band, mut rows) in out.axis_chunks_iter_mut(Axis(0), FETCH_ROW_BAND).enumerate() {
            if cancel.is_cancelled() {
                return Err(ViewerError::Cancelled);
            }
            let first = band * FETCH_ROW_BAND;
            for (i, mut row) in rows.axis_iter_mut(Axis(0)).enumerate() {
                let sy = sample_index(rect.y, rect.height, step_y, first + i);
                for (tx, &sx) in src_cols.iter().enumerate() {
                    for ch in 0..channels {
                        row[[tx, ch]] = level[[sy, sx, ch]];
                    }
                }
            }
        }
        Ok(PixelBuffer::new(out))
    }

    fn image_to_world(&self, x: f64, y: f64) -> Option<Point> {
        self.geo.map(|g| g.pixel_to_world(x, y))
    }
}

/// Source index sampled by output cell `t` (nearest, cell centre).
fn sample_index(origin: u32, span: u32, step: f64, t: usize) -> usize {
    let offset = (((t as f64) + 0.5) * step).floor() as u32;
    (origin + offset.min(span - 1)) as usize
}

/// Nearest-neighbour downsample by an integer factor.
fn decimate(base: &Array3<u8>, factor: u32, width: usize, height: usize) -> Array3<u8> {
    let (h, w, c) = base.dim();
    let f = factor as usize;
    let mut out = Array3::<u8>::zeros((height, width, c));
    out.axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(ly, mut row)| {
            let sy = (ly * f).min(h - 1);
            for lx in 0..width {
                let sx = (lx * f).min(w - 1);
                for ch in 0..c {
                    row[[lx, ch]] = base[[sy, sx, ch]];
                }
            }
        });
    out
}
