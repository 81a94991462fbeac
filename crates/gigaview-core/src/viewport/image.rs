use std::fmt;

use kurbo::{Point, Rect, Size};

use crate::canvas::Boundary;
use crate::geometry::AffineTransform;
use crate::pyramid::PyramidLevel;
use crate::source::{ImageSummary, RasterInfo};
use crate::viewport::ViewState;

/// Handle of an image registered with a controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ImageId(pub u32);

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An image placed on the canvas.
#[derive(Clone, Debug)]
pub struct RegisteredImage {
    id: ImageId,
    name: String,
    pixel_width: u32,
    pixel_height: u32,
    band_count: u32,
    data_type: String,
    file_type: String,
    pixel_size: Option<Size>,
    levels: Vec<PyramidLevel>,
    boundary: Boundary,
    georeferenced: bool,
    view_width: f64,
    view_height: f64,
}

impl RegisteredImage {
    pub(crate) fn new(
        id: ImageId,
        info: &RasterInfo,
        boundary: Boundary,
        georeferenced: bool,
    ) -> Self {
        Self {
            id,
            name: info.name.clone(),
            pixel_width: info.pixel_width,
            pixel_height: info.pixel_height,
            band_count: info.band_count,
            data_type: info.data_type.clone(),
            file_type: info.file_type.clone(),
            pixel_size: info.pixel_size,
            levels: info.levels.clone(),
            boundary,
            georeferenced,
            view_width: 0.0,
            view_height: 0.0,
        }
    }

    pub fn id(&self) -> ImageId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pixel_width(&self) -> u32 {
        self.pixel_width
    }

    pub fn pixel_height(&self) -> u32 {
        self.pixel_height
    }

    pub fn band_count(&self) -> u32 {
        self.band_count
    }

    pub fn data_type(&self) -> &str {
        &self.data_type
    }

    pub fn levels(&self) -> &[PyramidLevel] {
        &self.levels
    }

    pub fn boundary(&self) -> &Boundary {
        &self.boundary
    }

    pub fn is_georeferenced(&self) -> bool {
        self.georeferenced
    }

    pub fn view_width(&self) -> f64 {
        self.view_width
    }

    pub fn view_height(&self) -> f64 {
        self.view_height
    }

    pub fn view_size(&self) -> Size {
        Size::new(self.view_width, self.view_height)
    }

    pub(crate) fn set_layout(&mut self, canvas: &Boundary, view: Size, scale_x: f64, scale_y: f64) {
        self.view_width = view.width;
        self.view_height = view.height;
        self.boundary.calculate_margin(canvas, scale_x, scale_y);
    }

    /// Screen position of the image's top-left corner.
    pub fn screen_origin(&self, view: &ViewState) -> Point {
        Point::new(
            view.translate_x + self.boundary.left(),
            view.translate_y + self.boundary.top(),
        )
    }

    /// Full on-screen rectangle, unclipped.
    pub fn screen_rect(&self, view: &ViewState) -> Rect {
        Rect::from_origin_size(self.screen_origin(view), self.view_size())
    }

    /// Level-0 pixel coordinates to screen coordinates.
    pub fn image_to_screen(&self, view: &ViewState) -> AffineTransform {
        let origin = self.screen_origin(view);
        let sx = self.view_width / f64::from(self.pixel_width);
        let sy = self.view_height / f64::from(self.pixel_height);
        AffineTransform::translate(origin.x, origin.y).compose(&AffineTransform::scale(sx, sy))
    }

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
