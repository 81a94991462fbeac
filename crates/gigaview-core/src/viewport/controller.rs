//! Pan, zoom and fit over the shared canvas.
//!
//! The controller owns the single [`ViewState`] of a session together with
//! the registered images and the canvas compositor. Every mutation goes
//! through `&mut self`; readers get copies of the state.

use kurbo::{Point, Size, Vec2};
use tracing::{debug, info};

use crate::canvas::{Boundary, CanvasCompositor, CanvasFrame};
use crate::config::{ViewerConfig, ZoomConfig};
use crate::error::{Result, ViewerError};
use crate::geometry::{AffineTransform, PixelRect};
use crate::pyramid::{plan_window, zoom_factor};
use crate::source::RasterInfo;
use crate::viewport::{FramePlan, ImageId, ImagePlacement, RegisteredImage, SkipReason, ViewState};

/// Lifecycle of the view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewMode {
    /// Nothing registered yet.
    Empty,
    /// Showing the whole canvas after an open or an explicit fit.
    Fitted,
    /// Panned or zoomed since the last fit.
    Navigated,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

pub struct ViewportController {
    zoom: ZoomConfig,
    view: ViewState,
    mode: ViewMode,
    compositor: CanvasCompositor,
    images: Vec<RegisteredImage>,
    next_id: u32,
}

impl ViewportController {
    pub fn new(config: &ViewerConfig) -> Self {
        Self {
            zoom: config.zoom.clone(),
            view: ViewState::new(config.viewport.width, config.viewport.height),
            mode: ViewMode::Empty,
            compositor: CanvasCompositor::new(),
            images: Vec::new(),
            next_id: 0,
        }
    }

    pub fn view(&self) -> ViewState {
        self.view
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn zoom_level(&self) -> i32 {
        self.view.zoom_level
    }

    pub fn canvas(&self) -> Option<&Boundary> {
        self.compositor.canvas()
    }

    pub fn canvas_frame(&self) -> Option<CanvasFrame> {
        self.compositor.frame()
    }

    pub fn images(&self) -> &[RegisteredImage] {
        &self.images
    }

    pub fn image(&self, id: ImageId) -> Option<&RegisteredImage> {
        self.images.iter().find(|i| i.id() == id)
    }

    fn require(&self, id: ImageId) -> Result<&RegisteredImage> {
        self.image(id).ok_or(ViewerError::UnknownImage(id))
    }

    /// Register a raster, rebuild the canvas and fit the view to it.
    ///
    /// On failure nothing changes.
    pub fn open_image(&mut self, raster: &RasterInfo) -> Result<ImageId> {
        let (boundary, frame) = self.compositor.admit(
            &raster.name,
            raster.boundary.as_ref(),
            raster.pixel_width,
            raster.pixel_height,
        )?;
        let id = ImageId(self.next_id);
        self.images.push(RegisteredImage::new(
            id,
            raster,
            boundary,
            frame == CanvasFrame::Geographic,
        ));
        self.compositor
            .rebuild(self.images.iter().map(|i| i.boundary()), frame);

        if let Err(e) = self.zoom_fit() {
            self.images.pop();
            self.compositor
                .rebuild(self.images.iter().map(|i| i.boundary()), frame);
            return Err(e);
        }
        self.next_id += 1;
        info!(
            image = %id,
            name = %raster.name,
            width = raster.pixel_width,
            height = raster.pixel_height,
            frame = %frame,
            "Image registered"
        );
        Ok(id)
    }

    /// Show the whole canvas: uniform scale, centred, zoom level 0.
    ///
    /// A canvas with zero extent on one axis is fitted on the other; zero
    /// extent on both fails with `SingularTransform` and leaves the view as is.
    pub fn zoom_fit(&mut self) -> Result<()> {
        let Some(canvas) = self.compositor.canvas() else {
            return Ok(());
        };
        let (cw, ch) = (canvas.width(), canvas.height());
        let vw = f64::from(self.view.viewport_width);
        let vh = f64::from(self.view.viewport_height);
        let scale = match (cw > 0.0, ch > 0.0) {
            (true, true) => (vw / cw).min(vh / ch),
            (true, false) => vw / cw,
            (false, true) => vh / ch,
            (false, false) => return Err(ViewerError::SingularTransform { determinant: 0.0 }),
        };
        if !scale.is_finite() || scale <= 0.0 {
            return Err(ViewerError::SingularTransform {
                determinant: scale * scale,
            });
        }
        self.view.scale_x = scale;
        self.view.scale_y = scale;
        self.center_canvas(cw, ch);
        self.view.zoom_level = 0;
        self.mode = ViewMode::Fitted;
        self.relayout();
        info!(
            scale,
            translate_x = self.view.translate_x,
            translate_y = self.view.translate_y,
            "View fitted to canvas"
        );
        Ok(())
    }

    /// One zoom step about `pivot` (screen coordinates), which stays fixed.
    ///
    /// Returns `false` without touching the view when the step would leave
    /// the configured zoom range or nothing is registered.
    pub fn zoom_at(&mut self, direction: ZoomDirection, pivot: Point) -> bool {
        if self.mode == ViewMode::Empty {
            return false;
        }
        let (level, rate) = match direction {
            ZoomDirection::In => (self.view.zoom_level + 1, 1.0 / self.zoom.step_rate),
            ZoomDirection::Out => (self.view.zoom_level - 1, self.zoom.step_rate),
        };
        if level < self.zoom.min_level || level > self.zoom.max_level {
            debug!(level = self.view.zoom_level, ?direction, "Zoom limit reached");
            return false;
        }
        let next = AffineTransform::scale_about(pivot, rate, rate).compose(&self.view.transform());
        self.view.set_transform(&next);
        self.view.zoom_level = level;
        self.mode = ViewMode::Navigated;
        self.relayout();
        debug!(
            level,
            scale = self.view.scale_x,
            pivot_x = pivot.x,
            pivot_y = pivot.y,
            "Zoomed"
        );
        true
    }

    pub fn zoom_in(&mut self) -> bool {
        self.zoom_at(ZoomDirection::In, self.viewport_center())
    }

    pub fn zoom_out(&mut self) -> bool {
        self.zoom_at(ZoomDirection::Out, self.viewport_center())
    }

    /// Centre the canvas in the viewport at the current scale.
    pub fn recenter(&mut self) {
        let Some(canvas) = self.compositor.canvas() else {
            return;
        };
        let (cw, ch) = (canvas.width(), canvas.height());
        self.center_canvas(cw, ch);
        if self.mode != ViewMode::Fitted {
            self.mode = ViewMode::Navigated;
        }
    }

    fn center_canvas(&mut self, canvas_width: f64, canvas_height: f64) {
        let vw = f64::from(self.view.viewport_width);
        let vh = f64::from(self.view.viewport_height);
        self.view.translate_x = (vw - canvas_width * self.view.scale_x) / 2.0;
        self.view.translate_y = (vh - canvas_height * self.view.scale_y) / 2.0;
    }

    /// Move the canvas by `delta` screen pixels. Unbounded.
    pub fn pan(&mut self, delta: Vec2) {
        if self.mode == ViewMode::Empty {
            return;
        }
        self.view.translate_x += delta.x;
        self.view.translate_y += delta.y;
        self.mode = ViewMode::Navigated;
    }

    /// New device size; the canvas keeps its scale and position.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.view.viewport_width = width;
        self.view.viewport_height = height;
    }

    /// Return to the scale, translation and zoom level of `view`.
    ///
    /// The viewport size stays as it is now.
    pub(crate) fn restore_view(&mut self, view: &ViewState) {
        let scale_changed =
            self.view.scale_x != view.scale_x || self.view.scale_y != view.scale_y;
        self.view.set_transform(&view.transform());
        self.view.zoom_level = view.zoom_level;
        if scale_changed {
            self.relayout();
        }
        debug!(
            zoom_level = view.zoom_level,
            scale = view.scale_x,
            "View restored"
        );
    }

    pub fn viewport_center(&self) -> Point {
        self.view.viewport_rect().center()
    }

    pub fn image_to_screen(&self, id: ImageId) -> Result<AffineTransform> {
        Ok(self.require(id)?.image_to_screen(&self.view))
    }

    /// Level-0 pixel position under screen point `p`.
    pub fn screen_to_image(&self, id: ImageId, p: Point) -> Result<Point> {
        Ok(self.image_to_screen(id)?.invert()?.apply(p))
    }

    /// World position under screen point `p`; `None` unless the canvas is
    /// geographic.
    pub fn screen_to_world(&self, p: Point) -> Option<Point> {
        let canvas = self.compositor.canvas()?;
        if !self.compositor.is_georeferenced() {
            return None;
        }
        let inverse = self.view.world_transform(canvas).invert().ok()?;
        Some(inverse.apply(p))
    }

    /// Level-0 pixels of `id` visible in the viewport, covered outward.
    /// Empty when the image is entirely out of view.
    pub fn compute_visible_source_rect(&self, id: ImageId) -> Result<PixelRect> {
        let image = self.require(id)?;
        let to_image = image.image_to_screen(&self.view).invert()?;
        Ok(PixelRect::covering(
            to_image.apply_rect(self.view.viewport_rect()),
            image.pixel_width(),
            image.pixel_height(),
        ))
    }

    /// Plan the next redraw: one placement or skip record per image.
    pub fn plan_frame(&self) -> FramePlan {
        let viewport = self.view.viewport_rect();
        let mut placements = Vec::new();
        let mut skipped = Vec::new();
        for image in &self.images {
            match self.place(image, viewport) {
                Ok(p) => {
                    debug!(
                        image = %p.image,
                        level = p.window.level_index,
                        factor = p.window.factor,
                        window = %p.window.rect,
                        target_width = p.target_width,
                        target_height = p.target_height,
                        "Planned placement"
                    );
                    placements.push(p);
                }
                Err(reason) => {
                    debug!(image = %image.id(), ?reason, "Skipped image");
                    skipped.push((image.id(), reason));
                }
            }
        }
        FramePlan {
            view: self.view,
            placements,
            skipped,
        }
    }

    fn place(
        &self,
        image: &RegisteredImage,
        viewport: kurbo::Rect,
    ) -> std::result::Result<ImagePlacement, SkipReason> {
        let (pw, ph) = (image.pixel_width(), image.pixel_height());
        let to_screen = image.image_to_screen(&self.view);
        let zoom = zoom_factor(image.view_size(), pw, ph);
        let window = plan_window(viewport, &to_screen, pw, ph, image.levels(), zoom)
            .map_err(|_| SkipReason::Degenerate)?;
        if window.is_empty() {
            return Err(SkipReason::OutOfView);
        }
        let source_rect = window.level0_rect(pw, ph);
        let screen_rect = to_screen.apply_rect(source_rect.to_rect()).round();
        let size: Size = screen_rect.size();
        if size.width < 1.0 || size.height < 1.0 {
            return Err(SkipReason::Degenerate);
        }
        Ok(ImagePlacement {
            image: image.id(),
            window,
            source_rect,
            screen_rect,
            target_width: size.width as u32,
            target_height: size.height as u32,
        })
    }

    fn relayout(&mut self) {
        self.compositor
            .layout(&mut self.images, self.view.scale_x, self.view.scale_y);
    }
}
