//! The presentation-facing facade.
//!
//! A [`ViewerSession`] serialises every view mutation, turns each redraw
//! plan into fetches, and keeps the last good frame per image. Events go
//! out on the channel returned by [`ViewerSession::new`].

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::mpsc;
use std::sync::Arc;

use kurbo::{Point, Rect, Vec2};
use tracing::{debug, warn};

use crate::config::ViewerConfig;
use crate::error::{Result, ViewerError};
use crate::events::{self, ViewerEvent};
use crate::fetch::{FetchCompletion, FetchRequest, FetchScheduler};
use crate::source::{PixelBuffer, RasterDataset, RasterSource};
use crate::viewport::{
    ImageId, ImagePlacement, SkipReason, ViewState, ViewportController, ZoomDirection,
};

/// Pixels on display for one image and the view they were fetched for.
#[derive(Clone, Debug, PartialEq)]
pub struct DisplayedFrame {
    pub buffer: PixelBuffer,
    pub placement: ImagePlacement,
    pub view: ViewState,
}

impl DisplayedFrame {
    /// Where this frame belongs on screen under `view`.
    ///
    /// The buffer covers a fixed region of the canvas; a newer view moves
    /// that region rather than the frame being drawn at a placement it was
    /// not fetched for.
    pub fn screen_rect_in(&self, view: &ViewState) -> Option<Rect> {
        let back_to_canvas = self.view.transform().invert().ok()?;
        let to_screen = view.transform().compose(&back_to_canvas);
        Some(to_screen.apply_rect(self.placement.screen_rect))
    }
}

pub struct ViewerSession {
    config: ViewerConfig,
    source: Arc<dyn RasterSource>,
    controller: ViewportController,
    datasets: HashMap<ImageId, Arc<dyn RasterDataset>>,
    scheduler: FetchScheduler,
    frames: BTreeMap<ImageId, DisplayedFrame>,
    events: mpsc::Sender<ViewerEvent>,
}

impl ViewerSession {
    pub fn new(
        config: ViewerConfig,
        source: Arc<dyn RasterSource>,
    ) -> Result<(Self, mpsc::Receiver<ViewerEvent>)> {
        config.validate()?;
        let (tx, rx) = mpsc::channel();
        let session = Self {
            controller: ViewportController::new(&config),
            config,
            source,
            datasets: HashMap::new(),
            scheduler: FetchScheduler::spawn()?,
            frames: BTreeMap::new(),
            events: tx,
        };
        Ok((session, rx))
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn controller(&self) -> &ViewportController {
        &self.controller
    }

    pub fn view(&self) -> ViewState {
        self.controller.view()
    }

    pub fn dataset(&self, id: ImageId) -> Option<&Arc<dyn RasterDataset>> {
        self.datasets.get(&id)
    }

    pub fn displayed_frames(&self) -> &BTreeMap<ImageId, DisplayedFrame> {
        &self.frames
    }

    pub fn displayed_frame(&self, id: ImageId) -> Option<&DisplayedFrame> {
        self.frames.get(&id)
    }

    /// Open `path` through the raster source and add it to the canvas.
    pub fn open_executed(&mut self, path: &Path) -> Result<ImageId> {
        let tx = self.events.clone();
        let progress = move |fraction: f64| events::send(&tx, ViewerEvent::progress(fraction));
        let dataset = self.source.open(path, &progress)?;
        self.open_dataset(dataset)
    }

    /// Add an already opened dataset to the canvas.
    pub fn open_dataset(&mut self, dataset: Arc<dyn RasterDataset>) -> Result<ImageId> {
        let id = self.controller.open_image(dataset.info())?;
        self.datasets.insert(id, dataset.clone());
        events::send(&self.events, ViewerEvent::ImageOpened(dataset.info().summary()));
        self.redraw();
        Ok(id)
    }

    pub fn zoom_fit(&mut self) -> Result<()> {
        self.controller.zoom_fit()?;
        self.redraw();
        Ok(())
    }

    pub fn zoom_in(&mut self) -> bool {
        let changed = self.controller.zoom_in();
        if changed {
            self.redraw();
        }
        changed
    }

    pub fn zoom_out(&mut self) -> bool {
        let changed = self.controller.zoom_out();
        if changed {
            self.redraw();
        }
        changed
    }

    pub fn zoom_at(&mut self, direction: ZoomDirection, pivot: Point) -> bool {
        let changed = self.controller.zoom_at(direction, pivot);
        if changed {
            self.redraw();
        }
        changed
    }

    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.controller.pan(Vec2::new(dx, dy));
        self.redraw();
    }

    pub fn on_resize(&mut self, width: u32, height: u32) {
        self.controller.resize(width, height);
        self.redraw();
    }

    pub fn screen_to_world(&self, p: Point) -> Option<Point> {
        self.controller.screen_to_world(p)
    }

    /// Cursor readout for screen point `p`, measured against the first
    /// registered image: `Map(x, y), Image(x, y), Display(x, y)`.
    ///
    /// `Map` falls back to `-` when no world position is known.
    pub fn status_line(&self, p: Point) -> Option<String> {
        let image = self.controller.images().first()?;
        let pixel = self.controller.screen_to_image(image.id(), p).ok()?;
        let world = self
            .datasets
            .get(&image.id())
            .and_then(|d| d.image_to_world(pixel.x, pixel.y))
            .or_else(|| self.controller.screen_to_world(p));
        let map = match world {
            Some(w) => format!("Map({:.6}, {:.6})", w.x, w.y),
            None => "Map(-, -)".to_string(),
        };
        Some(format!(
            "{map}, Image({:.1}, {:.1}), Display({:.0}, {:.0})",
            pixel.x, pixel.y, p.x, p.y
        ))
    }

    /// Plan the current view and submit a fetch for every visible image.
    pub fn redraw(&mut self) {
        let plan = self.controller.plan_frame();
        for &(id, reason) in &plan.skipped {
            self.scheduler.cancel(id);
            if reason == SkipReason::Degenerate {
                warn!(image = %id, "Skipping frame with degenerate transform");
                events::send(
                    &self.events,
                    ViewerEvent::Notice {
                        message: format!("Image {id} cannot be drawn at this zoom"),
                    },
                );
            }
        }
        for placement in plan.placements {
            let Some(dataset) = self.datasets.get(&placement.image) else {
                continue;
            };
            self.scheduler.submit(
                dataset.clone(),
                FetchRequest {
                    placement,
                    view: plan.view,
                },
            );
        }
        self.poll();
    }

    /// Apply every completion that has already arrived. Returns how many
    /// frames were updated.
    pub fn poll(&mut self) -> usize {
        let mut updated = 0;
        while let Some(completion) = self.scheduler.try_recv() {
            if self.apply(completion) {
                updated += 1;
            }
        }
        updated
    }

    /// Block until every outstanding fetch has completed. Returns how many
    /// frames were updated.
    pub fn flush(&mut self) -> usize {
        let mut updated = 0;
        while self.scheduler.pending() > 0 {
            match self.scheduler.recv() {
                Some(completion) => {
                    if self.apply(completion) {
                        updated += 1;
                    }
                }
                None => {
                    warn!("Fetch worker stopped with requests outstanding");
                    self.scheduler.abandon_pending();
                    break;
                }
            }
        }
        updated
    }

    fn apply(&mut self, completion: FetchCompletion) -> bool {
        if !self.scheduler.accept(&completion) {
            return false;
        }
        let image = completion.image();
        match completion.outcome {
            Ok(buffer) => {
                debug!(
                    image = %image,
                    width = buffer.width(),
                    height = buffer.height(),
                    "Frame updated"
                );
                self.frames.insert(
                    image,
                    DisplayedFrame {
                        buffer,
                        placement: completion.request.placement,
                        view: completion.request.view,
                    },
                );
                events::send(&self.events, ViewerEvent::FrameUpdated { image });
                true
            }
            Err(ViewerError::Cancelled) => false,
            Err(e) => {
                let name = self
                    .controller
                    .image(image)
                    .map_or_else(|| image.to_string(), |i| i.name().to_string());
                warn!(image = %image, error = %e, "Fetch failed, keeping previous frame");
                // Step back to the view the kept frame was drawn for, unless
                // the view has moved on since this request was made.
                if completion.request.view == self.controller.view() {
                    if let Some(kept) = self.frames.get(&image) {
                        self.controller.restore_view(&kept.view);
                    }
                }
                events::send(
                    &self.events,
                    ViewerEvent::Notice {
                        message: format!("{name}: {e}"),
                    },
                );
                false
            }
        }
    }
}
