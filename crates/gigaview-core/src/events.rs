//! Typed notifications from a session to its presentation layer.

use std::sync::mpsc;

use crate::source::ImageSummary;
use crate::viewport::ImageId;

#[derive(Clone, Debug, PartialEq)]
pub enum ViewerEvent {
    /// Pyramid build progress of the raster being opened, `0..=100`.
    Progress { percent: u8 },
    /// A raster was registered on the canvas.
    ImageOpened(ImageSummary),
    /// A fresh frame is ready to draw for `image`.
    FrameUpdated { image: ImageId },
    /// Recoverable problem worth showing to the user.
    Notice { message: String },
}

impl ViewerEvent {
    /// Progress event for a fraction in `0.0..=1.0`.
    pub fn progress(fraction: f64) -> Self {
        let percent = (fraction.clamp(0.0, 1.0) * 100.0).round() as u8;
        Self::Progress { percent }
    }
}

/// Publish an event. Nobody listening is not an error.
pub(crate) fn send(tx: &mpsc::Sender<ViewerEvent>, event: ViewerEvent) {
    let _ = tx.send(event);
}
