//! View state, registered images and the controller that mutates them.

pub mod controller;
pub mod frame;
pub mod image;
pub mod state;

pub use controller::{ViewMode, ViewportController, ZoomDirection};
pub use frame::{FramePlan, ImagePlacement, SkipReason};
pub use image::{ImageId, RegisteredImage};
pub use state::ViewState;
