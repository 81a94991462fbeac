/// Scale multiplier applied by one zoom-out step; zooming in uses its reciprocal.
pub const ZOOM_STEP_RATE: f64 = 0.8;

/// Lowest zoom step reachable from the fitted view.
pub const MIN_ZOOM_LEVEL: i32 = -4;

/// Highest zoom step reachable from the fitted view.
pub const MAX_ZOOM_LEVEL: i32 = 8;

/// Downsample factors of the pyramid built for every opened raster.
pub const DEFAULT_PYRAMID_FACTORS: [u32; 6] = [1, 2, 4, 8, 16, 32];

/// Default viewport size in device pixels.
pub const DEFAULT_VIEWPORT_WIDTH: u32 = 800;
pub const DEFAULT_VIEWPORT_HEIGHT: u32 = 600;

/// Determinant magnitude below which a transform is treated as non-invertible.
pub const SINGULAR_DETERMINANT_EPSILON: f64 = 1e-12;

/// Slack when comparing `zoom * factor` against 1.0 during level selection,
/// so that an exact fit does not flip between neighbouring levels.
pub const LEVEL_SELECTION_TOLERANCE: f64 = 1e-6;

/// Rows resampled between two cancellation checks while serving a fetch.
pub const FETCH_ROW_BAND: usize = 64;

/// Name of the background thread serving pixel fetches.
pub const FETCH_THREAD_NAME: &str = "gigaview-fetch";

/// Background grey used when composing a viewport snapshot.
pub const BACKGROUND_GRAY: u8 = 30;
