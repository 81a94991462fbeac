//! Pyramid level bookkeeping and level-of-detail selection.

pub mod level;
pub mod selector;

pub use level::{build_levels, PyramidLevel};
pub use selector::{map_to_level, plan_window, select_level, zoom_factor, LevelWindow};
