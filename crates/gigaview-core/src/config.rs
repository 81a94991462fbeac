use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_PYRAMID_FACTORS, DEFAULT_VIEWPORT_HEIGHT, DEFAULT_VIEWPORT_WIDTH, MAX_ZOOM_LEVEL,
    MIN_ZOOM_LEVEL, ZOOM_STEP_RATE,
};
use crate::error::{Result, ViewerError};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewerConfig {
    #[serde(default)]
    pub viewport: ViewportConfig,
    #[serde(default)]
    pub zoom: ZoomConfig,
    #[serde(default)]
    pub pyramid: PyramidConfig,
}

impl ViewerConfig {
    /// Reject settings the engine cannot honour.
    pub fn validate(&self) -> Result<()> {
        self.viewport.validate()?;
        self.zoom.validate()?;
        self.pyramid.validate()
    }
}

/// Initial device size of the viewport.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewportConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_VIEWPORT_WIDTH,
            height: DEFAULT_VIEWPORT_HEIGHT,
        }
    }
}

impl ViewportConfig {
    fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ViewerError::InvalidConfig(format!(
                "viewport must be non-empty, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

/// Discrete zoom steps.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZoomConfig {
    /// Scale multiplier of one zoom-out step (0..1); zoom-in uses `1 / step_rate`.
    pub step_rate: f64,
    pub min_level: i32,
    pub max_level: i32,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            step_rate: ZOOM_STEP_RATE,
            min_level: MIN_ZOOM_LEVEL,
            max_level: MAX_ZOOM_LEVEL,
        }
    }
}

impl ZoomConfig {
    fn validate(&self) -> Result<()> {
        if !(self.step_rate > 0.0 && self.step_rate < 1.0) {
            return Err(ViewerError::InvalidConfig(format!(
                "zoom step rate must be in (0, 1), got {}",
                self.step_rate
            )));
        }
        if self.min_level > 0 || self.max_level < 0 {
            return Err(ViewerError::InvalidConfig(format!(
                "zoom range [{}, {}] must contain the fitted level 0",
                self.min_level, self.max_level
            )));
        }
        Ok(())
    }
}

/// Downsample factors requested from the raster source.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PyramidConfig {
    pub factors: Vec<u32>,
}

impl Default for PyramidConfig {
    fn default() -> Self {
        Self {
            factors: DEFAULT_PYRAMID_FACTORS.to_vec(),
        }
    }
}

impl PyramidConfig {
    fn validate(&self) -> Result<()> {
        if self.factors.first() != Some(&1) {
            return Err(ViewerError::InvalidConfig(
                "pyramid factors must start with 1".into(),
            ));
        }
        if self.factors.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ViewerError::InvalidConfig(format!(
                "pyramid factors must be strictly ascending, got {:?}",
                self.factors
            )));
        }
        Ok(())
    }
}
