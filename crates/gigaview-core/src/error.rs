use std::path::PathBuf;

use thiserror::Error;

use crate::viewport::ImageId;

#[derive(Error, Debug)]
pub enum ViewerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image format error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Singular transform (determinant {determinant:e})")]
    SingularTransform { determinant: f64 },

    #[error("Cannot merge {name}: no spatial reference")]
    NoSpatialReference { name: String },

    #[error("Cannot read raster {}: {reason}", path.display())]
    UnreadableSource { path: PathBuf, reason: String },

    #[error("Pixel fetch failed: {reason}")]
    Fetch { reason: String },

    #[error("Pixel fetch cancelled")]
    Cancelled,

    #[error("Invalid boundary: {0}")]
    InvalidBoundary(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid world file: {0}")]
    InvalidWorldFile(String),

    #[error("Unknown image {0}")]
    UnknownImage(ImageId),

    #[error("Pyramid level {index} out of range (levels: {count})")]
    LevelOutOfRange { index: usize, count: usize },
}

pub type Result<T> = std::result::Result<T, ViewerError>;
