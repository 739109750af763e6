//! Error types for the storyboard editor.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by row operations and the settings layer.
#[derive(Error, Debug)]
pub enum StoryboardError {
    /// The selected file could not be decoded as an image.
    #[error("Failed to decode image {}: {source}", path.display())]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings file could not be serialized or parsed.
    #[error("Settings error: {0}")]
    Settings(#[from] serde_json::Error),

    #[error("Invalid setting {name}: {value}")]
    InvalidSetting { name: &'static str, value: u64 },

    #[error("Row {row} is out of range (rows: {rows})")]
    RowOutOfRange { row: usize, rows: usize },
}

pub type Result<T> = std::result::Result<T, StoryboardError>;
