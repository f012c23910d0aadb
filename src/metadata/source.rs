//! Metadata source trait and shared types.
//!
//! The production implementation is
//! [`ImageCrateSource`](super::ImageCrateSource). Tests use `MockSource`,
//! which replays canned dimensions and records every probe.

use serde::Serialize;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unreadable image {path}: {message}")]
    Unreadable { path: String, message: String },
}

/// Width and height of one inspected file.
///
/// `0 × 0` stands for "no usable metadata": the file could not be probed or
/// has not been analyzed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImageMetadata {
    pub width: u32,
    pub height: u32,
}

impl ImageMetadata {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Metadata for a file that could not be read.
    pub const fn missing() -> Self {
        Self::new(0, 0)
    }
}

/// Something that can report an image's dimensions.
pub trait MetadataSource: Sync {
    /// Read width and height from the file header.
    fn identify(&self, path: &Path) -> Result<ImageMetadata, MetadataError>;
}
