//! Shared test utilities.
//!
//! Writes real image files so the production probes can be exercised
//! without checked-in fixtures.
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! let path = write_png(tmp.path(), "wide.png", 160, 90);
//! ```

use std::path::{Path, PathBuf};

/// Encode a gradient `width × height` AVIF into `dir` and return its path.
pub fn write_avif(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let file = std::fs::File::create(&path)
        .unwrap_or_else(|e| panic!("failed to create fixture {}: {e}", path.display()));
    let encoder = image::codecs::avif::AvifEncoder::new_with_speed_quality(
        std::io::BufWriter::new(file),
        10,
        80,
    );
    image::DynamicImage::ImageRgb8(img)
        .write_with_encoder(encoder)
        .unwrap_or_else(|e| panic!("failed to encode fixture {}: {e}", path.display()));
    path
}

/// Write a black `width × height` PNG into `dir` and return its path.
pub fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    image::RgbImage::new(width, height)
        .save(&path)
        .unwrap_or_else(|e| panic!("failed to write fixture {}: {e}", path.display()));
    path
}
