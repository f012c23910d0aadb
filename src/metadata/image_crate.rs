//! Header probe backed by the `image` crate and `avif-parse`.

use super::source::{ImageMetadata, MetadataError, MetadataSource};
use image::ImageFormat;
use std::path::Path;
use std::sync::LazyLock;

/// Extensions whose probes are compiled in.
///
/// AVIF is not listed here: the `image` crate cannot read its header without
/// the native decoder, so it goes through `avif-parse` instead.
const PROBE_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    let mut exts: Vec<&'static str> = PROBE_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect();
    exts.push("avif");
    exts
});

/// Image file extensions that can be probed.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// Whether `path` has a probeable extension (case-insensitive).
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| {
            supported_input_extensions()
                .iter()
                .any(|s| s.eq_ignore_ascii_case(e))
        })
}

/// Production [`MetadataSource`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageCrateSource;

impl ImageCrateSource {
    pub fn new() -> Self {
        Self
    }
}

fn is_avif(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("avif"))
}

fn identify_avif(path: &Path) -> Result<ImageMetadata, MetadataError> {
    let file_data = std::fs::read(path)?;
    let avif = avif_parse::read_avif(&mut std::io::Cursor::new(&file_data)).map_err(|e| {
        MetadataError::Unreadable {
            path: path.display().to_string(),
            message: format!("{e:?}"),
        }
    })?;
    let meta = avif
        .primary_item_metadata()
        .map_err(|e| MetadataError::Unreadable {
            path: path.display().to_string(),
            message: format!("{e:?}"),
        })?;
    Ok(ImageMetadata::new(
        meta.max_frame_width.get(),
        meta.max_frame_height.get(),
    ))
}

impl MetadataSource for ImageCrateSource {
    fn identify(&self, path: &Path) -> Result<ImageMetadata, MetadataError> {
        if is_avif(path) {
            return identify_avif(path);
        }
        let (width, height) =
            image::image_dimensions(path).map_err(|e| match e {
                image::ImageError::IoError(io) => MetadataError::Io(io),
                other => MetadataError::Unreadable {
                    path: path.display().to_string(),
                    message: other.to_string(),
                },
            })?;
        Ok(ImageMetadata::new(width, height))
    }
}
