//! Image metadata acquisition.
//!
//! Only the header is probed: width and height are read from the container
//! without decoding pixel data.
//!
//! | Format | Probe |
//! |---|---|
//! | JPEG, PNG, TIFF, WebP | `image::image_dimensions` |
//! | AVIF | `avif-parse` container metadata |
//!
//! - **Source**: [`MetadataSource`] trait + [`ImageMetadata`]
//! - **Production probe**: [`ImageCrateSource`]

mod image_crate;
mod source;

pub use image_crate::{ImageCrateSource, is_supported, supported_input_extensions};
pub use source::{ImageMetadata, MetadataError, MetadataSource};

#[cfg(test)]
pub use source::tests::MockSource;
