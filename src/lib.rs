//! # Aspect Guard
//!
//! Aspect-ratio validation for uploaded image attachments. A rule says what
//! shape an attribute's images must have (`square`, `portrait`, `landscape`,
//! or a list of ratios such as `16:9`); every file selected for checking is
//! measured and failures become human-readable errors on the record.
//!
//! ```text
//! RuleConfig ──new──▶ AspectRatioValidator
//!                          │
//! Record ──FileSelection──▶ SelectedFile (width, height)
//!                          │
//!                      evaluate ──▶ EvaluationResult ──▶ ValidationErrors
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`ratio`] | `"n:d"` ratios and 3-decimal comparison |
//! | [`constraint`] | The required shape: square, portrait, landscape, ratio list |
//! | [`evaluate`] | The pure decision procedure |
//! | [`metadata`] | Header probes for width and height |
//! | [`attachment`] | Records, attachments, and file-selection strategies |
//! | [`errors`] | Deduplicated, interpolated error messages |
//! | [`validator`] | Runs one rule against a record |
//! | [`config`] | TOML rule files, checked before anything runs |
//! | [`scan`] | CLI file collection and parallel probing |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Header Probes Only
//!
//! Dimensions come from the file header (`image::image_dimensions`,
//! `avif-parse` for AVIF). Nothing is decoded, so checking a directory of
//! 50-megapixel photos costs a few reads per file.
//!
//! ## Fixed Precision, No Tolerance
//!
//! Ratios match when they agree to three decimal places after rounding half
//! away from zero. `1920×1080` is `16:9`; `1366×768` is not.
//!
//! ## Setup Errors vs Outcomes
//!
//! A bad rule (no `with`, an empty or malformed ratio list) is a
//! [`config::ConfigError`] raised before any file is looked at. A bad image is
//! never an error: it is an [`EvaluationResult`] with a [`Reason`], and an
//! unreadable file is simply `0×0`, reported as "is not a valid image".
//!
//! ## Check Everything
//!
//! Every selected file is evaluated. Errors on the record are deduplicated per
//! `(attribute, key)`, while the [`validator::AttributeReport`] keeps each
//! file's individual outcome.

pub mod attachment;
pub mod config;
pub mod constraint;
pub mod errors;
pub mod evaluate;
pub mod metadata;
pub mod output;
pub mod ratio;
pub mod scan;
pub mod validator;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use attachment::{AllAttached, Attachment, FileSelection, PendingChanges, Record, Selection};
pub use config::{ConfigError, GuardConfig, RuleConfig, WithOption};
pub use constraint::Constraint;
pub use errors::{ErrorKey, ValidationErrors};
pub use evaluate::{EvaluationResult, Reason, evaluate};
pub use metadata::{ImageCrateSource, ImageMetadata, MetadataSource};
pub use ratio::{PRECISION, Ratio};
pub use validator::{AspectRatioValidator, AttributeReport};
