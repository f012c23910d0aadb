//! Collecting files from the command line and probing them.
//!
//! Explicit file arguments are always kept, even with an unknown extension,
//! so a mislabelled upload is reported rather than silently skipped.
//! Directories are walked recursively and only files with a probeable
//! extension are picked up, in sorted order.
//!
//! Probing is the only expensive step, so [`analyze_all`] runs it on the rayon
//! pool. Results stay attached to their [`Attachment`], so input order is kept.

use crate::attachment::Attachment;
use crate::metadata::{MetadataSource, is_supported};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("No such file or directory: {0}")]
    NotFound(PathBuf),
}

/// Expand `paths` into the list of files to check.
pub fn collect_images(paths: &[PathBuf]) -> Result<Vec<PathBuf>, ScanError> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            files.extend(walk_dir(path)?);
        } else if path.is_file() {
            files.push(path.clone());
        } else {
            return Err(ScanError::NotFound(path.clone()));
        }
    }
    Ok(files)
}

fn walk_dir(root: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let mut found = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() && is_supported(entry.path()) {
            found.push(entry.into_path());
        }
    }
    Ok(found)
}

/// Probe every unanalyzed attachment in parallel, caching results in place.
pub fn analyze_all(attachments: &mut [Attachment], source: &dyn MetadataSource) {
    attachments.par_iter_mut().for_each(|a| {
        a.analyze(source);
    });
}
