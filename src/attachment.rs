//! Records with file attachments, and how files are picked for checking.
//!
//! A [`Record`] holds named attachment attributes (`avatar`, `gallery`, ...).
//! Each attribute tracks what is already attached and what is pending in the
//! current create/update ([`AttachmentChanges`]).
//!
//! ## File selection
//!
//! Which files a validation pass inspects depends on what the host can tell
//! us, so it is chosen once, at configuration time, through [`Selection`]:
//!
//! | Selection | Strategy | Files checked |
//! |---|---|---|
//! | `changes` | [`PendingChanges`] | only the files attached by the pending change |
//! | `attached` | [`AllAttached`] | every attached file, analyzed first if needed |

use crate::errors::ValidationErrors;
use crate::metadata::{ImageMetadata, MetadataSource};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::warn;

/// One attached file.
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    /// Display name, usually the uploaded filename.
    pub filename: String,
    /// Where the bytes can be read from.
    pub source: PathBuf,
    /// `None` until analyzed.
    pub metadata: Option<ImageMetadata>,
}

impl Attachment {
    /// An unanalyzed attachment named after the file.
    pub fn new(source: impl Into<PathBuf>) -> Self {
        let source = source.into();
        let filename = source
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| source.display().to_string());
        Self {
            filename,
            source,
            metadata: None,
        }
    }

    /// An attachment whose metadata is already known.
    pub fn analyzed(source: impl Into<PathBuf>, metadata: ImageMetadata) -> Self {
        Self {
            metadata: Some(metadata),
            ..Self::new(source)
        }
    }

    pub fn is_analyzed(&self) -> bool {
        self.metadata.is_some()
    }

    /// Probe the file if needed and cache the result.
    ///
    /// A failed probe is cached as [`ImageMetadata::missing`] so the file is
    /// reported as an invalid image instead of aborting validation.
    pub fn analyze(&mut self, source: &dyn MetadataSource) -> ImageMetadata {
        if let Some(metadata) = self.metadata {
            return metadata;
        }
        let metadata = match source.identify(&self.source) {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!(file = %self.source.display(), error = %e, "metadata probe failed");
                ImageMetadata::missing()
            }
        };
        self.metadata = Some(metadata);
        metadata
    }
}

/// Files attached by the pending create/update.
#[derive(Debug, Clone, PartialEq)]
pub enum AttachmentChanges {
    CreateOne(Attachment),
    CreateMany(Vec<Attachment>),
}

impl AttachmentChanges {
    pub fn attachables_mut(&mut self) -> &mut [Attachment] {
        match self {
            Self::CreateOne(one) => std::slice::from_mut(one),
            Self::CreateMany(many) => many,
        }
    }

    pub fn attachables(&self) -> &[Attachment] {
        match self {
            Self::CreateOne(one) => std::slice::from_ref(one),
            Self::CreateMany(many) => many,
        }
    }
}

/// State of one attachment attribute.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttachedFiles {
    pub attached: Vec<Attachment>,
    pub changes: Option<AttachmentChanges>,
}

impl AttachedFiles {
    pub fn is_attached(&self) -> bool {
        !self.attached.is_empty()
            || self
                .changes
                .as_ref()
                .is_some_and(|c| !c.attachables().is_empty())
    }
}

/// A model instance with attachment attributes and an error collection.
#[derive(Debug, Clone, Default)]
pub struct Record {
    pub attachments: BTreeMap<String, AttachedFiles>,
    pub errors: ValidationErrors,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a single file, replacing any pending change on `attribute`.
    pub fn attach(&mut self, attribute: &str, attachment: Attachment) {
        let files = self.attachments.entry(attribute.to_string()).or_default();
        files.attached.push(attachment.clone());
        files.changes = Some(AttachmentChanges::CreateOne(attachment));
    }

    /// Attach several files in one change.
    pub fn attach_many(&mut self, attribute: &str, attachments: Vec<Attachment>) {
        let files = self.attachments.entry(attribute.to_string()).or_default();
        files.attached.extend(attachments.iter().cloned());
        files.changes = Some(AttachmentChanges::CreateMany(attachments));
    }

    /// Drop pending changes, keeping what is attached (as after a save).
    pub fn persist(&mut self) {
        for files in self.attachments.values_mut() {
            files.changes = None;
        }
    }

    pub fn files_mut(&mut self, attribute: &str) -> Option<&mut AttachedFiles> {
        self.attachments.get_mut(attribute)
    }
}

/// A file picked for checking, with its resolved metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectedFile {
    pub filename: String,
    pub source: PathBuf,
    pub metadata: ImageMetadata,
}

impl SelectedFile {
    fn resolve(attachment: &mut Attachment, source: &dyn MetadataSource) -> Self {
        let metadata = attachment.analyze(source);
        Self {
            filename: attachment.filename.clone(),
            source: attachment.source.clone(),
            metadata,
        }
    }
}

/// Picks the files of an attribute that a validation pass inspects.
pub trait FileSelection: Send + Sync {
    fn select(&self, files: &mut AttachedFiles, source: &dyn MetadataSource) -> Vec<SelectedFile>;
}

/// Only the files attached by the pending change.
#[derive(Debug, Default, Clone, Copy)]
pub struct PendingChanges;

impl FileSelection for PendingChanges {
    fn select(&self, files: &mut AttachedFiles, source: &dyn MetadataSource) -> Vec<SelectedFile> {
        if !files.is_attached() {
            return Vec::new();
        }
        match files.changes.as_mut() {
            Some(changes) => changes
                .attachables_mut()
                .iter_mut()
                .map(|a| SelectedFile::resolve(a, source))
                .collect(),
            None => Vec::new(),
        }
    }
}

/// Every attached file, analyzing unanalyzed ones first.
#[derive(Debug, Default, Clone, Copy)]
pub struct AllAttached;

impl FileSelection for AllAttached {
    fn select(&self, files: &mut AttachedFiles, source: &dyn MetadataSource) -> Vec<SelectedFile> {
        files
            .attached
            .iter_mut()
            .map(|a| SelectedFile::resolve(a, source))
            .collect()
    }
}

/// Configured file-selection strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Selection {
    #[default]
    Changes,
    Attached,
}

impl Selection {
    pub fn strategy(self) -> Box<dyn FileSelection> {
        match self {
            Self::Changes => Box::new(PendingChanges),
            Self::Attached => Box::new(AllAttached),
        }
    }
}
