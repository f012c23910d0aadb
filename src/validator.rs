//! Aspect-ratio validation of a record's attachments.
//!
//! An [`AspectRatioValidator`] is built from one [`RuleConfig`]; building it
//! runs every setup check, so a validator that exists is always well formed.
//! [`AspectRatioValidator::validate`] then:
//!
//! 1. picks files with the configured [`FileSelection`] strategy,
//! 2. evaluates each file's dimensions against the constraint,
//! 3. adds one error per failing file to the record, deduplicated by
//!    `(attribute, key)`.
//!
//! Every selected file is checked, not just those up to the first failure,
//! and the returned [`AttributeReport`] lists each file's outcome.

use crate::attachment::{FileSelection, Record, SelectedFile, Selection};
use crate::config::{ConfigError, GuardConfig, RuleConfig};
use crate::constraint::Constraint;
use crate::errors::ErrorKey;
use crate::evaluate::{EvaluationResult, Reason, evaluate};
use crate::metadata::{ImageMetadata, MetadataSource};
use crate::ratio::rounded_ratio;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use tracing::debug;

/// Outcome for one inspected file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileOutcome {
    pub filename: String,
    pub source: PathBuf,
    pub metadata: ImageMetadata,
    /// `width / height` rounded to 3 decimals; absent when metadata is missing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ratio: Option<f64>,
    #[serde(flatten)]
    pub result: EvaluationResult,
}

/// Outcome for one attribute in one validation pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeReport {
    pub attribute: String,
    pub constraint: Constraint,
    pub files: Vec<FileOutcome>,
}

impl AttributeReport {
    /// True when no inspected file failed (including when none were inspected).
    pub fn passed(&self) -> bool {
        self.files.iter().all(|f| f.result.passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &FileOutcome> {
        self.files.iter().filter(|f| !f.result.passed)
    }
}

/// Validator for one attachment attribute.
pub struct AspectRatioValidator {
    attribute: String,
    constraint: Constraint,
    message: Option<String>,
    selection: Selection,
    strategy: Box<dyn FileSelection>,
}

impl fmt::Debug for AspectRatioValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AspectRatioValidator")
            .field("attribute", &self.attribute)
            .field("constraint", &self.constraint)
            .field("message", &self.message)
            .field("selection", &self.selection)
            .finish()
    }
}

impl AspectRatioValidator {
    /// Build from a rule, failing fast on any configuration problem.
    pub fn new(rule: &RuleConfig) -> Result<Self, ConfigError> {
        if rule.attribute.trim().is_empty() {
            return Err(ConfigError::Validation(
                "rules.attribute must not be empty".into(),
            ));
        }
        let constraint = rule.constraint()?;
        Ok(Self {
            attribute: rule.attribute.clone(),
            constraint,
            message: rule.custom_message().map(String::from),
            selection: rule.files,
            strategy: rule.files.strategy(),
        })
    }

    /// Build directly from an already-valid constraint.
    pub fn from_constraint(attribute: &str, constraint: Constraint) -> Self {
        let selection = Selection::default();
        Self {
            attribute: attribute.to_string(),
            constraint,
            message: None,
            selection,
            strategy: selection.strategy(),
        }
    }

    /// Replace every default message. Blank messages are ignored.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        let message = message.into();
        self.message = (!message.trim().is_empty()).then_some(message);
        self
    }

    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self.strategy = selection.strategy();
        self
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    pub fn constraint(&self) -> &Constraint {
        &self.constraint
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Evaluate one file's metadata against the constraint.
    pub fn check(&self, metadata: ImageMetadata) -> EvaluationResult {
        let result = evaluate(metadata.width, metadata.height, &self.constraint);
        debug!(
            attribute = %self.attribute,
            width = metadata.width,
            height = metadata.height,
            constraint = %self.constraint,
            passed = result.passed,
            "aspect ratio evaluated"
        );
        result
    }

    /// The key an error for `reason` is recorded under.
    pub fn error_key(&self, reason: Reason) -> ErrorKey {
        match &self.message {
            Some(message) => ErrorKey::Custom(message.clone()),
            None => ErrorKey::Reason(reason),
        }
    }

    /// Check the selected files of this attribute and record errors on `record`.
    pub fn validate(&self, record: &mut Record, source: &dyn MetadataSource) -> AttributeReport {
        let selected = match record.files_mut(&self.attribute) {
            Some(files) => self.strategy.select(files, source),
            None => Vec::new(),
        };

        let files = selected
            .into_iter()
            .map(|file| self.check_file(file))
            .collect::<Vec<_>>();

        let interpolation = self.constraint.to_string();
        for outcome in &files {
            if let Some(reason) = outcome.result.reason {
                record
                    .errors
                    .add(&self.attribute, self.error_key(reason), interpolation.as_str());
            }
        }

        AttributeReport {
            attribute: self.attribute.clone(),
            constraint: self.constraint.clone(),
            files,
        }
    }

    fn check_file(&self, file: SelectedFile) -> FileOutcome {
        let SelectedFile {
            filename,
            source,
            metadata,
        } = file;
        FileOutcome {
            result: self.check(metadata),
            ratio: rounded_ratio(metadata.width, metadata.height),
            filename,
            source,
            metadata,
        }
    }
}

/// Build one validator per rule in `config`.
pub fn validators_from_config(
    config: &GuardConfig,
) -> Result<Vec<AspectRatioValidator>, ConfigError> {
    config.rules.iter().map(AspectRatioValidator::new).collect()
}

/// Run every validator against `record`, returning one report per attribute.
pub fn validate_record(
    validators: &[AspectRatioValidator],
    record: &mut Record,
    source: &dyn MetadataSource,
) -> Vec<AttributeReport> {
    validators
        .iter()
        .map(|v| v.validate(record, source))
        .collect()
}
