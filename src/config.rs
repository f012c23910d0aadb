//! Rule configuration.
//!
//! Rules are loaded from a TOML file and checked before any file is inspected.
//! Every problem with a rule (missing `with`, malformed ratio, empty list) is a
//! [`ConfigError`], never a per-file validation failure.
//!
//! ## Rule File
//!
//! ```toml
//! [processing]
//! max_processes = 4         # Parallel metadata probes (omit for auto = CPU cores)
//!
//! [[rules]]
//! attribute = "avatar"
//! with = "square"           # square | portrait | landscape
//!
//! [[rules]]
//! attribute = "banner"
//! with = ["16:9", "21:9"]   # any of these ratios, compared to 3 decimals
//! message = "must be a widescreen image"
//! files = "attached"        # changes (default) | attached
//! ```
//!
//! Unknown keys are rejected to catch typos early. A `with` keyword other than
//! the three shapes is accepted with a warning and reports every file as
//! having an unknown aspect ratio.

use crate::attachment::Selection;
use crate::constraint::{Constraint, ConstraintError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("rule for {attribute:?}: you must pass \"aspect_ratio: {{ with: [] }}\" option to the validator")]
    MissingWith { attribute: String },
    #[error("rule for {attribute:?}: {source}")]
    InvalidConstraint {
        attribute: String,
        #[source]
        source: ConstraintError,
    },
    #[error("no rule for attribute {0:?}")]
    UnknownAttribute(String),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// The `with` option as written: a keyword or a list of `"n:d"` ratios.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WithOption {
    Keyword(String),
    Ratios(Vec<String>),
}

/// One aspect-ratio rule for one attachment attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleConfig {
    /// Attachment attribute the rule applies to.
    pub attribute: String,
    /// Required shape. Mandatory; kept optional here so its absence gets a
    /// dedicated error instead of a generic parse failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub with: Option<WithOption>,
    /// Replaces every default message for this rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Which files a validation pass inspects.
    #[serde(default)]
    pub files: Selection,
}

impl RuleConfig {
    pub fn new(attribute: &str, with: WithOption) -> Self {
        Self {
            attribute: attribute.to_string(),
            with: Some(with),
            message: None,
            files: Selection::default(),
        }
    }

    /// Resolve `with` into a [`Constraint`].
    ///
    /// A string is only ever a keyword: `with = "16:9"` is an unrecognized
    /// shape, not a one-entry ratio list. Ratios must be given as an array.
    pub fn constraint(&self) -> Result<Constraint, ConfigError> {
        let with = self.with.as_ref().ok_or_else(|| ConfigError::MissingWith {
            attribute: self.attribute.clone(),
        })?;
        match with {
            WithOption::Keyword(keyword) => Ok(Constraint::from_keyword(keyword)),
            WithOption::Ratios(ratios) => {
                Constraint::from_ratios(ratios).map_err(|source| ConfigError::InvalidConstraint {
                    attribute: self.attribute.clone(),
                    source,
                })
            }
        }
    }

    /// The custom message, if set and not blank.
    pub fn custom_message(&self) -> Option<&str> {
        self.message.as_deref().filter(|m| !m.trim().is_empty())
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel metadata probes.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

/// A rule file: processing settings plus any number of rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GuardConfig {
    pub processing: ProcessingConfig,
    pub rules: Vec<RuleConfig>,
}

impl GuardConfig {
    /// Check every rule up front.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for rule in &self.rules {
            if rule.attribute.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "rules.attribute must not be empty".into(),
                ));
            }
            if !seen.insert(rule.attribute.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate rule for attribute {:?}",
                    rule.attribute
                )));
            }
            rule.constraint()?;
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// The rule for `attribute`.
    pub fn rule(&self, attribute: &str) -> Result<&RuleConfig, ConfigError> {
        self.rules
            .iter()
            .find(|r| r.attribute == attribute)
            .ok_or_else(|| ConfigError::UnknownAttribute(attribute.to_string()))
    }
}

/// Parse and validate a rule file's contents.
pub fn parse_config(content: &str) -> Result<GuardConfig, ConfigError> {
    let config: GuardConfig = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

/// Load and validate a rule file.
pub fn load_config(path: &Path) -> Result<GuardConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Returns a fully-commented example rule file.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# aspect-guard rules
# ==================
# One [[rules]] table per attachment attribute. Unknown keys cause an error.

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel metadata probes.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4

# ---------------------------------------------------------------------------
# Rules
# ---------------------------------------------------------------------------
[[rules]]
# Attachment attribute the rule applies to.
attribute = "avatar"
# Required: "square", "portrait", "landscape", or a list of "<int>:<int>"
# ratios. Ratios are compared after rounding to 3 decimal places.
with = "square"

[[rules]]
attribute = "banner"
with = ["16:9", "21:9"]
# Optional: replaces every default message for this rule.
# %{aspect_ratio} is replaced with the configured shape or ratio list.
message = "must be a widescreen image (%{aspect_ratio})"
# Optional: which files to check.
#   "changes"  - only files attached by the pending change (default)
#   "attached" - every attached file
files = "changes"
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ratio::Ratio;
    use tempfile::TempDir;

    #[test]
    fn default_config_has_no_rules() {
        let config = GuardConfig::default();
        assert!(config.rules.is_empty());
        assert_eq!(config.processing.max_processes, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn stock_config_parses_and_validates() {
        let config = parse_config(stock_config_toml()).unwrap();
        assert_eq!(config.rules.len(), 2);
        assert_eq!(
            config.rule("avatar").unwrap().constraint().unwrap(),
            Constraint::Square
        );
        let banner = config.rule("banner").unwrap();
        assert_eq!(
            banner.constraint().unwrap(),
            Constraint::RatioList(vec![Ratio::new(16, 9), Ratio::new(21, 9)])
        );
        assert_eq!(banner.files, Selection::Changes);
        assert!(banner.custom_message().is_some());
    }

    #[test]
    fn keyword_and_list_forms() {
        let config = parse_config(
            r#"
[[rules]]
attribute = "photo"
with = "portrait"
files = "attached"

[[rules]]
attribute = "cover"
with = ["3:2"]
"#,
        )
        .unwrap();
        let photo = config.rule("photo").unwrap();
        assert_eq!(photo.constraint().unwrap(), Constraint::Portrait);
        assert_eq!(photo.files, Selection::Attached);
        assert_eq!(
            config.rule("cover").unwrap().constraint().unwrap(),
            Constraint::RatioList(vec![Ratio::new(3, 2)])
        );
    }

    #[test]
    fn missing_with_fails_at_setup() {
        let err = parse_config(
            r#"
[[rules]]
attribute = "avatar"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingWith { ref attribute } if attribute == "avatar"));
        assert!(err.to_string().contains("with"));
    }

    #[test]
    fn empty_ratio_list_fails_at_setup() {
        let err = parse_config(
            r#"
[[rules]]
attribute = "banner"
with = []
"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidConstraint {
                source: ConstraintError::EmptyRatioList,
                ..
            }
        ));
    }

    #[test]
    fn malformed_ratio_fails_at_setup() {
        let err = parse_config(
            r#"
[[rules]]
attribute = "banner"
with = ["16x9"]
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidConstraint { .. }));
    }

    #[test]
    fn unknown_option_is_rejected() {
        let err = parse_config(
            r#"
[[rules]]
attribute = "avatar"
with = "square"
tolerance = 0.01
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn unrecognized_keyword_is_accepted() {
        let config = parse_config(
            r#"
[[rules]]
attribute = "avatar"
with = "circle"
"#,
        )
        .unwrap();
        assert_eq!(
            config.rule("avatar").unwrap().constraint().unwrap(),
            Constraint::Unrecognized("circle".into())
        );
    }

    #[test]
    fn scalar_ratio_string_is_not_a_ratio_list() {
        let config = parse_config(
            r#"
[[rules]]
attribute = "banner"
with = "16:9"
"#,
        )
        .unwrap();
        assert_eq!(
            config.rule("banner").unwrap().constraint().unwrap(),
            Constraint::Unrecognized("16:9".into())
        );
    }

    #[test]
    fn duplicate_attribute_is_rejected() {
        let err = parse_config(
            r#"
[[rules]]
attribute = "avatar"
with = "square"

[[rules]]
attribute = "avatar"
with = "portrait"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn blank_message_counts_as_absent() {
        let mut rule = RuleConfig::new("avatar", WithOption::Keyword("square".into()));
        rule.message = Some("   ".into());
        assert_eq!(rule.custom_message(), None);
        rule.message = Some("nope".into());
        assert_eq!(rule.custom_message(), Some("nope"));
    }

    #[test]
    fn unknown_attribute_lookup() {
        let config = GuardConfig::default();
        assert!(matches!(
            config.rule("avatar"),
            Err(ConfigError::UnknownAttribute(_))
        ));
    }

    #[test]
    fn effective_threads_clamps_to_cores() {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let config = ProcessingConfig {
            max_processes: Some(cores + 10),
        };
        assert_eq!(effective_threads(&config), cores);
        assert_eq!(effective_threads(&ProcessingConfig::default()), cores);
        let one = ProcessingConfig {
            max_processes: Some(1),
        };
        assert_eq!(effective_threads(&one), 1);
    }

    #[test]
    fn zero_processes_is_rejected() {
        let err = parse_config("[processing]\nmax_processes = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("rules.toml");
        fs::write(
            &path,
            r#"
[[rules]]
attribute = "avatar"
with = "landscape"
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(
            config.rule("avatar").unwrap().constraint().unwrap(),
            Constraint::Landscape
        );
    }

    #[test]
    fn load_config_missing_file_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let err = load_config(&tmp.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
