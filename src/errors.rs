//! Per-record error collection.
//!
//! Failing evaluations are turned into [`ValidationError`]s keyed by
//! `(attribute, key)`. Adding the same pair twice is a no-op, so a gallery of
//! ten portrait photos checked against `square` reports "must be a square
//! image" once.
//!
//! Messages are templates; `%{aspect_ratio}` is replaced with the display
//! form of the rule's constraint (`square`, `16:9, 4:3`).

use crate::evaluate::Reason;
use serde::Serialize;
use std::fmt;

const INTERPOLATION: &str = "%{aspect_ratio}";

/// Default message for a reason.
pub fn default_message(reason: Reason) -> &'static str {
    match reason {
        Reason::MetadataMissing => "is not a valid image",
        Reason::NotSquare => "must be a square image",
        Reason::NotPortrait => "must be a portrait image",
        Reason::NotLandscape => "must be a landscape image",
        Reason::NoRatioMatch => "must have an aspect ratio of %{aspect_ratio}",
        Reason::UnknownConstraint => "has an unknown aspect ratio",
    }
}

/// What an error is keyed on: a reason, or a rule's custom message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum ErrorKey {
    Reason(Reason),
    Custom(String),
}

impl ErrorKey {
    fn template(&self) -> &str {
        match self {
            Self::Reason(reason) => default_message(*reason),
            Self::Custom(message) => message,
        }
    }
}

impl fmt::Display for ErrorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reason(reason) => write!(f, "{reason}"),
            Self::Custom(message) => f.write_str(message),
        }
    }
}

/// One error on one attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub attribute: String,
    pub key: ErrorKey,
    /// Value substituted for `%{aspect_ratio}`.
    pub aspect_ratio: String,
}

impl ValidationError {
    /// The message without the attribute name.
    pub fn message(&self) -> String {
        self.key.template().replace(INTERPOLATION, &self.aspect_ratio)
    }

    /// `"<Attribute> <message>"`.
    pub fn full_message(&self) -> String {
        format!("{} {}", humanize(&self.attribute), self.message())
    }
}

/// `banner_image` → `Banner image`.
fn humanize(attribute: &str) -> String {
    let spaced = attribute.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Errors collected on a record, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `(attribute, key)` is already recorded.
    pub fn added(&self, attribute: &str, key: &ErrorKey) -> bool {
        self.errors
            .iter()
            .any(|e| e.attribute == attribute && &e.key == key)
    }

    /// Record an error unless `(attribute, key)` is already present.
    ///
    /// Returns `true` when the error was added.
    pub fn add(&mut self, attribute: &str, key: ErrorKey, aspect_ratio: impl Into<String>) -> bool {
        if self.added(attribute, &key) {
            return false;
        }
        self.errors.push(ValidationError {
            attribute: attribute.to_string(),
            key,
            aspect_ratio: aspect_ratio.into(),
        });
        true
    }

    /// Errors on one attribute.
    pub fn on<'a>(&'a self, attribute: &'a str) -> impl Iterator<Item = &'a ValidationError> + 'a {
        self.errors.iter().filter(move |e| e.attribute == attribute)
    }

    pub fn full_messages(&self) -> Vec<String> {
        self.errors.iter().map(ValidationError::full_message).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}
