//! The shape an attached image must have.
//!
//! A [`Constraint`] is built once, at configuration time, from the `with`
//! option of a rule. The three named shapes compare width and height directly;
//! [`Constraint::RatioList`] compares the rounded ratio against each configured
//! [`Ratio`].

use crate::ratio::{Ratio, RatioParseError};
use serde::{Serialize, Serializer};
use std::fmt;
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConstraintError {
    #[error("ratio list must contain at least one ratio")]
    EmptyRatioList,
    #[error(transparent)]
    Ratio(#[from] RatioParseError),
}

/// Required aspect of an attached image.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// `width == height`
    Square,
    /// `height > width`
    Portrait,
    /// `width > height`
    Landscape,
    /// Rounded `width / height` equals any of these. Never empty.
    RatioList(Vec<Ratio>),
    /// A `with` keyword that names no known shape. Always fails evaluation.
    Unrecognized(String),
}

impl Constraint {
    /// Map a `with` keyword to a constraint.
    ///
    /// Unknown keywords are kept as [`Constraint::Unrecognized`] rather than
    /// rejected, so every record checked against them reports an unknown
    /// aspect ratio. A warning is logged when that happens.
    pub fn from_keyword(keyword: &str) -> Self {
        match keyword.trim().to_ascii_lowercase().as_str() {
            "square" => Self::Square,
            "portrait" => Self::Portrait,
            "landscape" => Self::Landscape,
            _ => {
                warn!(
                    keyword = %keyword,
                    "unrecognized aspect ratio keyword; every file will fail"
                );
                Self::Unrecognized(keyword.to_string())
            }
        }
    }

    /// Build a [`Constraint::RatioList`] from `"n:d"` literals.
    pub fn from_ratios<S: AsRef<str>>(ratios: &[S]) -> Result<Self, ConstraintError> {
        if ratios.is_empty() {
            return Err(ConstraintError::EmptyRatioList);
        }
        let parsed = ratios
            .iter()
            .map(|r| r.as_ref().parse::<Ratio>())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::RatioList(parsed))
    }

    /// Parse a single CLI-style value: a keyword or one `"n:d"` ratio.
    pub fn parse_value(value: &str) -> Result<Self, ConstraintError> {
        if value.contains(':') {
            Self::from_ratios(&[value])
        } else {
            Ok(Self::from_keyword(value))
        }
    }

    /// Combine several CLI values (`--with 16:9 --with 4:3`) into one constraint.
    ///
    /// Ratios are merged into a single list. A keyword is only valid on its own.
    pub fn from_values<S: AsRef<str>>(values: &[S]) -> Result<Self, ConstraintError> {
        match values {
            [] => Err(ConstraintError::EmptyRatioList),
            [single] => Self::parse_value(single.as_ref()),
            many => Self::from_ratios(many),
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Square => f.write_str("square"),
            Self::Portrait => f.write_str("portrait"),
            Self::Landscape => f.write_str("landscape"),
            Self::RatioList(ratios) => {
                for (i, ratio) in ratios.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{ratio}")?;
                }
                Ok(())
            }
            Self::Unrecognized(keyword) => f.write_str(keyword),
        }
    }
}

impl Serialize for Constraint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
