//! Aspect ratio values and fixed-precision comparison.
//!
//! Ratios are configured as `"<int>:<int>"` literals (`"16:9"`, `"4:3"`) and
//! compared against a file's `width / height` after both sides are rounded to
//! [`PRECISION`] decimal places.
//!
//! ## Rounding
//!
//! Rounding is half away from zero on the value scaled by `10^PRECISION`.
//! Both sides are integer pairs, so the scaled value is computed with integer
//! division and an exact half (`323 / 80 = 4.0375`) always rounds up. Two
//! ratios match exactly when they land in the same thousandth:
//!
//! ```text
//! 1920 / 1080 = 1.77777…  →  1778
//!   16 / 9    = 1.77777…  →  1778   ✓ match
//! 1000 / 750  = 1.33333…  →  1333
//!    4 / 3    = 1.33333…  →  1333   ✓ match
//! ```
//!
//! There is no tolerance band beyond the rounding itself: `13336 / 10000` and
//! `13334 / 10000` quantize to `1334` and `1333` and do not match.

use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Decimal places kept when comparing ratios.
pub const PRECISION: u32 = 3;

const SCALE: u64 = 10u64.pow(PRECISION);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RatioParseError {
    #[error("ratio {0:?} must have the form \"<int>:<int>\"")]
    Malformed(String),
    #[error("ratio {0:?} must use positive integers on both sides")]
    NotPositive(String),
}

/// A configured aspect ratio, `numerator:denominator`.
///
/// Equality is structural (`32:18 != 16:9`); use [`Ratio::quantized`] to
/// compare values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ratio {
    pub numerator: u32,
    pub denominator: u32,
}

impl Ratio {
    /// Build a ratio from two positive integers.
    pub const fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Unrounded `numerator / denominator`.
    pub fn value(&self) -> f64 {
        f64::from(self.numerator) / f64::from(self.denominator)
    }

    /// Value quantized to [`PRECISION`] decimal places.
    pub fn quantized(&self) -> u64 {
        quantize_dimensions(self.numerator, self.denominator)
    }

    /// Whether a `width × height` image has this ratio after rounding.
    pub fn matches(&self, width: u32, height: u32) -> bool {
        self.quantized() == quantize_dimensions(width, height)
    }
}

impl FromStr for Ratio {
    type Err = RatioParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (num, den) = trimmed
            .split_once(':')
            .ok_or_else(|| RatioParseError::Malformed(s.to_string()))?;
        let parse = |part: &str| -> Result<u32, RatioParseError> {
            let part = part.trim();
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(RatioParseError::Malformed(s.to_string()));
            }
            part.parse::<u32>()
                .map_err(|_| RatioParseError::Malformed(s.to_string()))
        };
        let (num, den) = (parse(num)?, parse(den)?);
        if num == 0 || den == 0 {
            return Err(RatioParseError::NotPositive(s.to_string()));
        }
        Ok(Self::new(num, den))
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.numerator, self.denominator)
    }
}

impl Serialize for Ratio {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// `width / height` scaled by `10^PRECISION`, rounded half away from zero.
///
/// Computed as `floor((2 * SCALE * w + h) / (2 * h))`, which is exact for any
/// `u32` pair. Callers must reject a zero height first.
pub fn quantize_dimensions(width: u32, height: u32) -> u64 {
    let (w, h) = (u64::from(width), u64::from(height));
    (2 * SCALE * w + h) / (2 * h)
}

/// `width / height` rounded to [`PRECISION`] decimal places, for display.
///
/// Returns `None` when either side is zero.
pub fn rounded_ratio(width: u32, height: u32) -> Option<f64> {
    if width == 0 || height == 0 {
        return None;
    }
    Some(quantize_dimensions(width, height) as f64 / SCALE as f64)
}
