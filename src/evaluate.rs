//! The aspect-ratio decision procedure.
//!
//! [`evaluate`] is pure: it reads two dimensions and a [`Constraint`] and
//! returns an [`EvaluationResult`]. It does no I/O and keeps no state, so the
//! same inputs always produce the same outcome.

use crate::constraint::Constraint;
use serde::{Serialize, Serializer};
use std::fmt;

/// Why an image failed its constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Reason {
    /// Width or height is zero (unreadable or unanalyzed file).
    MetadataMissing,
    NotSquare,
    NotPortrait,
    NotLandscape,
    NoRatioMatch,
    UnknownConstraint,
}

impl Reason {
    /// Symbolic message key used by the error collection.
    pub fn key(self) -> &'static str {
        match self {
            Self::MetadataMissing => "image_metadata_missing",
            Self::NotSquare => "aspect_ratio_not_square",
            Self::NotPortrait => "aspect_ratio_not_portrait",
            Self::NotLandscape => "aspect_ratio_not_landscape",
            Self::NoRatioMatch => "aspect_ratio_is_not_match_any_ratio",
            Self::UnknownConstraint => "aspect_ratio_unknown",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl Serialize for Reason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.key())
    }
}

/// Outcome of one evaluation. `reason` is set exactly when `passed` is false.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EvaluationResult {
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<Reason>,
}

impl EvaluationResult {
    pub const fn pass() -> Self {
        Self {
            passed: true,
            reason: None,
        }
    }

    pub const fn fail(reason: Reason) -> Self {
        Self {
            passed: false,
            reason: Some(reason),
        }
    }

    fn check(passed: bool, reason: Reason) -> Self {
        if passed {
            Self::pass()
        } else {
            Self::fail(reason)
        }
    }
}

/// Decide whether a `width × height` image satisfies `constraint`.
///
/// A zero dimension short-circuits to [`Reason::MetadataMissing`] before any
/// comparison. Ratio lists pass when any entry matches after rounding to
/// [`PRECISION`](crate::ratio::PRECISION) decimal places.
pub fn evaluate(width: u32, height: u32, constraint: &Constraint) -> EvaluationResult {
    if width == 0 || height == 0 {
        return EvaluationResult::fail(Reason::MetadataMissing);
    }

    match constraint {
        Constraint::Square => EvaluationResult::check(width == height, Reason::NotSquare),
        Constraint::Portrait => EvaluationResult::check(height > width, Reason::NotPortrait),
        Constraint::Landscape => EvaluationResult::check(width > height, Reason::NotLandscape),
        Constraint::RatioList(ratios) => EvaluationResult::check(
            ratios.iter().any(|r| r.matches(width, height)),
            Reason::NoRatioMatch,
        ),
        Constraint::Unrecognized(_) => EvaluationResult::fail(Reason::UnknownConstraint),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ratio::Ratio;

    fn ratios(list: &[&str]) -> Constraint {
        Constraint::from_ratios(list).unwrap()
    }

    #[test]
    fn square_passes_for_equal_sides() {
        for side in [1, 2, 99, 500, 4096] {
            assert!(evaluate(side, side, &Constraint::Square).passed, "{side}");
        }
    }

    #[test]
    fn square_fails_for_unequal_sides() {
        assert_eq!(
            evaluate(501, 500, &Constraint::Square),
            EvaluationResult::fail(Reason::NotSquare)
        );
    }

    #[test]
    fn portrait_and_landscape_are_exclusive() {
        for (w, h) in [(1, 2), (600, 800), (1079, 1080)] {
            assert!(evaluate(w, h, &Constraint::Portrait).passed);
            assert_eq!(
                evaluate(w, h, &Constraint::Landscape),
                EvaluationResult::fail(Reason::NotLandscape)
            );
        }
    }

    #[test]
    fn square_is_neither_portrait_nor_landscape() {
        assert_eq!(
            evaluate(700, 700, &Constraint::Portrait).reason,
            Some(Reason::NotPortrait)
        );
        assert_eq!(
            evaluate(700, 700, &Constraint::Landscape).reason,
            Some(Reason::NotLandscape)
        );
    }

    #[test]
    fn zero_dimension_is_metadata_missing_for_every_constraint() {
        let constraints = [
            Constraint::Square,
            Constraint::Portrait,
            Constraint::Landscape,
            ratios(&["16:9"]),
            Constraint::Unrecognized("circle".into()),
        ];
        for c in &constraints {
            for (w, h) in [(0, 0), (0, 100), (100, 0)] {
                assert_eq!(
                    evaluate(w, h, c),
                    EvaluationResult::fail(Reason::MetadataMissing),
                    "{w}x{h} against {c}"
                );
            }
        }
    }

    #[test]
    fn full_hd_matches_sixteen_nine() {
        assert_eq!(
            evaluate(1920, 1080, &ratios(&["16:9"])),
            EvaluationResult::pass()
        );
    }

    #[test]
    fn square_image_matches_no_listed_ratio() {
        assert_eq!(
            evaluate(1000, 1000, &ratios(&["16:9", "4:3"])),
            EvaluationResult::fail(Reason::NoRatioMatch)
        );
    }

    #[test]
    fn any_listed_ratio_is_enough() {
        assert!(evaluate(1024, 768, &ratios(&["16:9", "4:3"])).passed);
        assert!(evaluate(1000, 1000, &ratios(&["16:9", "1:1"])).passed);
    }

    #[test]
    fn repeating_decimals_match_after_rounding() {
        // 800/600 and 4/3 are both 1.33333…
        assert!(evaluate(800, 600, &ratios(&["4:3"])).passed);
        // 3/2 vs 1001/667 = 1.50074… → 1.501
        assert!(!evaluate(1001, 667, &ratios(&["3:2"])).passed);
    }

    #[test]
    fn exact_half_in_fourth_decimal_rounds_up() {
        // 323/80 = 4.0375 → 4.038
        assert!(evaluate(323, 80, &ratios(&["4038:1000"])).passed);
        assert_eq!(
            evaluate(4037, 1000, &ratios(&["323:80"])),
            EvaluationResult::fail(Reason::NoRatioMatch)
        );
    }

    #[test]
    fn equivalent_ratios_compare_by_value() {
        let c = Constraint::RatioList(vec![Ratio::new(32, 18)]);
        assert!(evaluate(1920, 1080, &c).passed);
    }

    #[test]
    fn unrecognized_constraint_always_fails() {
        assert_eq!(
            evaluate(100, 100, &Constraint::Unrecognized("round".into())),
            EvaluationResult::fail(Reason::UnknownConstraint)
        );
    }

    #[test]
    fn evaluation_is_idempotent() {
        let c = ratios(&["3:2"]);
        let first = evaluate(1500, 1000, &c);
        let second = evaluate(1500, 1000, &c);
        assert_eq!(first, second);
        assert!(first.passed);
    }

    #[test]
    fn reason_keys_match_message_table() {
        assert_eq!(Reason::MetadataMissing.key(), "image_metadata_missing");
        assert_eq!(
            Reason::NoRatioMatch.to_string(),
            "aspect_ratio_is_not_match_any_ratio"
        );
    }
}
