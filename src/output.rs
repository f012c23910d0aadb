//! CLI output formatting.
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.
//!
//! ## Check
//!
//! ```text
//! avatar (square)
//! 001 me.png 400x400 1.000 ok
//! 002 wide.png 1920x1080 1.778 FAIL aspect_ratio_not_square
//!     Source: uploads/wide.png
//!
//! Errors
//!     Avatar must be a square image
//!
//! 1 of 2 files failed
//! ```
//!
//! ## Inspect
//!
//! ```text
//! 001 me.png 400x400 1.000
//! 002 broken.jpg unreadable: Unreadable image broken.jpg: ...
//! ```

use crate::errors::ValidationErrors;
use crate::metadata::ImageMetadata;
use crate::validator::{AttributeReport, FileOutcome};
use std::path::{Path, PathBuf};

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn dimensions(metadata: &ImageMetadata) -> String {
    format!("{}x{}", metadata.width, metadata.height)
}

fn ratio_column(ratio: Option<f64>) -> String {
    match ratio {
        Some(r) => format!("{r:.3}"),
        None => "-".to_string(),
    }
}

fn file_line(index: usize, outcome: &FileOutcome) -> String {
    let status = match outcome.result.reason {
        None => "ok".to_string(),
        Some(reason) => format!("FAIL {reason}"),
    };
    format!(
        "{} {} {} {} {}",
        format_index(index),
        outcome.filename,
        dimensions(&outcome.metadata),
        ratio_column(outcome.ratio),
        status
    )
}

/// Show `path` relative to `root` when possible.
fn display_source(path: &Path, root: Option<&Path>) -> String {
    root.and_then(|r| path.strip_prefix(r).ok())
        .unwrap_or(path)
        .display()
        .to_string()
}

/// Format the result of a `check` run.
///
/// Passing files get one line. Failing files add an indented `Source:` line so
/// they can be traced back to disk.
pub fn format_check_output(
    reports: &[AttributeReport],
    errors: &ValidationErrors,
    root: Option<&Path>,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut total = 0;
    let mut failed = 0;

    for (i, report) in reports.iter().enumerate() {
        if i > 0 {
            lines.push(String::new());
        }
        lines.push(format!("{} ({})", report.attribute, report.constraint));
        for (pos, outcome) in report.files.iter().enumerate() {
            lines.push(file_line(pos + 1, outcome));
            if !outcome.result.passed {
                lines.push(format!(
                    "{}Source: {}",
                    indent(1),
                    display_source(&outcome.source, root)
                ));
                failed += 1;
            }
            total += 1;
        }
        if report.files.is_empty() {
            lines.push(format!("{}(no files)", indent(1)));
        }
    }

    if !errors.is_empty() {
        lines.push(String::new());
        lines.push("Errors".to_string());
        for message in errors.full_messages() {
            lines.push(format!("{}{}", indent(1), message));
        }
    }

    lines.push(String::new());
    if failed == 0 {
        lines.push(format!("All {total} files passed"));
    } else {
        lines.push(format!("{failed} of {total} files failed"));
    }
    lines
}

pub fn print_check_output(reports: &[AttributeReport], errors: &ValidationErrors, root: Option<&Path>) {
    for line in format_check_output(reports, errors, root) {
        println!("{}", line);
    }
}

/// One probed file for the `inspect` command.
#[derive(Debug, Clone)]
pub struct InspectEntry {
    pub path: PathBuf,
    pub metadata: Result<ImageMetadata, String>,
}

/// Format the result of an `inspect` run.
pub fn format_inspect_output(entries: &[InspectEntry], root: Option<&Path>) -> Vec<String> {
    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let name = display_source(&entry.path, root);
            match &entry.metadata {
                Ok(meta) => format!(
                    "{} {} {} {}",
                    format_index(i + 1),
                    name,
                    dimensions(meta),
                    ratio_column(crate::ratio::rounded_ratio(meta.width, meta.height))
                ),
                Err(e) => format!("{} {} unreadable: {}", format_index(i + 1), name, e),
            }
        })
        .collect()
}

pub fn print_inspect_output(entries: &[InspectEntry], root: Option<&Path>) {
    for line in format_inspect_output(entries, root) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::Constraint;
    use crate::errors::ErrorKey;
    use crate::evaluate::{EvaluationResult, Reason};

    fn outcome(name: &str, w: u32, h: u32, result: EvaluationResult) -> FileOutcome {
        FileOutcome {
            filename: name.to_string(),
            source: PathBuf::from("/uploads").join(name),
            metadata: ImageMetadata::new(w, h),
            ratio: crate::ratio::rounded_ratio(w, h),
            result,
        }
    }

    #[test]
    fn check_output_lists_files_and_errors() {
        let reports = vec![AttributeReport {
            attribute: "avatar".into(),
            constraint: Constraint::Square,
            files: vec![
                outcome("me.png", 400, 400, EvaluationResult::pass()),
                outcome(
                    "wide.png",
                    1920,
                    1080,
                    EvaluationResult::fail(Reason::NotSquare),
                ),
            ],
        }];
        let mut errors = ValidationErrors::new();
        errors.add("avatar", ErrorKey::Reason(Reason::NotSquare), "square");

        let lines = format_check_output(&reports, &errors, Some(Path::new("/uploads")));
        assert_eq!(
            lines,
            vec![
                "avatar (square)",
                "001 me.png 400x400 1.000 ok",
                "002 wide.png 1920x1080 1.778 FAIL aspect_ratio_not_square",
                "    Source: wide.png",
                "",
                "Errors",
                "    Avatar must be a square image",
                "",
                "1 of 2 files failed",
            ]
        );
    }

    #[test]
    fn check_output_all_passed() {
        let reports = vec![AttributeReport {
            attribute: "banner".into(),
            constraint: Constraint::from_ratios(&["16:9"]).unwrap(),
            files: vec![outcome("a.png", 1280, 720, EvaluationResult::pass())],
        }];
        let lines = format_check_output(&reports, &ValidationErrors::new(), None);
        assert_eq!(lines.first().unwrap(), "banner (16:9)");
        assert_eq!(lines.last().unwrap(), "All 1 files passed");
    }

    #[test]
    fn missing_metadata_shows_dash_ratio() {
        let line = file_line(
            3,
            &outcome("x.jpg", 0, 0, EvaluationResult::fail(Reason::MetadataMissing)),
        );
        assert_eq!(line, "003 x.jpg 0x0 - FAIL image_metadata_missing");
    }

    #[test]
    fn empty_report_says_no_files() {
        let reports = vec![AttributeReport {
            attribute: "avatar".into(),
            constraint: Constraint::Portrait,
            files: vec![],
        }];
        let lines = format_check_output(&reports, &ValidationErrors::new(), None);
        assert!(lines.contains(&"    (no files)".to_string()));
    }

    #[test]
    fn inspect_output_shows_ratio_or_error() {
        let entries = vec![
            InspectEntry {
                path: PathBuf::from("/pics/a.png"),
                metadata: Ok(ImageMetadata::new(800, 600)),
            },
            InspectEntry {
                path: PathBuf::from("/pics/b.jpg"),
                metadata: Err("bad header".into()),
            },
        ];
        let lines = format_inspect_output(&entries, Some(Path::new("/pics")));
        assert_eq!(
            lines,
            vec!["001 a.png 800x600 1.333", "002 b.jpg unreadable: bad header"]
        );
    }
}
