use aspect_guard::attachment::{Attachment, Record};
use aspect_guard::config::{self, ProcessingConfig};
use aspect_guard::constraint::Constraint;
use aspect_guard::errors::ValidationErrors;
use aspect_guard::metadata::{ImageCrateSource, MetadataSource};
use aspect_guard::output::{self, InspectEntry};
use aspect_guard::validator::{AspectRatioValidator, AttributeReport};
use aspect_guard::scan;
use clap::{Parser, Subcommand, ValueEnum};
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "aspect-guard")]
#[command(about = "Check image aspect ratios against a rule")]
#[command(long_about = "\
Check image aspect ratios against a rule

Dimensions are read from each file's header; pixels are never decoded.
Ratios are compared after rounding width/height to 3 decimal places.

Examples:

  aspect-guard check --with square avatars/
  aspect-guard check --with 16:9 --with 21:9 banner.jpg
  aspect-guard check --config rules.toml --attribute banner uploads/
  aspect-guard inspect photos/

Set RUST_LOG=aspect_guard=debug to trace every evaluation.

Run 'aspect-guard gen-config' to print a documented rules file.")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Validate files against a shape or ratio list
    Check {
        /// Files or directories (walked recursively for images)
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// square, portrait, landscape, or a ratio like 16:9 (repeatable)
        #[arg(long = "with", value_name = "SHAPE", conflicts_with = "config")]
        with: Vec<String>,

        /// Rules file (see gen-config)
        #[arg(long, requires = "attribute")]
        config: Option<PathBuf>,

        /// Attribute name used in messages and for rule lookup
        #[arg(long)]
        attribute: Option<String>,

        /// Replace every default error message
        #[arg(long)]
        message: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: Format,
    },
    /// Print dimensions and rounded ratio of each file
    Inspect {
        /// Files or directories (walked recursively for images)
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Print a rules file with all options documented
    GenConfig,
}

/// Everything a `check` run produced, for `--format json`.
#[derive(Serialize)]
struct CheckSummary<'a> {
    passed: bool,
    reports: &'a [AttributeReport],
    errors: &'a ValidationErrors,
}

const DEFAULT_ATTRIBUTE: &str = "image";

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Check {
            paths,
            with,
            config: config_path,
            attribute,
            message,
            format,
        } => {
            let attribute = attribute.unwrap_or_else(|| DEFAULT_ATTRIBUTE.to_string());
            let (validator, processing) = match &config_path {
                Some(path) => {
                    let config = config::load_config(path)?;
                    let validator = AspectRatioValidator::new(config.rule(&attribute)?)?;
                    (validator, config.processing)
                }
                None => {
                    if with.is_empty() {
                        return Err("pass --with <SHAPE> or --config <FILE>".into());
                    }
                    let constraint = Constraint::from_values(with.as_slice())?;
                    (
                        AspectRatioValidator::from_constraint(&attribute, constraint),
                        ProcessingConfig::default(),
                    )
                }
            };
            let validator = match message {
                Some(message) => validator.with_message(message),
                None => validator,
            };
            init_thread_pool(&processing);

            let files = scan::collect_images(&paths)?;
            let source = ImageCrateSource::new();
            let mut attachments: Vec<Attachment> = files.into_iter().map(Attachment::new).collect();
            scan::analyze_all(&mut attachments, &source);

            let mut record = Record::new();
            record.attach_many(validator.attribute(), attachments);
            let reports = vec![validator.validate(&mut record, &source)];
            let passed = reports.iter().all(AttributeReport::passed);

            match format {
                Format::Text => {
                    output::print_check_output(&reports, &record.errors, common_root(&paths))
                }
                Format::Json => {
                    let summary = CheckSummary {
                        passed,
                        reports: &reports,
                        errors: &record.errors,
                    };
                    println!("{}", serde_json::to_string_pretty(&summary)?);
                }
            }

            if !passed {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Inspect { paths } => {
            init_thread_pool(&ProcessingConfig::default());
            let files = scan::collect_images(&paths)?;
            let source = ImageCrateSource::new();
            let entries: Vec<InspectEntry> = files
                .into_par_iter()
                .map(|path| {
                    let metadata = source.identify(&path).map_err(|e| e.to_string());
                    InspectEntry { path, metadata }
                })
                .collect();
            output::print_inspect_output(&entries, common_root(&paths));
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Log to stderr so stdout stays parseable. `RUST_LOG` overrides the default.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "aspect_guard=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; the user can constrain down, not up.
fn init_thread_pool(processing: &ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

/// The directory to show paths relative to: the single directory argument, if any.
fn common_root(paths: &[PathBuf]) -> Option<&Path> {
    match paths {
        [only] if only.is_dir() => Some(only.as_path()),
        _ => None,
    }
}
