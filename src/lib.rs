//! Facelabel: facial-action video annotation and dataset export.
//!
//! Facelabel keeps time-interval annotations over a video, where every
//! interval carries one or more facial-action labels with their own
//! intensity and progression, and exports them as a per-frame dataset of
//! images plus fixed-width label vectors for model training.
//!
//! # Modules
//!
//! - [`catalog`]: The fixed, ordered label universe and cascade anchors
//! - [`model`]: Intervals, label configs and video metadata
//! - [`store`]: The non-overlapping interval store
//! - [`project`]: Versioned project file reading and writing
//! - [`timing`]: Interval times to frame spans and per-frame progress
//! - [`encode`]: Label vector encoding and cascade rules
//! - [`export`]: The dataset export pipeline
//! - [`stats`]: Store statistics
//! - [`validation`]: Diagnostics and error reporting
//! - [`error`]: Error types for facelabel operations

pub mod catalog;
pub mod encode;
pub mod error;
pub mod export;
pub mod model;
pub mod project;
pub mod stats;
pub mod store;
pub mod timing;
pub mod validation;

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

pub use error::FacelabelError;

use catalog::LabelCatalog;
use export::{ExportOptions, ExportProgress, ExportStage, Exporter, ImageFormat, ImageSequenceSource};
use model::AnnotationInterval;
use project::{LoadIssue, ProjectLoad};

/// The facelabel CLI application.
#[derive(Parser)]
#[command(name = "facelabel")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Validate a project file for errors and warnings.
    Validate(ValidateArgs),
    /// Show annotation statistics for a project.
    Stats(StatsArgs),
    /// List intervals at a time or within a time range.
    Query(QueryArgs),
    /// Remove duplicate labels and clamp intensities.
    Optimize(OptimizeArgs),
    /// Rewrite a project (including version 1.0 files) in the current format.
    Migrate(MigrateArgs),
    /// List the label catalog.
    Labels(LabelsArgs),
    /// Export a per-frame dataset from a project and its frames.
    Export(ExportArgs),
}

/// Arguments for the validate subcommand.
#[derive(clap::Args)]
struct ValidateArgs {
    /// Project file to validate.
    project: PathBuf,

    /// Treat warnings as errors (exit non-zero if any warnings).
    #[arg(long)]
    strict: bool,

    /// Output format for the report ('text' or 'json').
    #[arg(long, default_value = "text", value_parser = ["text", "json"])]
    output: String,
}

#[derive(clap::Args)]
struct StatsArgs {
    /// Project file.
    project: PathBuf,

    /// Output format ('text' or 'json').
    #[arg(long, default_value = "text", value_parser = ["text", "json"])]
    output: String,
}

#[derive(clap::Args)]
struct QueryArgs {
    /// Project file.
    project: PathBuf,

    /// Time in seconds; lists intervals containing it.
    #[arg(long, conflicts_with_all = ["from", "to"], allow_hyphen_values = true)]
    at: Option<f64>,

    /// Range start in seconds.
    #[arg(long, requires = "to", allow_hyphen_values = true)]
    from: Option<f64>,

    /// Range end in seconds.
    #[arg(long, requires = "from", allow_hyphen_values = true)]
    to: Option<f64>,

    /// Output format ('text' or 'json').
    #[arg(long, default_value = "text", value_parser = ["text", "json"])]
    output: String,
}

#[derive(clap::Args)]
struct OptimizeArgs {
    /// Project file.
    project: PathBuf,

    /// Write the result here instead of overwriting the project.
    #[arg(long)]
    write_to: Option<PathBuf>,
}

#[derive(clap::Args)]
struct MigrateArgs {
    /// Project file in any supported version.
    project: PathBuf,

    /// Where to write the migrated project.
    #[arg(long)]
    write_to: PathBuf,
}

#[derive(clap::Args)]
struct LabelsArgs {
    /// Output format ('text' or 'json').
    #[arg(long, default_value = "text", value_parser = ["text", "json"])]
    output: String,
}

#[derive(clap::Args)]
struct ExportArgs {
    /// Project file.
    project: PathBuf,

    /// Directory of decoded frames, one image per frame, ordered by name.
    #[arg(long, env = "FACELABEL_FRAMES")]
    frames: PathBuf,

    /// Output directory for the dataset.
    #[arg(long, env = "FACELABEL_OUT")]
    out: PathBuf,

    /// Frame rate of the frames (defaults to the project's video fps).
    #[arg(long)]
    fps: Option<f64>,

    /// Image format for exported frames ('jpg' or 'png').
    #[arg(long, default_value = "jpg", env = "FACELABEL_IMAGE_FORMAT")]
    image_format: String,

    /// Encoder quality (1-100).
    #[arg(
        long,
        default_value_t = 95,
        env = "FACELABEL_QUALITY",
        value_parser = clap::value_parser!(u8).range(1..=100)
    )]
    quality: u8,

    /// Frames between progress checkpoints.
    #[arg(
        long,
        default_value_t = 10,
        env = "FACELABEL_CHECKPOINT_EVERY",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    checkpoint_every: u64,
}

/// Run the facelabel CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), FacelabelError> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Some(Commands::Validate(args)) => run_validate(args),
        Some(Commands::Stats(args)) => run_stats(args),
        Some(Commands::Query(args)) => run_query(args),
        Some(Commands::Optimize(args)) => run_optimize(args),
        Some(Commands::Migrate(args)) => run_migrate(args),
        Some(Commands::Labels(args)) => run_labels(args),
        Some(Commands::Export(args)) => run_export(args),
        None => {
            println!("facelabel {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Facial-action video annotation and dataset export.");
            println!();
            println!("Run 'facelabel --help' for usage information.");
            Ok(())
        }
    }
}

/// Logs go to stderr so JSON on stdout stays parseable. `RUST_LOG`
/// overrides the `-v` level.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), FacelabelError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| FacelabelError::InvalidArgument(format!("cannot render JSON: {e}")))?;
    println!("{}", json);
    Ok(())
}

fn print_load_issues(load: &ProjectLoad) {
    if load.issues.is_empty() {
        return;
    }
    println!("Skipped {} entry(ies) while loading:", load.issues.len());
    for issue in &load.issues {
        println!("  {}", issue);
    }
    println!();
}

/// Execute the validate subcommand.
fn run_validate(args: ValidateArgs) -> Result<(), FacelabelError> {
    let load = project::read_project(&args.project)?;
    let catalog = LabelCatalog::facial_actions();

    let opts = validation::ValidateOptions {
        strict: args.strict,
    };
    let report = load.store.validate_with(&catalog, &opts);

    match args.output.as_str() {
        "json" => {
            #[derive(Serialize)]
            struct JsonReport<'a> {
                error_count: usize,
                warning_count: usize,
                issues: &'a [validation::ValidationIssue],
                skipped_entries: Vec<String>,
            }
            print_json(&JsonReport {
                error_count: report.error_count(),
                warning_count: report.warning_count(),
                issues: &report.issues,
                skipped_entries: load.issues.iter().map(LoadIssue::to_string).collect(),
            })?;
        }
        _ => {
            print_load_issues(&load);
            print!("{}", report);
        }
    }

    // Skipped entries count as warnings for --strict.
    let has_errors = report.error_count() > 0;
    let has_warnings = report.warning_count() > 0 || !load.issues.is_empty();

    if has_errors || (args.strict && has_warnings) {
        Err(FacelabelError::ValidationFailed {
            error_count: report.error_count(),
            warning_count: report.warning_count() + load.issues.len(),
            report,
        })
    } else {
        Ok(())
    }
}

fn run_stats(args: StatsArgs) -> Result<(), FacelabelError> {
    let load = project::read_project(&args.project)?;
    let catalog = LabelCatalog::facial_actions();
    let statistics = load.store.statistics();
    let grouping = load.store.label_grouping(&catalog);

    match args.output.as_str() {
        "json" => {
            #[derive(Serialize)]
            struct JsonStats<'a> {
                statistics: &'a stats::StoreStatistics,
                label_grouping: &'a stats::LabelGrouping,
            }
            print_json(&JsonStats {
                statistics: &statistics,
                label_grouping: &grouping,
            })
        }
        _ => {
            print!("{}", statistics);
            if !grouping.tongue_actions.is_empty() {
                println!();
                println!("  tongue actions: {}", grouping.tongue_actions.join(", "));
            }
            Ok(())
        }
    }
}

fn run_query(args: QueryArgs) -> Result<(), FacelabelError> {
    let load = project::read_project(&args.project)?;
    let store = &load.store;

    let hits: Vec<&AnnotationInterval> = match (args.at, args.from, args.to) {
        (Some(t), _, _) => store.query_at_time(t),
        (None, Some(from), Some(to)) => store.query_range(from, to),
        _ => {
            return Err(FacelabelError::InvalidArgument(
                "pass either --at <t> or --from <a> --to <b>".to_string(),
            ))
        }
    };

    match args.output.as_str() {
        "json" => print_json(&hits),
        _ => {
            if hits.is_empty() {
                println!("No intervals found");
            }
            for interval in hits {
                println!(
                    "{}  {:.3}-{:.3}  {}",
                    interval.id,
                    interval.start_time,
                    interval.end_time,
                    interval.display_labels()
                );
            }
            Ok(())
        }
    }
}

fn run_optimize(args: OptimizeArgs) -> Result<(), FacelabelError> {
    let mut load = project::read_project(&args.project)?;
    let corrections = load.store.optimize();

    let target = args.write_to.as_deref().unwrap_or(&args.project);
    if !load.store.is_dirty() && args.write_to.is_none() {
        println!("Nothing to optimize");
        return Ok(());
    }

    project::save_project(&mut load.store, Some(target))?;
    println!(
        "Applied {} correction(s); wrote {}",
        corrections,
        target.display()
    );
    Ok(())
}

fn run_migrate(args: MigrateArgs) -> Result<(), FacelabelError> {
    let mut load = project::read_project(&args.project)?;
    print_load_issues(&load);

    project::save_project(&mut load.store, Some(&args.write_to))?;
    println!(
        "Migrated {} interval(s) from version {} to {}: {}",
        load.store.len(),
        load.version,
        project::PROJECT_VERSION,
        args.write_to.display()
    );
    Ok(())
}

fn run_labels(args: LabelsArgs) -> Result<(), FacelabelError> {
    let catalog = LabelCatalog::facial_actions();
    match args.output.as_str() {
        "json" => print_json(catalog.entries()),
        _ => {
            print!("{}", catalog);
            Ok(())
        }
    }
}

fn run_export(args: ExportArgs) -> Result<(), FacelabelError> {
    let load = project::read_project(&args.project)?;
    let video = load.store.video_info();
    let catalog = LabelCatalog::facial_actions();

    let image_format: ImageFormat = args.image_format.parse()?;
    let fps = args.fps.unwrap_or(video.fps);
    let mut source = ImageSequenceSource::open(&args.frames, fps)?;

    let options = ExportOptions {
        output_dir: args.out,
        image_format,
        quality: args.quality,
        checkpoint_every: args.checkpoint_every,
        source_video: (!video.file_path.is_empty()).then(|| video.file_path.clone()),
        ..Default::default()
    };

    let mut exporter = Exporter::new(&catalog, options);
    let mut on_progress = |p: &ExportProgress| {
        if !matches!(p.stage, ExportStage::Checkpoint { .. }) {
            info!(percent = p.percent, "{}", p.message);
        }
        true
    };
    let stats = exporter.export(&mut source, load.store.intervals(), &mut on_progress)?;

    print!("{}", stats);
    Ok(())
}
