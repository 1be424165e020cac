//! Library module for campus-metrics
//!
//! This module exposes the command-line surface and command execution for
//! testing purposes. The binary entry point is in main.rs.

pub mod generate;
pub mod output;

use std::path::PathBuf;

use campus_metrics_core::enrichment::{
    DEFAULT_CONTAMINATION, DEFAULT_SEED, DetectorConfig, EnrichmentPipeline, PipelineConfig,
};
use campus_metrics_core::loader::{DimensionLoader, JsonWorkbookLoader, to_workbook_json};
use campus_metrics_core::logging::LogFormat;
use campus_metrics_core::response::{AlertsResponse, MetricsResponse, SummaryResponse};
use campus_metrics_core::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::generate::{DEFAULT_GENERATOR_SEED, generate_workbook};
use crate::output::{to_json, write_json};

/// Workbook location used when neither the flag nor the environment sets one
pub const DEFAULT_WORKBOOK: &str = "data/raw/campus_data.json";

/// CLI argument structure
#[derive(Debug, Parser)]
#[command(name = "campus-metrics")]
#[command(about = "Campus sustainability metrics with anomaly detection")]
#[command(version)]
#[command(long_about = "
Campus Metrics - Sustainability dashboard data service

Joins daily resource-consumption facts against the building and block
dimensions of a campus workbook, flags anomalous readings with an
isolation forest, and prints dashboard response envelopes as JSON.

EXAMPLES:
  campus-metrics generate
  campus-metrics --workbook data/raw/campus_data.json metrics
  campus-metrics --contamination 0.1 alerts
  campus-metrics -o summary.json summary
")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(flatten)]
    pub source: SourceArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print every enriched record
    Metrics,
    /// Print only the records flagged as anomalous
    Alerts,
    /// Print headline summary statistics
    Summary,
    /// Write a synthetic campus workbook
    Generate(GenerateArgs),
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Seed for the synthetic readings
    #[arg(long, default_value_t = DEFAULT_GENERATOR_SEED)]
    pub generator_seed: u64,
}

#[derive(Debug, Args)]
pub struct SourceArgs {
    /// Workbook JSON file with Facts, DimBuildings and DimBlocks sheets
    #[arg(
        long,
        env = "CAMPUS_METRICS_WORKBOOK",
        default_value = DEFAULT_WORKBOOK,
        help = "Path to the campus workbook (JSON export)"
    )]
    pub workbook: PathBuf,

    /// Expected fraction of anomalous readings
    #[arg(
        long,
        env = "CAMPUS_METRICS_CONTAMINATION",
        default_value_t = DEFAULT_CONTAMINATION,
        help = "Expected outlier fraction, clamped to (0.0, 0.5]"
    )]
    pub contamination: f64,

    /// Seed for the isolation forest
    #[arg(long, env = "CAMPUS_METRICS_SEED", default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Disable anomaly detection
    #[arg(long, help = "Mark every record Normal without training a model")]
    pub disable_anomaly_detection: bool,

    /// Output file path
    #[arg(
        short,
        long,
        help = "Write the envelope (or generated workbook) here instead of the default"
    )]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Increase verbosity
    #[arg(
        short,
        long,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v, -vv)"
    )]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, help = "Suppress all logs except errors")]
    pub quiet: bool,

    /// Log line format
    #[arg(long, value_enum, default_value_t = LogFormatArg::Text)]
    pub log_format: LogFormatArg,
}

/// Log format choices on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Text,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Text => Self::Text,
            LogFormatArg::Json => Self::Json,
        }
    }
}

/// Builds the detector configuration from source arguments.
///
/// Out-of-range contamination is clamped with a warning rather than
/// rejected.
pub fn detector_config(args: &SourceArgs) -> DetectorConfig {
    DetectorConfig::new()
        .with_enabled(!args.disable_anomaly_detection)
        .with_contamination(args.contamination)
        .with_seed(args.seed)
}

/// Builds a pipeline over the configured workbook.
pub fn build_pipeline(args: &SourceArgs) -> Result<EnrichmentPipeline<JsonWorkbookLoader>> {
    let config = PipelineConfig::new().with_detector(detector_config(args));
    EnrichmentPipeline::new(JsonWorkbookLoader::new(&args.workbook), config)
}

/// Renders the envelope for a read command as JSON.
///
/// Returns `None` for `generate`, which produces a workbook instead.
pub fn render<L: DimensionLoader>(
    command: &Command,
    pipeline: &EnrichmentPipeline<L>,
) -> Result<Option<String>> {
    let json = match command {
        Command::Metrics => to_json(&MetricsResponse::success(pipeline.get_enriched_data()))?,
        Command::Alerts => to_json(&AlertsResponse::success(pipeline.get_alerts()))?,
        Command::Summary => to_json(&SummaryResponse::success(pipeline.get_summary()))?,
        Command::Generate(_) => return Ok(None),
    };
    Ok(Some(json))
}

/// Executes the parsed command line.
///
/// # Errors
/// Returns configuration, serialization and write failures. A degraded
/// pipeline is not an error; it renders an empty success envelope.
pub fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Command::Generate(args) => {
            let destination = cli.source.output.as_ref().unwrap_or(&cli.source.workbook);
            tracing::info!(
                "Generating workbook with seed {} at {}",
                args.generator_seed,
                destination.display()
            );
            let workbook = to_workbook_json(&generate_workbook(args.generator_seed))?;
            output::save_json(&workbook, destination)
        }
        command => {
            let pipeline = build_pipeline(&cli.source)?;
            tracing::info!("Reading {}", pipeline.loader().describe());
            match render(command, &pipeline)? {
                Some(json) => write_json(&json, cli.source.output.as_deref()),
                None => Ok(()),
            }
        }
    }
}
