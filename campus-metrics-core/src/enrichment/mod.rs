//! Enrichment pipeline for facility-consumption facts.
//!
//! This module turns the raw source tables into annotated records:
//! - **Schema**: Fixed column renames and typed parsing of each sheet
//! - **Join**: Inner join of facts against buildings and blocks
//! - **Anomaly Detection**: Isolation-forest scoring of the `Value` column
//! - **Summary**: Headline totals, averages and leaderboards
//!
//! Every call re-reads the sources and re-fits the model. Nothing is cached
//! between invocations.
//!
//! # Example
//! ```rust,ignore
//! use campus_metrics_core::enrichment::{EnrichmentPipeline, PipelineConfig};
//! use campus_metrics_core::loader::JsonWorkbookLoader;
//!
//! let loader = JsonWorkbookLoader::new("data/raw/campus_data.json");
//! let pipeline = EnrichmentPipeline::new(loader, PipelineConfig::default())?;
//! let summary = pipeline.get_summary();
//! println!("Top consumer: {}", summary.top_consumer_building);
//! ```

mod anomaly;
mod config;
mod isolation;
mod join;
mod pipeline;
pub mod schema;
mod summary;

// Re-export public API
pub use anomaly::detect;
pub use config::{
    ConfigValidationError, DEFAULT_CONTAMINATION, DEFAULT_MAX_SAMPLES, DEFAULT_MIN_RECORDS,
    DEFAULT_SEED, DEFAULT_TREES, DetectorConfig, PipelineConfig,
};
pub use isolation::{
    ForestParams, IsolationForest, average_path_length, train_and_score, train_and_score_with,
};
pub use join::{JoinOutcome, JoinReport, join, join_tables};
pub use pipeline::EnrichmentPipeline;
pub use summary::{round2, summarize};
