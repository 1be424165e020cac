//! Core data structures and pipeline for campus sustainability metrics.
//!
//! This crate joins daily resource-consumption facts against building and
//! block dimensions, flags anomalous readings with an isolation forest, and
//! reduces the result to dashboard summary statistics. It is shared by the
//! `campus-metrics` binary and any other host that serves the dashboard.
//!
//! # Guarantees
//! - Every enriched record references an existing building (and block, when
//!   block-level data is present)
//! - Repeated calls over the same sources yield identical output
//! - Recoverable failures degrade to empty results instead of propagating
//!
//! # Architecture
//! The core library follows these patterns:
//! - Loader trait for source-table access abstraction
//! - Facade over pure join, detection and summary stages
//! - Typed error handling with a single error enum

pub mod enrichment;
pub mod error;
pub mod loader;
pub mod logging;
pub mod models;
pub mod response;

// Re-export commonly used types
pub use enrichment::{DetectorConfig, EnrichmentPipeline, PipelineConfig};
pub use error::{CampusMetricsError, Result};
pub use loader::{DimensionLoader, InMemoryLoader, JsonWorkbookLoader};
pub use logging::{LogFormat, init_logging};
pub use models::{
    AnomalyType, BlockDimension, BuildingDimension, EnrichedRecord, FactRecord, RawTable,
    SourceTables, SummaryStatistics,
};
pub use response::{AlertsResponse, ErrorResponse, MetricsResponse, SummaryResponse};
