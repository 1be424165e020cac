//! Enrichment pipeline facade.
//!
//! This module provides the `EnrichmentPipeline` that orchestrates loading,
//! joining, detection and summarization for every dashboard operation.

use crate::error::CampusMetricsError;
use crate::loader::DimensionLoader;
use crate::models::{EnrichedRecord, SummaryStatistics};
use crate::Result;

use super::anomaly::detect;
use super::config::PipelineConfig;
use super::join::join_tables;
use super::summary::summarize;

/// Pipeline facade over a dimension loader.
///
/// The pipeline holds only its loader and an immutable configuration, so
/// concurrent calls on a shared instance are independent. Each operation
/// reloads the sources and re-fits the detector.
///
/// # Example
///
/// ```rust,ignore
/// use campus_metrics_core::enrichment::EnrichmentPipeline;
/// use campus_metrics_core::loader::InMemoryLoader;
///
/// let pipeline = EnrichmentPipeline::with_defaults(InMemoryLoader::new(tables));
/// for alert in pipeline.get_alerts() {
///     println!("{} {}: {}", alert.date_string(), alert.building_name, alert.anomaly_type);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct EnrichmentPipeline<L: DimensionLoader> {
    loader: L,
    config: PipelineConfig,
}

impl<L: DimensionLoader> EnrichmentPipeline<L> {
    /// Creates a new pipeline with the given loader and configuration.
    ///
    /// # Errors
    /// Returns a configuration error if `config` fails validation.
    pub fn new(loader: L, config: PipelineConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| CampusMetricsError::configuration(e.to_string()))?;
        Ok(Self { loader, config })
    }

    /// Creates a new pipeline with default configuration.
    pub fn with_defaults(loader: L) -> Self {
        Self {
            loader,
            config: PipelineConfig::default(),
        }
    }

    /// Returns a reference to the pipeline configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Returns a reference to the loader.
    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Loads, joins and annotates the source tables.
    ///
    /// # Errors
    /// Propagates loader, parse and detection failures unchanged.
    pub fn try_enriched_data(&self) -> Result<Vec<EnrichedRecord>> {
        tracing::debug!("Loading source tables from {}", self.loader.describe());
        let tables = self.loader.load()?;
        let outcome = join_tables(&tables)?;
        detect(outcome.records, &self.config.detector)
    }

    /// Returns every joined record with its anomaly annotation.
    ///
    /// Never fails: any internal error is logged and yields an empty vector.
    pub fn get_enriched_data(&self) -> Vec<EnrichedRecord> {
        match self.try_enriched_data() {
            Ok(records) => {
                tracing::info!("Enriched {} records", records.len());
                records
            }
            Err(e) => {
                if e.is_recoverable() {
                    tracing::error!("Enrichment failed, returning no records: {}", e);
                } else {
                    tracing::error!("Enrichment misconfigured, returning no records: {}", e);
                }
                Vec::new()
            }
        }
    }

    /// Returns only the records flagged as anomalous, in source order.
    pub fn get_alerts(&self) -> Vec<EnrichedRecord> {
        let alerts: Vec<EnrichedRecord> = self
            .get_enriched_data()
            .into_iter()
            .filter(|r| r.is_anomaly)
            .collect();
        tracing::debug!("{} records flagged for alerting", alerts.len());
        alerts
    }

    /// Returns headline statistics over the enriched records.
    ///
    /// When enrichment degrades to empty, the zeroed statistics are returned.
    pub fn get_summary(&self) -> SummaryStatistics {
        summarize(&self.get_enriched_data())
    }
}
