//! Anomaly detection over joined consumption records.
//!
//! Scoring looks at the measured `value` column only. The detector then
//! labels each flagged record by comparing its value to its goal. That
//! comparison decides the label only; the model alone decides detection.

use crate::models::EnrichedRecord;
use crate::Result;

use super::config::DetectorConfig;
use super::isolation::{ForestParams, train_and_score_with};

/// Annotates records with `is_anomaly` and `anomaly_type`.
///
/// With fewer than `config.min_records` records, or with detection
/// disabled, every record is marked Normal and no model is trained.
///
/// # Errors
/// Returns a detection error only if the configuration is invalid.
pub fn detect(records: Vec<EnrichedRecord>, config: &DetectorConfig) -> Result<Vec<EnrichedRecord>> {
    if !config.enabled || records.len() < config.min_records {
        tracing::debug!(
            "Anomaly scoring skipped for {} records (enabled: {}, minimum: {})",
            records.len(),
            config.enabled,
            config.min_records
        );
        return Ok(mark_all_normal(records));
    }

    let values: Vec<f64> = records.iter().map(|r| r.value).collect();
    let params = ForestParams {
        n_trees: config.n_trees,
        max_samples: config.max_samples,
        contamination: config.contamination,
        seed: config.seed,
    };
    let verdicts = train_and_score_with(&values, params)?;

    let annotated: Vec<EnrichedRecord> = records
        .into_iter()
        .zip(verdicts)
        .map(|(record, is_anomaly)| record.with_verdict(is_anomaly))
        .collect();

    let flagged = annotated.iter().filter(|r| r.is_anomaly).count();
    tracing::debug!(
        "Flagged {} of {} records as anomalous",
        flagged,
        annotated.len()
    );

    Ok(annotated)
}

fn mark_all_normal(records: Vec<EnrichedRecord>) -> Vec<EnrichedRecord> {
    records
        .into_iter()
        .map(|record| record.with_verdict(false))
        .collect()
}
