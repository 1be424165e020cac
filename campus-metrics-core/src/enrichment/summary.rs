//! Headline statistics over enriched records.

use std::collections::BTreeMap;

use crate::models::{AnomalyType, EnrichedRecord, NOT_AVAILABLE, SummaryStatistics};

/// Reduces enriched records to summary statistics.
///
/// Empty input yields the zeroed statistics object. Leaderboard ties are
/// broken in favor of the lexicographically smallest name.
pub fn summarize(records: &[EnrichedRecord]) -> SummaryStatistics {
    if records.is_empty() {
        return SummaryStatistics::default();
    }

    let count = records.len() as f64;
    let total_value: f64 = records.iter().map(|r| r.value).sum();

    let co2: Vec<f64> = records.iter().filter_map(|r| r.co2_emissions).collect();
    let (total_co2, avg_co2) = if co2.is_empty() {
        (0.0, 0.0)
    } else {
        let total: f64 = co2.iter().sum();
        (total, total / co2.len() as f64)
    };

    let top_consumer_building =
        top_consumer(records.iter().map(|r| (r.building_name.as_str(), r.value)))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let top_consumer_block = top_consumer(
        records
            .iter()
            .filter_map(|r| r.block_name.as_deref().map(|name| (name, r.value))),
    )
    .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    SummaryStatistics {
        total_value: round2(total_value),
        avg_value: round2(total_value / count),
        total_co2: round2(total_co2),
        avg_co2: round2(avg_co2),
        top_consumer_building,
        top_consumer_block,
        low_anomalies: count_type(records, AnomalyType::LowFailure),
        high_anomalies: count_type(records, AnomalyType::HighWaste),
    }
}

/// Groups values by name and returns the name with the largest sum.
fn top_consumer<'a>(entries: impl Iterator<Item = (&'a str, f64)>) -> Option<String> {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for (name, value) in entries {
        *totals.entry(name).or_insert(0.0) += value;
    }

    // BTreeMap iterates in name order; strict comparison keeps the first
    // of several equal totals.
    let mut best: Option<(&str, f64)> = None;
    for (name, total) in totals {
        match best {
            Some((_, best_total)) if total <= best_total => {}
            _ => best = Some((name, total)),
        }
    }
    best.map(|(name, _)| name.to_string())
}

fn count_type(records: &[EnrichedRecord], anomaly_type: AnomalyType) -> u64 {
    records
        .iter()
        .filter(|r| r.anomaly_type == anomaly_type)
        .count() as u64
}

/// Rounds to 2 decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::{BlockDimension, BuildingDimension, FactRecord};
    use chrono::NaiveDate;

    fn record(building: &str, block: Option<&str>, value: f64, co2: Option<f64>) -> EnrichedRecord {
        let fact = FactRecord {
            date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            building_key: 1,
            block_id: block.map(|_| 101),
            value,
            goal: 100.0,
            resource_type: "Energy".to_string(),
            co2_emissions: co2,
        };
        let building = BuildingDimension {
            building_key: 1,
            name: building.to_string(),
            total_floors: None,
            category: "Academic".to_string(),
        };
        let block = block.map(|name| BlockDimension {
            block_id: 101,
            building_key: 1,
            name: name.to_string(),
            facilities: None,
        });
        EnrichedRecord::from_parts(&fact, &building, block.as_ref())
    }

    #[test]
    fn test_summarize_empty() {
        let summary = summarize(&[]);
        assert!(summary.is_empty());
        assert_eq!(summary.top_consumer_block, "N/A");
    }

    #[test]
    fn test_summarize_totals_and_rounding() {
        let records = vec![
            record("A", Some("Block A"), 10.004, Some(1.2)),
            record("A", Some("Block B"), 20.003, Some(2.3)),
            record("B", Some("Block C"), 5.0, None),
        ];

        let summary = summarize(&records);
        assert_eq!(summary.total_value, 35.01);
        assert_eq!(summary.avg_value, 11.67);
        assert_eq!(summary.total_co2, 3.5);
        // Mean over the records that carry emissions
        assert_eq!(summary.avg_co2, 1.75);
    }

    #[test]
    fn test_summarize_without_co2() {
        let records = vec![record("A", None, 10.0, None), record("B", None, 30.0, None)];
        let summary = summarize(&records);

        assert_eq!(summary.total_co2, 0.0);
        assert_eq!(summary.avg_co2, 0.0);
        assert_eq!(summary.top_consumer_building, "B");
        assert_eq!(summary.top_consumer_block, "N/A");
    }

    #[test]
    fn test_top_consumers_by_grouped_sum() {
        let records = vec![
            record("HOSTEL B30", Some("Mess"), 50.0, None),
            record("REC CENTER", Some("Gym"), 70.0, None),
            record("HOSTEL B30", Some("Mess"), 40.0, None),
        ];
        let summary = summarize(&records);
        assert_eq!(summary.top_consumer_building, "HOSTEL B30");
        assert_eq!(summary.top_consumer_block, "Mess");
    }

    #[test]
    fn test_top_consumer_tie_breaks_lexicographically() {
        let records = vec![
            record("Zeta", Some("Wing Z"), 10.0, None),
            record("Alpha", Some("Wing A"), 10.0, None),
        ];
        let summary = summarize(&records);
        assert_eq!(summary.top_consumer_building, "Alpha");
        assert_eq!(summary.top_consumer_block, "Wing A");
    }

    #[test]
    fn test_anomaly_counts() {
        let records = vec![
            record("A", None, 500.0, None).with_verdict(true),
            record("A", None, 1.0, None).with_verdict(true),
            record("A", None, 2.0, None).with_verdict(true),
            record("A", None, 100.0, None),
        ];
        let summary = summarize(&records);
        assert_eq!(summary.high_anomalies, 1);
        assert_eq!(summary.low_anomalies, 2);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(1.005_1), 1.01);
        assert_eq!(round2(2.0), 2.0);
        assert_eq!(round2(0.0), 0.0);
    }
}
