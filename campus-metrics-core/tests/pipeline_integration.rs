//! End-to-end enrichment pipeline tests.
//!
//! This test suite covers:
//! - The 120-row block-level workbook with one injected outlier
//! - Directional labelling of high and low outliers
//! - Degradation on an empty fact sheet
//! - Inner-join drop of facts without a building
//! - Idempotence of repeated calls
//! - Loading from a workbook file on disk

#![allow(clippy::unwrap_used)]

use campus_metrics_core::{
    AnomalyType, EnrichmentPipeline, InMemoryLoader, JsonWorkbookLoader, SourceTables,
    SummaryStatistics,
    loader::to_workbook_json,
};
use chrono::{Days, NaiveDate};
use serde_json::{Value, json};

const ACADEMIC_GOAL: i64 = 120;
const HOSTEL_GOAL: i64 = 250;

fn buildings() -> Vec<Value> {
    vec![
        json!({"BuildingKey": 1, "BuildingName": "SPJIMR ACAD BLOCK", "Type": "Academic", "Floors": 4}),
        json!({"BuildingKey": 2, "BuildingName": "HOSTEL B30", "Type": "Residential", "Floors": 14}),
    ]
}

fn blocks() -> Vec<Value> {
    vec![
        json!({"BlockID": 101, "BuildingKey": 1, "BlockName": "Block A", "Facilities": "Classrooms"}),
        json!({"BlockID": 102, "BuildingKey": 1, "BlockName": "Block B", "Facilities": "Library"}),
        json!({"BlockID": 201, "BuildingKey": 2, "BlockName": "Mess", "Facilities": "Dining"}),
        json!({"BlockID": 202, "BuildingKey": 2, "BlockName": "Night Canteen", "Facilities": "Dining"}),
    ]
}

/// Builds 30 days of readings for 4 blocks, cycling through 5 values
/// around each goal, and applies `overrides` as (row index, value).
fn block_facts(overrides: &[(usize, i64)]) -> Vec<Value> {
    let start = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
    let layout = [
        (1, 101, ACADEMIC_GOAL),
        (1, 102, ACADEMIC_GOAL),
        (2, 201, HOSTEL_GOAL),
        (2, 202, HOSTEL_GOAL),
    ];

    let mut facts = Vec::with_capacity(120);
    for day in 0..30u64 {
        let date = start.checked_add_days(Days::new(day)).unwrap();
        for (building_key, block_id, goal) in layout {
            facts.push(json!({
                "Date": date.format("%Y-%m-%d").to_string(),
                "BuildingKey": building_key,
                "BlockID": block_id,
                "Value": goal - 2 + (day % 5) as i64,
                "Goal": goal,
                "ResourceType": "Energy",
                "CO2_Emissions": 0.5
            }));
        }
    }
    for &(index, value) in overrides {
        facts[index]["Value"] = json!(value);
    }
    facts
}

fn pipeline(facts: Vec<Value>) -> EnrichmentPipeline<InMemoryLoader> {
    let tables = SourceTables::from_rows(facts, buildings(), blocks());
    EnrichmentPipeline::with_defaults(InMemoryLoader::new(tables))
}

#[test]
fn test_integration_single_injected_outlier() {
    // Row 42 is day 10, block 201
    let pipeline = pipeline(block_facts(&[(42, HOSTEL_GOAL * 10)]));

    let records = pipeline.get_enriched_data();
    assert_eq!(records.len(), 120);

    let alerts = pipeline.get_alerts();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].value, 2500.0);
    assert_eq!(alerts[0].anomaly_type, AnomalyType::HighWaste);
    assert_eq!(alerts[0].building_name, "HOSTEL B30");
    assert_eq!(alerts[0].block_name.as_deref(), Some("Mess"));
    assert_eq!(alerts[0].date_string(), "2026-01-25");

    let summary = pipeline.get_summary();
    assert_eq!(summary.high_anomalies, 1);
    assert_eq!(summary.low_anomalies, 0);
    assert_eq!(summary.top_consumer_building, "HOSTEL B30");
    assert_eq!(summary.top_consumer_block, "Mess");
    assert_eq!(summary.total_co2, 60.0);
    assert_eq!(summary.avg_co2, 0.5);
}

#[test]
fn test_integration_high_and_low_outliers() {
    let pipeline = pipeline(block_facts(&[(42, 2500), (9, 0)]));
    let alerts = pipeline.get_alerts();

    assert_eq!(alerts.len(), 2);
    // Source order is preserved: row 9 comes before row 42
    assert_eq!(alerts[0].value, 0.0);
    assert_eq!(alerts[0].anomaly_type, AnomalyType::LowFailure);
    assert_eq!(alerts[1].anomaly_type, AnomalyType::HighWaste);

    let summary = pipeline.get_summary();
    assert_eq!(summary.high_anomalies, 1);
    assert_eq!(summary.low_anomalies, 1);
}

#[test]
fn test_integration_directional_rule() {
    let records = pipeline(block_facts(&[(42, 2500), (9, 0)])).get_enriched_data();
    for record in records {
        match record.anomaly_type {
            AnomalyType::Normal => assert!(!record.is_anomaly),
            AnomalyType::HighWaste => assert!(record.is_anomaly && record.value > record.goal),
            AnomalyType::LowFailure => assert!(record.is_anomaly && record.value <= record.goal),
        }
    }
}

#[test]
fn test_integration_empty_facts() {
    let pipeline = pipeline(vec![]);

    assert!(pipeline.get_enriched_data().is_empty());
    assert!(pipeline.get_alerts().is_empty());

    let summary = pipeline.get_summary();
    assert_eq!(summary, SummaryStatistics::default());
    assert_eq!(summary.top_consumer_building, "N/A");
    assert_eq!(summary.top_consumer_block, "N/A");
}

#[test]
fn test_integration_unknown_building_dropped() {
    let mut facts = block_facts(&[]);
    facts.push(json!({
        "Date": "2026-02-14",
        "BuildingKey": 99,
        "BlockID": 101,
        "Value": 118,
        "Goal": 120
    }));

    let records = pipeline(facts).get_enriched_data();
    assert_eq!(records.len(), 120);
    assert!(records.iter().all(|r| r.building_key != 99));
}

#[test]
fn test_integration_repeated_calls_identical() {
    let pipeline = pipeline(block_facts(&[(42, 2500), (77, 3)]));

    let first = pipeline.get_enriched_data();
    let second = pipeline.get_enriched_data();
    assert_eq!(first, second);
    assert_eq!(pipeline.get_summary(), pipeline.get_summary());
}

#[test]
fn test_integration_workbook_file() {
    let tables = SourceTables::from_rows(block_facts(&[(42, 2500)]), buildings(), blocks());
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("campus_data.json");
    std::fs::write(&path, to_workbook_json(&tables).unwrap()).unwrap();

    let pipeline = EnrichmentPipeline::with_defaults(JsonWorkbookLoader::new(&path));
    let records = pipeline.get_enriched_data();
    assert_eq!(records.len(), 120);
    assert_eq!(pipeline.get_alerts().len(), 1);

    // Wire format: dates as YYYY-MM-DD, dashboard column names
    let json = serde_json::to_value(&records[0]).unwrap();
    assert_eq!(json["Date"], json!("2026-01-15"));
    assert_eq!(json["BuildingCategory"], json!("Academic"));
    assert_eq!(json["BlockName"], json!("Block A"));
    assert_eq!(json["anomaly_type"], json!("Normal"));
}

#[test]
fn test_integration_missing_workbook_degrades() {
    let pipeline = EnrichmentPipeline::with_defaults(JsonWorkbookLoader::new(
        "/nonexistent/data/raw/campus_data.json",
    ));
    assert!(pipeline.get_enriched_data().is_empty());
    assert_eq!(pipeline.get_summary(), SummaryStatistics::default());
}
