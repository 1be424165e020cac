//! Schema normalization ahead of the join.
//!
//! Source sheets are loosely typed: keys may arrive as `1` or `1.0` or
//! `"1"`, dates as strings or epoch timestamps, and the building sheet
//! uses a generic `Type` header that would collide with the fact sheet's
//! own `Type`. This module applies a fixed rename table and then parses
//! rows into the typed records the join works on.
//!
//! Dimension tables are strict: any row without its key or name makes the
//! whole table malformed. Fact rows are lenient: unusable rows are skipped
//! and counted so the join can report them.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};

use crate::error::CampusMetricsError;
use crate::models::{BlockDimension, BuildingDimension, FactRecord, RawTable};
use crate::Result;

/// Canonical column names after normalization.
pub mod columns {
    pub const DATE: &str = "Date";
    pub const BUILDING_KEY: &str = "BuildingKey";
    pub const BLOCK_ID: &str = "BlockID";
    pub const VALUE: &str = "Value";
    pub const GOAL: &str = "Goal";
    pub const RESOURCE_TYPE: &str = "ResourceType";
    pub const CO2_EMISSIONS: &str = "CO2_Emissions";
    pub const BUILDING_NAME: &str = "BuildingName";
    pub const BUILDING_CATEGORY: &str = "BuildingCategory";
    pub const TOTAL_FLOORS: &str = "TotalFloors";
    pub const BLOCK_NAME: &str = "BlockName";
    pub const FACILITIES: &str = "Facilities";
}

/// Which source sheet a rename applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Facts,
    Buildings,
    Blocks,
}

/// Fixed `(table, alias, canonical)` rename table.
///
/// Renames never overwrite a canonical column that is already present.
pub const RENAME_TABLE: &[(TableKind, &str, &str)] = &[
    (TableKind::Buildings, "Type", columns::BUILDING_CATEGORY),
    (TableKind::Buildings, "Category", columns::BUILDING_CATEGORY),
    (TableKind::Buildings, "Floors", columns::TOTAL_FLOORS),
    (TableKind::Facts, "Consumption", columns::VALUE),
    (TableKind::Facts, "Type", columns::RESOURCE_TYPE),
    (TableKind::Facts, "MetricType", columns::RESOURCE_TYPE),
    (TableKind::Facts, "Category", columns::RESOURCE_TYPE),
];

/// Resource type assumed for fact rows that do not state one
pub const DEFAULT_RESOURCE_TYPE: &str = "Energy";

/// Applies the rename table to a single row object.
pub fn normalize_row(kind: TableKind, row: &Map<String, Value>) -> Map<String, Value> {
    let mut normalized = row.clone();
    for (table, alias, canonical) in RENAME_TABLE {
        if *table != kind || normalized.contains_key(*canonical) {
            continue;
        }
        if let Some(value) = normalized.remove(*alias) {
            normalized.insert((*canonical).to_string(), value);
        }
    }
    normalized
}

/// Facts parsed from the raw sheet, plus the number of unusable rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedFacts {
    pub records: Vec<FactRecord>,
    pub skipped_rows: usize,
    /// True when the sheet carries block-level facts
    pub block_level: bool,
}

/// Parses the fact sheet.
///
/// The sheet is malformed when a row is not an object, or when it has rows
/// but none of them carries a `BuildingKey`. Individual rows with an
/// unusable key, date, value or goal are skipped.
pub fn parse_facts(table: &RawTable) -> Result<ParsedFacts> {
    let objects = row_objects(table)?;
    if !objects.is_empty() && !table.has_column(columns::BUILDING_KEY) {
        return Err(CampusMetricsError::source_unavailable(
            &table.name,
            format!("missing join key column '{}'", columns::BUILDING_KEY),
        ));
    }

    let block_level = table.has_column(columns::BLOCK_ID);
    let mut parsed = ParsedFacts {
        block_level,
        ..ParsedFacts::default()
    };

    for (index, obj) in objects.iter().enumerate() {
        let row = normalize_row(TableKind::Facts, obj);
        match parse_fact_row(&row) {
            Some(record) => parsed.records.push(record),
            None => {
                tracing::debug!("Skipping unusable fact row {} in '{}'", index, table.name);
                parsed.skipped_rows = parsed.skipped_rows.saturating_add(1);
            }
        }
    }

    if parsed.skipped_rows > 0 {
        tracing::warn!(
            "Skipped {} of {} fact rows with unusable date, key, value or goal",
            parsed.skipped_rows,
            objects.len()
        );
    }

    Ok(parsed)
}

fn parse_fact_row(row: &Map<String, Value>) -> Option<FactRecord> {
    let date = row.get(columns::DATE).and_then(normalize_date)?;
    let building_key = row.get(columns::BUILDING_KEY).and_then(extract_key)?;
    let value = row.get(columns::VALUE).and_then(extract_numeric)?;
    if value < 0.0 {
        return None;
    }
    let goal = row.get(columns::GOAL).and_then(extract_numeric)?;

    Some(FactRecord {
        date,
        building_key,
        block_id: row.get(columns::BLOCK_ID).and_then(extract_key),
        value,
        goal,
        resource_type: row
            .get(columns::RESOURCE_TYPE)
            .and_then(extract_text)
            .unwrap_or_else(|| DEFAULT_RESOURCE_TYPE.to_string()),
        co2_emissions: row.get(columns::CO2_EMISSIONS).and_then(extract_numeric),
    })
}

/// Parses the building dimension sheet.
pub fn parse_buildings(table: &RawTable) -> Result<Vec<BuildingDimension>> {
    let objects = row_objects(table)?;
    let mut seen = HashSet::with_capacity(objects.len());
    let mut buildings = Vec::with_capacity(objects.len());

    for obj in objects {
        let row = normalize_row(TableKind::Buildings, obj);
        let building_key = required(table, &row, columns::BUILDING_KEY, extract_key)?;
        if !seen.insert(building_key) {
            return Err(CampusMetricsError::source_unavailable(
                &table.name,
                format!("duplicate {} {}", columns::BUILDING_KEY, building_key),
            ));
        }

        buildings.push(BuildingDimension {
            building_key,
            name: required(table, &row, columns::BUILDING_NAME, extract_text)?,
            total_floors: row
                .get(columns::TOTAL_FLOORS)
                .and_then(extract_key)
                .and_then(|floors| u32::try_from(floors).ok()),
            category: required(table, &row, columns::BUILDING_CATEGORY, extract_text)?,
        });
    }

    Ok(buildings)
}

/// Parses the block dimension sheet.
pub fn parse_blocks(table: &RawTable) -> Result<Vec<BlockDimension>> {
    let objects = row_objects(table)?;
    let mut seen = HashSet::with_capacity(objects.len());
    let mut blocks = Vec::with_capacity(objects.len());

    for obj in objects {
        let row = normalize_row(TableKind::Blocks, obj);
        let block_id = required(table, &row, columns::BLOCK_ID, extract_key)?;
        if !seen.insert(block_id) {
            return Err(CampusMetricsError::source_unavailable(
                &table.name,
                format!("duplicate {} {}", columns::BLOCK_ID, block_id),
            ));
        }

        blocks.push(BlockDimension {
            block_id,
            building_key: required(table, &row, columns::BUILDING_KEY, extract_key)?,
            name: required(table, &row, columns::BLOCK_NAME, extract_text)?,
            facilities: row.get(columns::FACILITIES).and_then(extract_text),
        });
    }

    Ok(blocks)
}

fn row_objects(table: &RawTable) -> Result<Vec<&Map<String, Value>>> {
    table
        .rows
        .iter()
        .enumerate()
        .map(|(index, row)| {
            row.as_object().ok_or_else(|| {
                CampusMetricsError::source_unavailable(
                    &table.name,
                    format!("row {} is not an object", index),
                )
            })
        })
        .collect()
}

fn required<T>(
    table: &RawTable,
    row: &Map<String, Value>,
    column: &str,
    extract: fn(&Value) -> Option<T>,
) -> Result<T> {
    row.get(column).and_then(extract).ok_or_else(|| {
        CampusMetricsError::source_unavailable(
            &table.name,
            format!("missing or invalid '{}' column", column),
        )
    })
}

/// Extracts an integer key. Accepts integral floats and numeric strings.
pub fn extract_key(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15)
                .map(|f| f as i64)
        }),
        Value::String(s) => {
            let trimmed = s.trim();
            trimmed.parse::<i64>().ok().or_else(|| {
                trimmed
                    .parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15)
                    .map(|f| f as i64)
            })
        }
        _ => None,
    }
}

/// Extracts a finite numeric value.
///
/// Strings such as "NaN" or "inf" are rejected so they cannot poison the
/// detector.
pub fn extract_numeric(value: &Value) -> Option<f64> {
    let numeric = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    numeric.filter(|v| v.is_finite())
}

/// Extracts non-empty text. Numbers are rendered as text.
pub fn extract_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Epoch values at or above this magnitude are read as milliseconds
const EPOCH_MILLIS_THRESHOLD: i64 = 100_000_000_000;

/// Normalizes a date cell to a calendar date.
///
/// Accepts ISO dates, ISO date-times with or without offset, `YYYY/MM/DD`,
/// and Unix epoch timestamps (seconds, or milliseconds for large values).
pub fn normalize_date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::String(s) => parse_date_str(s.trim()),
        Value::Number(n) => {
            let epoch = n.as_i64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite() && f.abs() < 9.0e15)
                    .map(|f| f.trunc() as i64)
            })?;
            let timestamp = if epoch.abs() >= EPOCH_MILLIS_THRESHOLD {
                DateTime::from_timestamp_millis(epoch)
            } else {
                DateTime::from_timestamp(epoch, 0)
            };
            timestamp.map(|ts| ts.date_naive())
        }
        _ => None,
    }
}

fn parse_date_str(s: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        })
}
