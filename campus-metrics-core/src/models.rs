//! Core data models for facility-consumption metrics.
//!
//! Raw tables arrive as rows of JSON objects, the same shape a spreadsheet
//! export or an HTTP body would have. The typed records below are produced
//! from them by the `enrichment::schema` normalization step and are never
//! mutated in place; enrichment always builds new `EnrichedRecord` values.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Name of the fact sheet supplied by the dimension loader
pub const FACTS_TABLE: &str = "Facts";
/// Name of the building dimension sheet
pub const BUILDINGS_TABLE: &str = "DimBuildings";
/// Name of the block dimension sheet
pub const BLOCKS_TABLE: &str = "DimBlocks";

/// Placeholder used by leaderboard fields when there is nothing to rank
pub const NOT_AVAILABLE: &str = "N/A";

/// A raw table as handed over by the dimension loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    pub name: String,
    pub rows: Vec<serde_json::Value>,
}

impl RawTable {
    /// Creates a new raw table
    pub fn new(name: impl Into<String>, rows: Vec<serde_json::Value>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    /// Returns the number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns true if any row object carries the given column
    pub fn has_column(&self, column: &str) -> bool {
        self.rows
            .iter()
            .filter_map(serde_json::Value::as_object)
            .any(|obj| obj.contains_key(column))
    }
}

/// The three named tables one pipeline invocation works on.
///
/// A table is `None` when the source did not contain it at all.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceTables {
    pub facts: Option<RawTable>,
    pub buildings: Option<RawTable>,
    pub blocks: Option<RawTable>,
}

impl SourceTables {
    /// Creates a complete set of source tables
    pub fn new(facts: RawTable, buildings: RawTable, blocks: RawTable) -> Self {
        Self {
            facts: Some(facts),
            buildings: Some(buildings),
            blocks: Some(blocks),
        }
    }

    /// Builds source tables from row vectors using the standard sheet names
    pub fn from_rows(
        facts: Vec<serde_json::Value>,
        buildings: Vec<serde_json::Value>,
        blocks: Vec<serde_json::Value>,
    ) -> Self {
        Self::new(
            RawTable::new(FACTS_TABLE, facts),
            RawTable::new(BUILDINGS_TABLE, buildings),
            RawTable::new(BLOCKS_TABLE, blocks),
        )
    }
}

/// One observed measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactRecord {
    pub date: NaiveDate,
    pub building_key: i64,
    pub block_id: Option<i64>,
    /// Measured quantity, never negative
    pub value: f64,
    pub goal: f64,
    pub resource_type: String,
    pub co2_emissions: Option<f64>,
}

/// A physical building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingDimension {
    pub building_key: i64,
    pub name: String,
    pub total_floors: Option<u32>,
    /// Academic, Residential, Amenities, ...
    pub category: String,
}

/// A sub-unit (wing) of a building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockDimension {
    pub block_id: i64,
    pub building_key: i64,
    pub name: String,
    pub facilities: Option<String>,
}

/// Directional label attached to every enriched record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AnomalyType {
    /// Not flagged by the detector
    #[default]
    #[serde(rename = "Normal")]
    Normal,
    /// Flagged, value above goal
    #[serde(rename = "High (Waste)")]
    HighWaste,
    /// Flagged, value at or below goal
    #[serde(rename = "Low (Potential Failure)")]
    LowFailure,
}

impl AnomalyType {
    /// Classifies a reading the detector already flagged.
    ///
    /// The comparison is purely linear and independent of the model.
    pub fn classify(value: f64, goal: f64) -> Self {
        if value > goal {
            AnomalyType::HighWaste
        } else {
            AnomalyType::LowFailure
        }
    }

    /// Returns the dashboard label for this type
    pub fn label(&self) -> &'static str {
        match self {
            AnomalyType::Normal => "Normal",
            AnomalyType::HighWaste => "High (Waste)",
            AnomalyType::LowFailure => "Low (Potential Failure)",
        }
    }
}

impl std::fmt::Display for AnomalyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A fact joined with its dimension context plus anomaly annotations.
///
/// Field names on the wire follow the dashboard's column spelling.
/// `Date` serializes as `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "BuildingKey")]
    pub building_key: i64,
    #[serde(rename = "BlockID", default, skip_serializing_if = "Option::is_none")]
    pub block_id: Option<i64>,
    #[serde(rename = "Value")]
    pub value: f64,
    #[serde(rename = "Goal")]
    pub goal: f64,
    #[serde(rename = "ResourceType")]
    pub resource_type: String,
    #[serde(
        rename = "CO2_Emissions",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub co2_emissions: Option<f64>,
    #[serde(rename = "BuildingName")]
    pub building_name: String,
    #[serde(rename = "BuildingCategory")]
    pub building_category: String,
    #[serde(rename = "BlockName", default, skip_serializing_if = "Option::is_none")]
    pub block_name: Option<String>,
    #[serde(default)]
    pub is_anomaly: bool,
    #[serde(default)]
    pub anomaly_type: AnomalyType,
}

impl EnrichedRecord {
    /// Creates an un-annotated record from a fact and its building.
    pub fn from_parts(
        fact: &FactRecord,
        building: &BuildingDimension,
        block: Option<&BlockDimension>,
    ) -> Self {
        Self {
            date: fact.date,
            building_key: fact.building_key,
            block_id: fact.block_id,
            value: fact.value,
            goal: fact.goal,
            resource_type: fact.resource_type.clone(),
            co2_emissions: fact.co2_emissions,
            building_name: building.name.clone(),
            building_category: building.category.clone(),
            block_name: block.map(|b| b.name.clone()),
            is_anomaly: false,
            anomaly_type: AnomalyType::Normal,
        }
    }

    /// Returns the canonical `YYYY-MM-DD` form of the date
    pub fn date_string(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    /// Sets the detector verdict and derives the directional label.
    pub fn with_verdict(mut self, is_anomaly: bool) -> Self {
        self.is_anomaly = is_anomaly;
        self.anomaly_type = if is_anomaly {
            AnomalyType::classify(self.value, self.goal)
        } else {
            AnomalyType::Normal
        };
        self
    }
}

/// Aggregate view over a set of enriched records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatistics {
    pub total_value: f64,
    pub avg_value: f64,
    pub total_co2: f64,
    pub avg_co2: f64,
    pub top_consumer_building: String,
    pub top_consumer_block: String,
    pub low_anomalies: u64,
    pub high_anomalies: u64,
}

impl Default for SummaryStatistics {
    fn default() -> Self {
        Self {
            total_value: 0.0,
            avg_value: 0.0,
            total_co2: 0.0,
            avg_co2: 0.0,
            top_consumer_building: NOT_AVAILABLE.to_string(),
            top_consumer_block: NOT_AVAILABLE.to_string(),
            low_anomalies: 0,
            high_anomalies: 0,
        }
    }
}

impl SummaryStatistics {
    /// Returns true if this is the zeroed statistics object
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
#[path = "models_tests.rs"]
mod tests;
