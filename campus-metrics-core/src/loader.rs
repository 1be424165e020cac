//! Dimension loaders that supply the raw source tables.
//!
//! Loading is synchronous and has no timeout or retry. A failing load fails
//! the whole pipeline invocation, which the facade then degrades to an
//! empty result.
//!
//! The workbook loader reads a JSON export of the campus workbook: a single
//! object whose keys are sheet names and whose values are arrays of row
//! objects.
//!
//! ```json
//! {
//!   "Facts": [{"Date": "2026-01-15", "BuildingKey": 1, "Value": 118.4, "Goal": 120.0}],
//!   "DimBuildings": [{"BuildingKey": 1, "BuildingName": "SPJIMR ACAD BLOCK", "Type": "Academic"}],
//!   "DimBlocks": [{"BlockID": 101, "BuildingKey": 1, "BlockName": "Block A"}]
//! }
//! ```

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::CampusMetricsError;
use crate::models::{BLOCKS_TABLE, BUILDINGS_TABLE, FACTS_TABLE, RawTable, SourceTables};
use crate::Result;

/// Supplies the Facts, DimBuildings and DimBlocks tables.
///
/// Implementations are read fresh on every call; no component caches what
/// a loader returns.
pub trait DimensionLoader: Send + Sync {
    /// Loads the source tables for one pipeline invocation
    fn load(&self) -> Result<SourceTables>;

    /// Short description of the source for log lines
    fn describe(&self) -> String;
}

/// Loader over tables already held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLoader {
    tables: SourceTables,
}

impl InMemoryLoader {
    /// Creates a loader that hands out copies of `tables`
    pub fn new(tables: SourceTables) -> Self {
        Self { tables }
    }
}

impl DimensionLoader for InMemoryLoader {
    fn load(&self) -> Result<SourceTables> {
        Ok(self.tables.clone())
    }

    fn describe(&self) -> String {
        "in-memory tables".to_string()
    }
}

/// Loader over a JSON workbook file on disk.
#[derive(Debug, Clone)]
pub struct JsonWorkbookLoader {
    path: PathBuf,
}

impl JsonWorkbookLoader {
    /// Creates a loader for the workbook at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the workbook path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DimensionLoader for JsonWorkbookLoader {
    fn load(&self) -> Result<SourceTables> {
        let contents = std::fs::read_to_string(&self.path).map_err(|e| {
            CampusMetricsError::io(format!("Failed to read {}", self.path.display()), e)
        })?;
        parse_workbook(&contents)
    }

    fn describe(&self) -> String {
        format!("workbook {}", self.path.display())
    }
}

/// Parses workbook JSON into source tables.
///
/// Sheets other than the three named ones are ignored. A named sheet that
/// is present but not an array is malformed.
pub fn parse_workbook(contents: &str) -> Result<SourceTables> {
    let workbook: Value = serde_json::from_str(contents)
        .map_err(|e| CampusMetricsError::serialization("Failed to parse workbook JSON", e))?;

    let sheets = workbook.as_object().ok_or_else(|| {
        CampusMetricsError::source_unavailable("workbook", "top level is not an object of sheets")
    })?;

    let sheet = |name: &str| -> Result<Option<RawTable>> {
        match sheets.get(name) {
            None => Ok(None),
            Some(Value::Array(rows)) => Ok(Some(RawTable::new(name, rows.clone()))),
            Some(_) => Err(CampusMetricsError::source_unavailable(
                name,
                "sheet is not an array of rows",
            )),
        }
    };

    Ok(SourceTables {
        facts: sheet(FACTS_TABLE)?,
        buildings: sheet(BUILDINGS_TABLE)?,
        blocks: sheet(BLOCKS_TABLE)?,
    })
}

/// Serializes source tables back into workbook JSON.
pub fn to_workbook_json(tables: &SourceTables) -> Result<String> {
    let mut sheets = serde_json::Map::new();
    for table in [&tables.facts, &tables.buildings, &tables.blocks]
        .into_iter()
        .flatten()
    {
        sheets.insert(table.name.clone(), Value::Array(table.rows.clone()));
    }
    serde_json::to_string_pretty(&Value::Object(sheets))
        .map_err(|e| CampusMetricsError::serialization("Failed to serialize workbook", e))
}
