//! Referential join of facts against the building and block dimensions.
//!
//! Both joins are inner joins. A fact whose building or block reference
//! has no matching dimension row is dropped without raising an error.
//! The drop counts are reported back to the caller so they can be logged.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::CampusMetricsError;
use crate::models::{
    BLOCKS_TABLE, BUILDINGS_TABLE, BlockDimension, BuildingDimension, EnrichedRecord, FACTS_TABLE,
    FactRecord, RawTable, SourceTables,
};
use crate::Result;

use super::schema::{parse_blocks, parse_buildings, parse_facts};

/// Row accounting for one join run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct JoinReport {
    /// Fact rows in the source sheet
    pub input_rows: usize,
    /// Fact rows skipped before the join because they could not be parsed
    pub unparsed_rows: usize,
    /// Facts dropped for lack of a matching building
    pub unmatched_buildings: usize,
    /// Facts dropped for lack of a matching block
    pub unmatched_blocks: usize,
    /// Blocks excluded because their building does not exist
    pub orphan_blocks: usize,
    /// Rows in the joined output
    pub joined_rows: usize,
}

impl JoinReport {
    /// Total fact rows that did not make it into the output
    pub fn dropped_rows(&self) -> usize {
        self.unparsed_rows
            .saturating_add(self.unmatched_buildings)
            .saturating_add(self.unmatched_blocks)
    }
}

/// Joined records and the accounting that produced them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JoinOutcome {
    pub records: Vec<EnrichedRecord>,
    pub report: JoinReport,
}

/// Joins typed facts against the dimensions.
///
/// The block join applies when `block_level` is true; in that case facts
/// without a `block_id` are dropped like any other unmatched row. Blocks
/// that point at a missing building are ignored. Output order follows
/// `facts`.
pub fn join(
    facts: &[FactRecord],
    buildings: &[BuildingDimension],
    blocks: &[BlockDimension],
    block_level: bool,
) -> JoinOutcome {
    let building_index: HashMap<i64, &BuildingDimension> =
        buildings.iter().map(|b| (b.building_key, b)).collect();

    let mut report = JoinReport {
        input_rows: facts.len(),
        ..JoinReport::default()
    };

    let mut block_index: HashMap<i64, &BlockDimension> = HashMap::with_capacity(blocks.len());
    for block in blocks {
        if building_index.contains_key(&block.building_key) {
            block_index.insert(block.block_id, block);
        } else {
            report.orphan_blocks = report.orphan_blocks.saturating_add(1);
        }
    }

    let mut records = Vec::with_capacity(facts.len());
    for fact in facts {
        let Some(building) = building_index.get(&fact.building_key) else {
            report.unmatched_buildings = report.unmatched_buildings.saturating_add(1);
            continue;
        };

        let block = if block_level {
            match fact.block_id.and_then(|id| block_index.get(&id)) {
                Some(block) => Some(*block),
                None => {
                    report.unmatched_blocks = report.unmatched_blocks.saturating_add(1);
                    continue;
                }
            }
        } else {
            None
        };

        records.push(EnrichedRecord::from_parts(fact, building, block));
    }

    report.joined_rows = records.len();
    JoinOutcome { records, report }
}

/// Parses the three source sheets and joins them.
///
/// # Errors
/// Returns `SourceUnavailable` when any sheet is absent or malformed.
pub fn join_tables(tables: &SourceTables) -> Result<JoinOutcome> {
    let facts_table = require_table(tables.facts.as_ref(), FACTS_TABLE)?;
    let buildings_table = require_table(tables.buildings.as_ref(), BUILDINGS_TABLE)?;
    let blocks_table = require_table(tables.blocks.as_ref(), BLOCKS_TABLE)?;

    let parsed = parse_facts(facts_table)?;
    let buildings = parse_buildings(buildings_table)?;
    let blocks = parse_blocks(blocks_table)?;

    let mut outcome = join(&parsed.records, &buildings, &blocks, parsed.block_level);
    outcome.report.input_rows = facts_table.len();
    outcome.report.unparsed_rows = parsed.skipped_rows;

    let report = &outcome.report;
    if report.unmatched_buildings > 0 || report.unmatched_blocks > 0 {
        tracing::warn!(
            "Join dropped {} fact rows without a matching building and {} without a matching block",
            report.unmatched_buildings,
            report.unmatched_blocks
        );
    }
    if report.orphan_blocks > 0 {
        tracing::warn!(
            "Ignored {} blocks that reference a missing building",
            report.orphan_blocks
        );
    }
    tracing::debug!(
        "Joined {} of {} fact rows against {} buildings and {} blocks",
        report.joined_rows,
        report.input_rows,
        buildings.len(),
        blocks.len()
    );

    Ok(outcome)
}

fn require_table<'a>(table: Option<&'a RawTable>, name: &str) -> Result<&'a RawTable> {
    table.ok_or_else(|| CampusMetricsError::source_unavailable(name, "table is absent"))
}
