//! Synthetic campus workbook generation.
//!
//! Produces the demo dataset the dashboard ships with: six buildings, six
//! blocks and thirty days of daily energy readings. Readings scatter around
//! a per-building goal with normally distributed noise, so a default run of
//! the detector usually flags a handful of rows.

use campus_metrics_core::enrichment::round2;
use campus_metrics_core::models::SourceTables;
use chrono::{Days, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{Value, json};

/// Default seed for generated workbooks
pub const DEFAULT_GENERATOR_SEED: u64 = 2026;
/// Number of generated days
pub const GENERATED_DAYS: u64 = 30;

const HOSTEL_GOAL: f64 = 250.0;
const DEFAULT_GOAL: f64 = 120.0;
const NOISE_STD_DEV: f64 = 25.0;

const BUILDINGS: [(i64, &str, u32, &str); 6] = [
    (1, "SPJIMR ACAD BLOCK", 4, "Academic"),
    (2, "HOSTEL B30", 14, "Residential"),
    (3, "HOSTEL B27", 10, "Residential"),
    (4, "HOSTEL B26", 10, "Residential"),
    (5, "HOSTEL B25", 12, "Residential"),
    (6, "REC CENTER", 4, "Amenities"),
];

const BLOCKS: [(i64, i64, &str, &str); 6] = [
    (101, 1, "Block A", "Admin, Accounts, Deans Office"),
    (102, 1, "Block B", "Classrooms, Faculty, Wise Tech Lab"),
    (103, 1, "Block C", "Sim Lab, DT Lab, Group Work"),
    (104, 1, "Block D", "Reading Room, Classrooms"),
    (105, 3, "Night Canteen", "Dining"),
    (106, 6, "Gym & Mess", "Fitness, Dining"),
];

/// First generated day
pub fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 15).unwrap_or_default()
}

/// Consumption goal for a building key
pub fn goal_for(building_key: i64) -> f64 {
    if (2..=5).contains(&building_key) {
        HOSTEL_GOAL
    } else {
        DEFAULT_GOAL
    }
}

/// Generates the synthetic workbook tables.
///
/// The same seed always yields the same workbook. Fact rows use the
/// workbook's source spelling (`Consumption`, `Type`) and carry no block
/// reference, so the join runs at building level.
pub fn generate_workbook(seed: u64) -> SourceTables {
    let mut rng = StdRng::seed_from_u64(seed);
    let start = start_date();

    let mut facts = Vec::with_capacity(BUILDINGS.len() * GENERATED_DAYS as usize);
    for day in 0..GENERATED_DAYS {
        let date = start.checked_add_days(Days::new(day)).unwrap_or(start);
        for (building_key, ..) in BUILDINGS {
            let goal = goal_for(building_key);
            let consumption = round2(goal + NOISE_STD_DEV * standard_normal(&mut rng)).max(0.0);
            facts.push(json!({
                "Date": date.format("%Y-%m-%d").to_string(),
                "BuildingKey": building_key,
                "Consumption": consumption,
                "Goal": goal,
                "Type": "Energy"
            }));
        }
    }

    let buildings: Vec<Value> = BUILDINGS
        .iter()
        .map(|(key, name, floors, category)| {
            json!({"BuildingKey": key, "BuildingName": name, "Floors": floors, "Type": category})
        })
        .collect();

    let blocks: Vec<Value> = BLOCKS
        .iter()
        .map(|(id, building_key, name, facilities)| {
            json!({"BlockID": id, "BuildingKey": building_key, "BlockName": name, "Facilities": facilities})
        })
        .collect();

    tracing::debug!(
        "Generated {} fact rows for {} buildings",
        facts.len(),
        buildings.len()
    );

    SourceTables::from_rows(facts, buildings, blocks)
}

/// Box-Muller draw from N(0, 1)
fn standard_normal(rng: &mut StdRng) -> f64 {
    // random() is in [0, 1); shift away from zero before taking the log
    let u1: f64 = 1.0 - rng.random::<f64>();
    let u2: f64 = rng.random::<f64>();
    (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_workbook_shape() {
        let tables = generate_workbook(DEFAULT_GENERATOR_SEED);

        assert_eq!(tables.facts.as_ref().map(|t| t.len()), Some(180));
        assert_eq!(tables.buildings.as_ref().map(|t| t.len()), Some(6));
        assert_eq!(tables.blocks.as_ref().map(|t| t.len()), Some(6));
    }

    #[test]
    fn test_generate_workbook_is_seeded() {
        assert_eq!(generate_workbook(7), generate_workbook(7));
        assert_ne!(generate_workbook(7), generate_workbook(8));
    }

    #[test]
    fn test_generated_readings_are_non_negative() {
        let tables = generate_workbook(11);
        let facts = tables.facts.unwrap();
        for row in &facts.rows {
            let consumption = row["Consumption"].as_f64().unwrap();
            assert!(consumption >= 0.0);
        }
        assert_eq!(facts.rows[0]["Date"], json!("2026-01-15"));
        assert_eq!(facts.rows[179]["Date"], json!("2026-02-13"));
    }

    #[test]
    fn test_goals() {
        assert_eq!(goal_for(1), 120.0);
        assert_eq!(goal_for(2), 250.0);
        assert_eq!(goal_for(5), 250.0);
        assert_eq!(goal_for(6), 120.0);
    }
}
