//! Miles-paved aggregates over a production file.

use crate::store::ProductionStore;
use chrono::NaiveDateTime;
use pave_common::{Mode, PavType, PavingRecord, ProjectType, Result};
use pave_config::PipelineConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

/// Streets wider than this count twice.
pub const WIDE_STREET_FT: f64 = 50.0;

/// Length multiplier for wide streets.
pub const WIDE_STREET_FACTOR: f64 = 2.0;

pub const FEET_PER_MILE: f64 = 5280.0;

/// A single aggregate figure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub value: f64,
}

/// Every figure the aggregator can report, already rounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MileBreakdown {
    pub total: f64,
    pub overlay: f64,
    pub slurry: f64,
    pub by_type: BTreeMap<ProjectType, f64>,
}

impl MileBreakdown {
    /// Sum miles per project type for rows with `status` on or after `range_start`.
    pub fn compute(rows: &[PavingRecord], status: &str, range_start: NaiveDateTime) -> Self {
        let mut sums: BTreeMap<ProjectType, f64> = BTreeMap::new();
        for row in rows {
            if row.status != status || !row.moratorium.is_some_and(|d| d >= range_start) {
                continue;
            }
            let (Some(project_type), Some(length)) = (row.project_type, row.length) else {
                continue;
            };
            *sums.entry(project_type).or_insert(0.0) += segment_miles(length, row.width);
        }

        let total = round2(sums.values().sum());
        let of = |t: ProjectType| sums.get(&t).copied().map_or(0.0, round2);
        Self {
            total,
            overlay: of(ProjectType::Overlay),
            slurry: of(ProjectType::Slurry),
            by_type: sums.iter().map(|(t, v)| (*t, round2(*v))).collect(),
        }
    }

    pub fn select(&self, pav_type: PavType) -> AggregateResult {
        let value = match pav_type {
            PavType::Total => self.total,
            PavType::Overlay => self.overlay,
            PavType::Slurry => self.slurry,
        };
        AggregateResult { value }
    }
}

/// Miles for one segment, doubling wide streets.
pub fn segment_miles(length_ft: f64, width_ft: Option<f64>) -> f64 {
    let length = if width_ft.is_some_and(|w| w > WIDE_STREET_FT) {
        length_ft * WIDE_STREET_FACTOR
    } else {
        length_ft
    };
    length / FEET_PER_MILE
}

/// Two decimals, ties to even.
fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Aggregates over the production files named by a configuration.
#[derive(Debug, Clone)]
pub struct MileAggregator<'a> {
    config: &'a PipelineConfig,
    store: ProductionStore,
}

impl<'a> MileAggregator<'a> {
    pub fn new(config: &'a PipelineConfig) -> Self {
        Self {
            config,
            store: ProductionStore::new(config.date_format.clone()),
        }
    }

    /// Load the mode's production file and compute every figure.
    pub fn breakdown(&self, mode: Mode, range_start: NaiveDateTime) -> Result<MileBreakdown> {
        let rows = self.store.read(&self.config.production_path(mode))?;
        Ok(MileBreakdown::compute(
            &rows,
            &self.config.aggregate_status,
            range_start,
        ))
    }

    pub fn aggregate(
        &self,
        mode: Mode,
        pav_type: PavType,
        range_start: NaiveDateTime,
    ) -> Result<AggregateResult> {
        let result = self.breakdown(mode, range_start)?.select(pav_type);
        info!(
            mode = %mode,
            pav_type = %pav_type,
            miles = result.value,
            "{} miles paved {}",
            pav_type,
            result.value
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pave_common::time::parse_timestamp;

    fn ts(s: &str) -> NaiveDateTime {
        parse_timestamp(s).unwrap()
    }

    fn row(
        t: ProjectType,
        length: f64,
        width: f64,
        status: &str,
        moratorium: &str,
    ) -> PavingRecord {
        PavingRecord {
            pve_id: None,
            seg_id: "S".to_string(),
            project_id: "W".to_string(),
            title: String::new(),
            pm: None,
            pm_phone: None,
            start: None,
            end: None,
            resident_engineer: None,
            moratorium: parse_timestamp(moratorium),
            status: status.to_string(),
            project_type: Some(t),
            length: Some(length),
            width: Some(width),
        }
    }

    const PC: &str = "Post Construction";

    #[test]
    fn wide_streets_count_double() {
        assert_eq!(segment_miles(5280.0, Some(50.0)), 1.0);
        assert_eq!(segment_miles(5280.0, Some(50.5)), 2.0);
        assert_eq!(segment_miles(2640.0, None), 0.5);
    }

    #[test]
    fn breakdown_filters_status_and_window() {
        let rows = vec![
            row(ProjectType::Overlay, 5280.0, 40.0, PC, "2024-02-01"),
            row(ProjectType::Overlay, 2640.0, 60.0, PC, "2024-01-01"),
            row(ProjectType::Slurry, 1320.0, 30.0, PC, "2024-03-01"),
            // Outside the window.
            row(ProjectType::Slurry, 5280.0, 30.0, PC, "2023-12-31"),
            // Not in moratorium.
            row(ProjectType::Concrete, 5280.0, 30.0, "Construction", "2024-02-01"),
            // Imcat spelling is not counted.
            row(ProjectType::Concrete, 5280.0, 30.0, "POST-CONSTRUCTION", "2024-02-01"),
            // No moratorium date.
            row(ProjectType::Concrete, 5280.0, 30.0, PC, ""),
        ];
        let b = MileBreakdown::compute(&rows, PC, ts("2024-01-01"));
        assert_eq!(b.overlay, 2.0);
        assert_eq!(b.slurry, 0.25);
        assert_eq!(b.total, 2.25);
        assert!(!b.by_type.contains_key(&ProjectType::Concrete));
        assert_eq!(b.select(PavType::Total).value, 2.25);
    }

    #[test]
    fn absent_type_is_zero() {
        let rows = vec![row(ProjectType::Slurry, 1000.0, 30.0, PC, "2024-02-01")];
        let b = MileBreakdown::compute(&rows, PC, ts("2024-01-01"));
        assert_eq!(b.select(PavType::Overlay), AggregateResult { value: 0.0 });
        assert_eq!(b.select(PavType::Slurry).value, 0.19);
    }

    #[test]
    fn total_rounds_the_sum_not_the_parts() {
        // 0.004 + 0.004 rounds to 0.01 as a sum, 0.0 per part.
        let feet = 0.004 * FEET_PER_MILE;
        let rows = vec![
            row(ProjectType::Overlay, feet, 30.0, PC, "2024-02-01"),
            row(ProjectType::Slurry, feet, 30.0, PC, "2024-02-01"),
        ];
        let b = MileBreakdown::compute(&rows, PC, ts("2024-01-01"));
        assert_eq!(b.total, 0.01);
        assert_eq!(b.overlay, 0.0);
        assert_eq!(b.slurry, 0.0);
    }

    #[test]
    fn exact_ties_round_to_even() {
        // 660 ft is exactly 0.125 mi.
        let rows = vec![row(ProjectType::Overlay, 660.0, 30.0, PC, "2024-02-01")];
        let b = MileBreakdown::compute(&rows, PC, ts("2024-01-01"));
        assert_eq!(b.overlay, 0.12);
        assert_eq!(b.total, 0.12);
        assert_eq!(round2(0.375), 0.38);
    }

    #[test]
    fn result_serializes_as_value_object() {
        let json = serde_json::to_string(&AggregateResult { value: 1.5 }).unwrap();
        assert_eq!(json, r#"{"value":1.5}"#);
    }
}
