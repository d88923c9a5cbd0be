//! Pavement record classifier.
//!
//! Turns a raw work-order extract into the cleaned production rows for one
//! mode. The record-level stages live in [`stages`]; this module wires them
//! together, keeps per-stage accounting, and applies the final projection.

pub mod matcher;
pub mod stages;

pub use matcher::Matchers;
pub use stages::{Stage, StageContext};

use chrono::NaiveDateTime;
use pave_common::{Mode, PavingRecord, Result, WorkOrderRecord};
use pave_config::{Contacts, ModeProfile, PipelineConfig};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Row counts around one stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageStat {
    pub stage: Stage,
    pub rows_before: usize,
    pub rows_after: usize,
}

impl StageStat {
    pub fn removed(&self) -> usize {
        self.rows_before.saturating_sub(self.rows_after)
    }
}

/// Output of a classifier run, before persistence.
#[derive(Debug, Clone)]
pub struct Classification {
    pub mode: Mode,
    pub reference: NaiveDateTime,
    pub rows_in: usize,
    pub stages: Vec<StageStat>,
    pub rows: Vec<PavingRecord>,
}

/// Classifier for one mode, with its patterns compiled.
#[derive(Debug, Clone)]
pub struct Classifier {
    mode: Mode,
    retention_years: u32,
    profile: ModeProfile,
    contacts: Contacts,
    matchers: Matchers,
}

impl Classifier {
    pub fn new(config: &PipelineConfig, mode: Mode) -> Result<Self> {
        let profile = config.profile(mode).clone();
        let matchers = Matchers::new(&config.patterns, &profile)?;
        Ok(Self {
            mode,
            retention_years: config.retention_years,
            profile,
            contacts: config.contacts.clone(),
            matchers,
        })
    }

    pub fn profile(&self) -> &ModeProfile {
        &self.profile
    }

    fn context(&self, reference: NaiveDateTime) -> StageContext<'_> {
        StageContext {
            reference,
            retention_years: self.retention_years,
            profile: &self.profile,
            contacts: &self.contacts,
            matchers: &self.matchers,
        }
    }

    /// Run the record-level stages.
    ///
    /// Feeding the result back in with the same reference returns it unchanged.
    pub fn classify_records(
        &self,
        records: Vec<WorkOrderRecord>,
        reference: NaiveDateTime,
    ) -> (Vec<WorkOrderRecord>, Vec<StageStat>) {
        let ctx = self.context(reference);
        let mut stats = Vec::with_capacity(Stage::PIPELINE.len());
        let mut records = records;
        for stage in Stage::PIPELINE {
            let rows_before = records.len();
            records = stage.apply(records, &ctx);
            let stat = StageStat {
                stage,
                rows_before,
                rows_after: records.len(),
            };
            debug!(
                mode = %self.mode,
                stage = %stage,
                removed = stat.removed(),
                remaining = stat.rows_after,
                "stage complete"
            );
            stats.push(stat);
        }
        (records, stats)
    }

    /// Full classification: record stages then projection to production rows.
    pub fn classify(
        &self,
        records: Vec<WorkOrderRecord>,
        reference: NaiveDateTime,
    ) -> Classification {
        let rows_in = records.len();
        let (records, stages) = self.classify_records(records, reference);
        let rows = stages::project(records, &self.profile);
        info!(
            mode = %self.mode,
            rows_in,
            rows_out = rows.len(),
            "classified paving records"
        );
        Classification {
            mode: self.mode,
            reference,
            rows_in,
            stages,
            rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pave_common::time::parse_timestamp;
    use pave_common::ProjectType;

    fn ts(s: &str) -> NaiveDateTime {
        parse_timestamp(s).unwrap()
    }

    fn record(seg: &str, wo: &str, activity: Option<&str>, end: Option<&str>) -> WorkOrderRecord {
        WorkOrderRecord {
            seg_id: seg.to_string(),
            wo_id: wo.to_string(),
            wo_status: "In Construction".to_string(),
            job_activity: activity.map(str::to_string),
            job_end_dt: end.map(ts),
            ..Default::default()
        }
    }

    fn classifier(mode: Mode) -> Classifier {
        Classifier::new(&PipelineConfig::default(), mode).unwrap()
    }

    #[test]
    fn open_utility_overlay_is_retained() {
        let out = classifier(Mode::Sdif).classify(
            vec![record("S1", "UTLY", Some("AC Overlay"), None)],
            ts("2024-06-01"),
        );
        assert_eq!(out.rows.len(), 1);
        let row = &out.rows[0];
        assert_eq!(row.project_type, Some(ProjectType::Overlay));
        assert_eq!(row.pm_phone.as_deref(), Some("858-627-3200"));
        assert_eq!(row.pm.as_deref(), Some("Engineering@sandiego.gov"));
        assert_eq!(row.status, "In Construction");
    }

    #[test]
    fn dated_record_wins_dedup() {
        let out = classifier(Mode::Sdif).classify(
            vec![
                record("S1", "W1", Some("AC Overlay"), None),
                record("S1", "W2", Some("AC Overlay"), Some("2023-01-01")),
            ],
            ts("2024-06-01"),
        );
        assert_eq!(out.rows.len(), 1);
        assert_eq!(out.rows[0].project_id, "W2");
        assert_eq!(out.rows[0].moratorium, Some(ts("2023-01-01")));
        assert_eq!(out.rows[0].status, "Post Construction");
    }

    #[test]
    fn stats_cover_every_stage() {
        let out = classifier(Mode::Imcat).classify(
            vec![
                record("S1", "UTLY", Some("AC Overlay"), None),
                record("S2", "W1", Some("Data Entry"), None),
                record("S3", "W1", Some("Sidewalk"), None),
                record("S4", "W1", Some("Scrub Seal"), Some("2020-01-01")),
                record("S5", "W1", Some("AC Overlay"), Some("2024-01-01")),
            ],
            ts("2024-06-01"),
        );
        assert_eq!(out.rows_in, 5);
        assert_eq!(out.stages.len(), Stage::PIPELINE.len());
        let removed = |stage: Stage| {
            out.stages
                .iter()
                .find(|s| s.stage == stage)
                .map(StageStat::removed)
                .unwrap()
        };
        assert_eq!(removed(Stage::DropIncomplete), 1);
        assert_eq!(removed(Stage::ExcludeActivities), 1);
        assert_eq!(removed(Stage::DropStaleSlurry), 1);
        assert_eq!(removed(Stage::DropUnknown), 1);
        assert_eq!(out.rows.len(), 1);
        assert_eq!(out.rows[0].status, "POST-CONSTRUCTION");
    }

    #[test]
    fn empty_input_is_fine() {
        let out = classifier(Mode::Sdif).classify(Vec::new(), ts("2024-06-01"));
        assert!(out.rows.is_empty());
        assert!(out.stages.iter().all(|s| s.removed() == 0));
    }

    #[test]
    fn classify_records_is_idempotent() {
        let c = classifier(Mode::Sdif);
        let reference = ts("2024-06-01");
        let input = vec![
            record("S1", "TSW", Some("AC Overlay"), Some("2024-09-01")),
            record("S1", "TSW", Some("AC Overlay"), Some("2024-01-01")),
            record("S2", "W1", Some("Scrub Seal"), None),
            record("S3", "UTLY", Some("Panel Rep"), Some("2022-03-01")),
        ];
        let (once, _) = c.classify_records(input, reference);
        let (twice, _) = c.classify_records(once.clone(), reference);
        assert_eq!(once, twice);
    }
}
