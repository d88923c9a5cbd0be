//! Classifier stages.
//!
//! Each stage consumes the record set and returns the next one. Order
//! matters: later stages read fields that earlier ones rewrote.

use super::matcher::Matchers;
use chrono::NaiveDateTime;
use pave_common::time::years_before;
use pave_common::{PavingRecord, ProjectType, WorkOrderRecord};
use pave_config::{Contacts, ModeProfile};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, info};

/// Utility work orders.
pub const UTILITY_WORK_ORDER: &str = "UTLY";

/// Transportation & Storm Water work orders.
pub const TSW_WORK_ORDER: &str = "TSW";

/// Status for TSW jobs whose completion date is still ahead.
pub const CONSTRUCTION_STATUS: &str = "Construction";

/// Everything a stage may read besides the records themselves.
#[derive(Debug, Clone, Copy)]
pub struct StageContext<'a> {
    pub reference: NaiveDateTime,
    pub retention_years: u32,
    pub profile: &'a ModeProfile,
    pub contacts: &'a Contacts,
    pub matchers: &'a Matchers,
}

/// Record-level stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    NormalizeStatus,
    DropIncomplete,
    ExcludeActivities,
    AssignProjectType,
    DropExpired,
    DropStaleSlurry,
    MarkCompleted,
    FlagFutureConstruction,
    AssignContacts,
    DropUnknown,
    Deduplicate,
}

impl Stage {
    pub const PIPELINE: [Stage; 11] = [
        Stage::NormalizeStatus,
        Stage::DropIncomplete,
        Stage::ExcludeActivities,
        Stage::AssignProjectType,
        Stage::DropExpired,
        Stage::DropStaleSlurry,
        Stage::MarkCompleted,
        Stage::FlagFutureConstruction,
        Stage::AssignContacts,
        Stage::DropUnknown,
        Stage::Deduplicate,
    ];

    pub fn apply(
        self,
        records: Vec<WorkOrderRecord>,
        ctx: &StageContext<'_>,
    ) -> Vec<WorkOrderRecord> {
        match self {
            Stage::NormalizeStatus => normalize_status(records, ctx),
            Stage::DropIncomplete => drop_incomplete(records, ctx),
            Stage::ExcludeActivities => exclude_activities(records, ctx),
            Stage::AssignProjectType => assign_project_type(records, ctx),
            Stage::DropExpired => drop_expired(records, ctx),
            Stage::DropStaleSlurry => drop_stale_slurry(records, ctx),
            Stage::MarkCompleted => mark_completed(records, ctx),
            Stage::FlagFutureConstruction => flag_future_construction(records, ctx),
            Stage::AssignContacts => assign_contacts(records, ctx),
            Stage::DropUnknown => drop_unknown(records),
            Stage::Deduplicate => deduplicate(records),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::NormalizeStatus => "normalize_status",
            Stage::DropIncomplete => "drop_incomplete",
            Stage::ExcludeActivities => "exclude_activities",
            Stage::AssignProjectType => "assign_project_type",
            Stage::DropExpired => "drop_expired",
            Stage::DropStaleSlurry => "drop_stale_slurry",
            Stage::MarkCompleted => "mark_completed",
            Stage::FlagFutureConstruction => "flag_future_construction",
            Stage::AssignContacts => "assign_contacts",
            Stage::DropUnknown => "drop_unknown",
            Stage::Deduplicate => "deduplicate",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rewrite every moratorium-like status to the mode's label.
pub fn normalize_status(
    mut records: Vec<WorkOrderRecord>,
    ctx: &StageContext<'_>,
) -> Vec<WorkOrderRecord> {
    let label = &ctx.profile.moratorium_label;
    let mut rewritten = 0usize;
    for r in records.iter_mut() {
        if ctx.matchers.is_moratorium(&r.wo_status) && r.wo_status != *label {
            r.wo_status.clone_from(label);
            rewritten += 1;
        }
    }
    debug!(rewritten, label = %label, "normalized moratorium statuses");
    records
}

/// Drop unfinished work on the profile's completion-required work orders,
/// then blank activities if the profile asks for it early.
pub fn drop_incomplete(
    mut records: Vec<WorkOrderRecord>,
    ctx: &StageContext<'_>,
) -> Vec<WorkOrderRecord> {
    let required = &ctx.profile.require_completion_for;
    if !required.is_empty() {
        records.retain(|r| !(r.job_end_dt.is_none() && required.iter().any(|wo| *wo == r.wo_id)));
    }
    if ctx.profile.drop_blank_activity_early {
        records.retain(|r| !r.has_blank_activity());
    }
    records
}

/// Drop records whose activity matches the exclusion pattern.
pub fn exclude_activities(
    mut records: Vec<WorkOrderRecord>,
    ctx: &StageContext<'_>,
) -> Vec<WorkOrderRecord> {
    records.retain(|r| {
        r.job_activity
            .as_deref()
            .map_or(true, |activity| !ctx.matchers.is_excluded(activity))
    });
    records
}

/// Reset the project type and derive it from the activity.
pub fn assign_project_type(
    mut records: Vec<WorkOrderRecord>,
    ctx: &StageContext<'_>,
) -> Vec<WorkOrderRecord> {
    for r in records.iter_mut() {
        r.wo_proj_type = r
            .job_activity
            .as_deref()
            .and_then(|activity| ctx.matchers.project_type(activity));
    }
    records
}

/// Keep open records and those completed after the retention cutoff.
pub fn drop_expired(
    mut records: Vec<WorkOrderRecord>,
    ctx: &StageContext<'_>,
) -> Vec<WorkOrderRecord> {
    let cutoff = years_before(ctx.reference, ctx.retention_years);
    records.retain(|r| r.job_end_dt.map_or(true, |end| end > cutoff));
    records
}

/// Drop slurry completed before the profile's slurry cutoff, if it has one.
pub fn drop_stale_slurry(
    mut records: Vec<WorkOrderRecord>,
    ctx: &StageContext<'_>,
) -> Vec<WorkOrderRecord> {
    let Some(years) = ctx.profile.slurry_max_age_years else {
        return records;
    };
    let cutoff = years_before(ctx.reference, years);
    records.retain(|r| {
        let stale = r.job_end_dt.is_some_and(|end| end < cutoff);
        !(r.wo_proj_type == Some(ProjectType::Slurry) && stale)
    });
    records
}

/// Completed work is in moratorium.
pub fn mark_completed(
    mut records: Vec<WorkOrderRecord>,
    ctx: &StageContext<'_>,
) -> Vec<WorkOrderRecord> {
    for r in records.iter_mut() {
        r.final_job_completion_state = r.job_end_dt.is_some();
        if r.final_job_completion_state {
            r.wo_status.clone_from(&ctx.profile.moratorium_label);
        }
    }
    records
}

/// TSW jobs dated after the reference are still under construction.
pub fn flag_future_construction(
    mut records: Vec<WorkOrderRecord>,
    ctx: &StageContext<'_>,
) -> Vec<WorkOrderRecord> {
    for r in records.iter_mut() {
        if r.wo_id == TSW_WORK_ORDER && r.job_end_dt.is_some_and(|end| end > ctx.reference) {
            r.wo_status = CONSTRUCTION_STATUS.to_string();
        }
    }
    records
}

/// Fill phone and project manager.
///
/// Utility and TSW work orders always get their fixed manager; other records
/// only get one by project type when the extract left it empty.
pub fn assign_contacts(
    mut records: Vec<WorkOrderRecord>,
    ctx: &StageContext<'_>,
) -> Vec<WorkOrderRecord> {
    let contacts = ctx.contacts;
    for r in records.iter_mut() {
        let utility = r.wo_id == UTILITY_WORK_ORDER;
        r.wo_pm_phone = Some(if utility {
            contacts.utility_phone.clone()
        } else {
            contacts.other_phone.clone()
        });

        if utility {
            r.wo_pm = Some(contacts.utility_pm.clone());
        } else if r.wo_id == TSW_WORK_ORDER {
            r.wo_pm = Some(contacts.tsw_pm.clone());
        } else if r.wo_pm.is_none() {
            r.wo_pm = match r.wo_proj_type {
                Some(ProjectType::Overlay | ProjectType::Concrete) => {
                    Some(contacts.overlay_concrete_pm.clone())
                }
                Some(ProjectType::Slurry) => Some(contacts.slurry_pm.clone()),
                None => None,
            };
        }
    }
    records
}

/// Drop records with no activity, project type or status.
pub fn drop_unknown(records: Vec<WorkOrderRecord>) -> Vec<WorkOrderRecord> {
    let (unknown, known): (Vec<_>, Vec<_>) = records
        .into_iter()
        .partition(|r| r.has_blank_activity() || r.wo_proj_type.is_none() || r.has_blank_status());
    info!(
        removed = unknown.len(),
        "found records with no activity, type or status"
    );
    known
}

/// Keep the most recently completed record per segment.
///
/// Records without a completion date only survive when their segment has no
/// completed record. Ties keep input order.
pub fn deduplicate(mut records: Vec<WorkOrderRecord>) -> Vec<WorkOrderRecord> {
    records.sort_by(|a, b| completion_desc_nulls_last(a.job_end_dt, b.job_end_dt));
    let mut seen = HashSet::new();
    records.retain(|r| seen.insert(r.seg_id.clone()));
    records
}

fn completion_desc_nulls_last(a: Option<NaiveDateTime>, b: Option<NaiveDateTime>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Rename to production columns, clear design dates under moratorium, and
/// apply the profile's status casing.
pub fn project(records: Vec<WorkOrderRecord>, profile: &ModeProfile) -> Vec<PavingRecord> {
    records
        .into_iter()
        .map(|r| {
            let mut row = PavingRecord::from(r);
            if row.status == profile.moratorium_label {
                row.start = None;
                row.end = None;
            }
            if profile.uppercase_status {
                row.status = row.status.to_uppercase();
            }
            row
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pave_common::time::parse_timestamp;
    use pave_common::Mode;
    use pave_config::Patterns;

    struct Fixture {
        profile: ModeProfile,
        contacts: Contacts,
        matchers: Matchers,
    }

    impl Fixture {
        fn new(mode: Mode) -> Self {
            let profile = ModeProfile::builtin(mode);
            let matchers = Matchers::new(&Patterns::default(), &profile).unwrap();
            Self {
                profile,
                contacts: Contacts::default(),
                matchers,
            }
        }

        fn ctx(&self) -> StageContext<'_> {
            StageContext {
                reference: ts("2024-06-01 00:00:00"),
                retention_years: 5,
                profile: &self.profile,
                contacts: &self.contacts,
                matchers: &self.matchers,
            }
        }
    }

    fn ts(s: &str) -> NaiveDateTime {
        parse_timestamp(s).unwrap()
    }

    fn record(seg: &str, wo: &str, activity: &str, end: Option<&str>) -> WorkOrderRecord {
        WorkOrderRecord {
            seg_id: seg.to_string(),
            wo_id: wo.to_string(),
            wo_status: "Design".to_string(),
            job_activity: Some(activity.to_string()),
            job_end_dt: end.map(ts),
            ..Default::default()
        }
    }

    #[test]
    fn normalize_status_uses_mode_label() {
        let fx = Fixture::new(Mode::Imcat);
        let mut r = record("S1", "W1", "AC Overlay", None);
        r.wo_status = "post construction".to_string();
        let out = normalize_status(vec![r], &fx.ctx());
        assert_eq!(out[0].wo_status, "Post-Construction");
    }

    #[test]
    fn drop_incomplete_only_in_imcat() {
        let records = vec![
            record("S1", "UTLY", "AC Overlay", None),
            record("S2", "TSW", "AC Overlay", None),
            record("S3", "TSW", "AC Overlay", Some("2024-01-01")),
            record("S4", "W9", "AC Overlay", None),
            record("S5", "W9", "None", None),
        ];
        let imcat = Fixture::new(Mode::Imcat);
        let kept: Vec<_> = drop_incomplete(records.clone(), &imcat.ctx())
            .into_iter()
            .map(|r| r.seg_id)
            .collect();
        assert_eq!(kept, vec!["S3", "S4"]);

        let sdif = Fixture::new(Mode::Sdif);
        assert_eq!(drop_incomplete(records, &sdif.ctx()).len(), 5);
    }

    #[test]
    fn exclusion_keeps_missing_activity() {
        let fx = Fixture::new(Mode::Sdif);
        let mut open = record("S2", "W1", "", None);
        open.job_activity = None;
        let out = exclude_activities(
            vec![record("S1", "W1", "Patching", None), open],
            &fx.ctx(),
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].seg_id, "S2");
    }

    #[test]
    fn project_type_is_reset() {
        let fx = Fixture::new(Mode::Sdif);
        let mut r = record("S1", "W1", "Sidewalk", None);
        r.wo_proj_type = Some(ProjectType::Concrete);
        let out = assign_project_type(vec![r], &fx.ctx());
        assert_eq!(out[0].wo_proj_type, None);
    }

    #[test]
    fn expired_records_dropped_open_ones_kept() {
        let fx = Fixture::new(Mode::Sdif);
        let out = drop_expired(
            vec![
                record("S1", "W1", "AC Overlay", Some("2019-05-31")),
                record("S2", "W1", "AC Overlay", Some("2019-06-01")),
                record("S3", "W1", "AC Overlay", Some("2019-06-02")),
                record("S4", "W1", "AC Overlay", None),
            ],
            &fx.ctx(),
        );
        let kept: Vec<_> = out.into_iter().map(|r| r.seg_id).collect();
        assert_eq!(kept, vec!["S3", "S4"]);
    }

    #[test]
    fn stale_slurry_only_dropped_with_cutoff() {
        let mut slurry = record("S1", "W1", "Scrub Seal", Some("2021-01-01"));
        slurry.wo_proj_type = Some(ProjectType::Slurry);
        let mut overlay = record("S2", "W1", "AC Overlay", Some("2021-01-01"));
        overlay.wo_proj_type = Some(ProjectType::Overlay);
        let records = vec![slurry, overlay];

        let imcat = Fixture::new(Mode::Imcat);
        let out = drop_stale_slurry(records.clone(), &imcat.ctx());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].seg_id, "S2");

        let sdif = Fixture::new(Mode::Sdif);
        assert_eq!(drop_stale_slurry(records, &sdif.ctx()).len(), 2);
    }

    #[test]
    fn future_tsw_is_construction_after_completion_rewrite() {
        let fx = Fixture::new(Mode::Sdif);
        let records = vec![
            record("S1", "TSW", "AC Overlay", Some("2024-09-01")),
            record("S2", "TSW", "AC Overlay", Some("2024-01-01")),
            record("S3", "W1", "AC Overlay", Some("2024-09-01")),
        ];
        let out = flag_future_construction(mark_completed(records, &fx.ctx()), &fx.ctx());
        assert!(out.iter().all(|r| r.final_job_completion_state));
        assert_eq!(out[0].wo_status, "Construction");
        assert_eq!(out[1].wo_status, "Post Construction");
        assert_eq!(out[2].wo_status, "Post Construction");
    }

    #[test]
    fn contacts_by_work_order_then_type() {
        let fx = Fixture::new(Mode::Sdif);
        let mut utility = record("S1", "UTLY", "AC Overlay", None);
        utility.wo_proj_type = Some(ProjectType::Overlay);
        let mut tsw = record("S2", "TSW", "Scrub Seal", None);
        tsw.wo_proj_type = Some(ProjectType::Slurry);
        tsw.wo_pm = Some("someone@sandiego.gov".to_string());
        let mut slurry = record("S3", "W1", "Scrub Seal", None);
        slurry.wo_proj_type = Some(ProjectType::Slurry);
        let mut preset = record("S4", "W1", "Panel Rep", None);
        preset.wo_proj_type = Some(ProjectType::Concrete);
        preset.wo_pm = Some("kept@sandiego.gov".to_string());
        let mut concrete = record("S5", "W1", "Panel Rep", None);
        concrete.wo_proj_type = Some(ProjectType::Concrete);

        let out = assign_contacts(vec![utility, tsw, slurry, preset, concrete], &fx.ctx());
        let pm: Vec<_> = out.iter().map(|r| r.wo_pm.as_deref().unwrap()).collect();
        assert_eq!(
            pm,
            vec![
                "Engineering@sandiego.gov",
                "JLahmann@sandiego.gov",
                "JJaro@sandiego.gov",
                "kept@sandiego.gov",
                "CHudson@sandiego.gov",
            ]
        );
        assert_eq!(out[0].wo_pm_phone.as_deref(), Some("858-627-3200"));
        assert!(out[1..]
            .iter()
            .all(|r| r.wo_pm_phone.as_deref() == Some("619-527-7500")));
    }

    #[test]
    fn drop_unknown_removes_blank_fields() {
        let mut typed = record("S1", "W1", "AC Overlay", None);
        typed.wo_proj_type = Some(ProjectType::Overlay);
        let mut untyped = record("S2", "W1", "Sidewalk", None);
        untyped.wo_proj_type = None;
        let mut no_status = typed.clone();
        no_status.seg_id = "S3".to_string();
        no_status.wo_status = "None".to_string();
        let mut no_activity = typed.clone();
        no_activity.seg_id = "S4".to_string();
        no_activity.job_activity = Some(String::new());

        let out = drop_unknown(vec![typed, untyped, no_status, no_activity]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].seg_id, "S1");
    }

    #[test]
    fn dedup_prefers_latest_then_dated() {
        let out = deduplicate(vec![
            record("S1", "W1", "a", None),
            record("S1", "W2", "b", Some("2023-01-01")),
            record("S1", "W3", "c", Some("2022-01-01")),
            record("S2", "W4", "d", None),
            record("S2", "W5", "e", None),
        ]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].wo_id, "W2");
        assert_eq!(out[1].wo_id, "W4");
    }

    #[test]
    fn projection_clears_dates_and_uppercases() {
        let mut r = record("S1", "W1", "AC Overlay", Some("2024-01-01"));
        r.wo_status = "Post-Construction".to_string();
        r.wo_design_start_dt = Some(ts("2023-01-01"));
        r.wo_design_end_dt = Some(ts("2023-06-01"));
        let mut open = record("S2", "W1", "AC Overlay", None);
        open.wo_design_start_dt = Some(ts("2023-01-01"));

        let imcat = ModeProfile::builtin(Mode::Imcat);
        let rows = project(vec![r.clone(), open.clone()], &imcat);
        assert_eq!(rows[0].status, "POST-CONSTRUCTION");
        assert_eq!(rows[0].start, None);
        assert_eq!(rows[0].end, None);
        assert_eq!(rows[1].status, "DESIGN");
        assert_eq!(rows[1].start, Some(ts("2023-01-01")));

        // The sdif label does not match the imcat spelling.
        let sdif = ModeProfile::builtin(Mode::Sdif);
        let rows = project(vec![r], &sdif);
        assert_eq!(rows[0].status, "Post-Construction");
        assert!(rows[0].start.is_some());
    }
}
