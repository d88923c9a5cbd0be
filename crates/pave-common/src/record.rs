//! Work-order records and projected production rows.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Paving treatment category assigned from the job activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProjectType {
    Concrete,
    Slurry,
    Overlay,
}

impl ProjectType {
    pub fn as_str(self) -> &'static str {
        match self {
            ProjectType::Concrete => "Concrete",
            ProjectType::Slurry => "Slurry",
            ProjectType::Overlay => "Overlay",
        }
    }

    /// Parse the exact label written to production files.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Concrete" => Some(ProjectType::Concrete),
            "Slurry" => Some(ProjectType::Slurry),
            "Overlay" => Some(ProjectType::Overlay),
            _ => None,
        }
    }
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// True for null, empty, or the literal `None` left behind by upstream string coercion.
pub fn is_blank(value: Option<&str>) -> bool {
    match value {
        None => true,
        Some(v) => v.is_empty() || v == "None",
    }
}

/// One row of the raw work-order extract after type coercion.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WorkOrderRecord {
    pub pve_id: Option<String>,
    pub seg_id: String,
    pub rd_seg_id: String,
    pub wo_id: String,
    pub wo_name: String,
    pub seg_func_class: String,
    pub wo_status: String,
    pub wo_proj_type: Option<ProjectType>,
    pub job_activity: Option<String>,
    pub job_completed_cbox: bool,
    /// Job completion date; becomes the MORATORIUM column.
    pub job_end_dt: Option<NaiveDateTime>,
    pub wo_design_start_dt: Option<NaiveDateTime>,
    pub wo_design_end_dt: Option<NaiveDateTime>,
    pub wo_resident_engineer: Option<String>,
    pub wo_pm: Option<String>,
    pub wo_pm_phone: Option<String>,
    pub seg_length_ft: Option<f64>,
    pub seg_width_ft: Option<f64>,
    pub final_job_completion_state: bool,
}

impl WorkOrderRecord {
    pub fn has_blank_activity(&self) -> bool {
        is_blank(self.job_activity.as_deref())
    }

    pub fn has_blank_status(&self) -> bool {
        is_blank(Some(self.wo_status.as_str()))
    }
}

/// Production file column names, in output order.
pub const PAVING_COLUMNS: [&str; 14] = [
    "PVE_ID",
    "SEG_ID",
    "PROJECTID",
    "TITLE",
    "PM",
    "PM_PHONE",
    "START",
    "END",
    "RESIDENT_ENGINEER",
    "MORATORIUM",
    "STATUS",
    "TYPE",
    "LENGTH",
    "WIDTH",
];

/// One row of a production file.
#[derive(Debug, Clone, PartialEq)]
pub struct PavingRecord {
    pub pve_id: Option<String>,
    pub seg_id: String,
    pub project_id: String,
    pub title: String,
    pub pm: Option<String>,
    pub pm_phone: Option<String>,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    pub resident_engineer: Option<String>,
    pub moratorium: Option<NaiveDateTime>,
    pub status: String,
    pub project_type: Option<ProjectType>,
    pub length: Option<f64>,
    pub width: Option<f64>,
}

impl From<WorkOrderRecord> for PavingRecord {
    fn from(r: WorkOrderRecord) -> Self {
        PavingRecord {
            pve_id: r.pve_id,
            seg_id: r.seg_id,
            project_id: r.wo_id,
            title: r.wo_name,
            pm: r.wo_pm,
            pm_phone: r.wo_pm_phone,
            start: r.wo_design_start_dt,
            end: r.wo_design_end_dt,
            resident_engineer: r.wo_resident_engineer,
            moratorium: r.job_end_dt,
            status: r.wo_status,
            project_type: r.wo_proj_type,
            length: r.seg_length_ft,
            width: r.seg_width_ft,
        }
    }
}
