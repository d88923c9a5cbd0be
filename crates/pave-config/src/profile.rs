//! Per-mode classifier profiles.
//!
//! The sdif and imcat datasets come from the same extract; everything that
//! differs between them lives here and is injected into the classifier once.

use pave_common::Mode;
use serde::{Deserialize, Serialize};

/// Behaviour switches for one output mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeProfile {
    /// Production file name inside `prod_data_dir`.
    pub file_name: String,

    /// Canonical status for completed, moratorium-protected work.
    pub moratorium_label: String,

    /// Job activities matching this pattern are dropped.
    pub exclusion_pattern: String,

    /// Work orders whose records are dropped while they have no completion date.
    #[serde(default)]
    pub require_completion_for: Vec<String>,

    /// Drop blank job activities before exclusion rather than at the final gate.
    #[serde(default)]
    pub drop_blank_activity_early: bool,

    /// Slurry records completed longer ago than this are dropped.
    #[serde(default)]
    pub slurry_max_age_years: Option<u32>,

    /// Upper-case the STATUS column on output.
    #[serde(default)]
    pub uppercase_status: bool,
}

impl ModeProfile {
    /// Built-in profile for `mode`.
    pub fn builtin(mode: Mode) -> Self {
        match mode {
            Mode::Sdif => Self {
                file_name: "sd_paving_datasd.csv".to_string(),
                moratorium_label: "Post Construction".to_string(),
                exclusion_pattern: "data entry|structure wid|patching".to_string(),
                require_completion_for: Vec::new(),
                drop_blank_activity_early: false,
                slurry_max_age_years: None,
                uppercase_status: false,
            },
            Mode::Imcat => Self {
                file_name: "sd_paving_imcat_datasd.csv".to_string(),
                moratorium_label: "Post-Construction".to_string(),
                exclusion_pattern: "data entry|mill|structure wid|patching".to_string(),
                require_completion_for: vec!["UTLY".to_string(), "TSW".to_string()],
                drop_blank_activity_early: true,
                slurry_max_age_years: Some(3),
                uppercase_status: true,
            },
        }
    }
}

/// Profiles keyed by mode.
///
/// A mode table in a config file replaces the built-in profile as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeProfiles {
    #[serde(default = "default_sdif")]
    pub sdif: ModeProfile,
    #[serde(default = "default_imcat")]
    pub imcat: ModeProfile,
}

fn default_sdif() -> ModeProfile {
    ModeProfile::builtin(Mode::Sdif)
}

fn default_imcat() -> ModeProfile {
    ModeProfile::builtin(Mode::Imcat)
}

impl Default for ModeProfiles {
    fn default() -> Self {
        Self {
            sdif: default_sdif(),
            imcat: default_imcat(),
        }
    }
}
