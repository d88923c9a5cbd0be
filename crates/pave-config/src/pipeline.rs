//! Pipeline configuration types.
//!
//! Every field has a default, so a config file only needs to name what it
//! overrides. An empty file is a valid configuration.

use crate::error::ConfigError;
use crate::profile::{ModeProfile, ModeProfiles};
use crate::CONFIG_SCHEMA_VERSION;
use pave_common::{Mode, DEFAULT_DATE_FORMAT};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Complete pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub schema_version: String,

    /// Directory the production files are written to.
    pub prod_data_dir: PathBuf,

    /// strftime layout for date columns in production files.
    pub date_format: String,

    /// Completed records older than this many years are dropped.
    pub retention_years: u32,

    /// Status the mile aggregator counts as paved, independent of mode.
    pub aggregate_status: String,

    pub patterns: Patterns,

    pub contacts: Contacts,

    pub modes: ModeProfiles,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            schema_version: CONFIG_SCHEMA_VERSION.to_string(),
            prod_data_dir: PathBuf::from("data/prod"),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            retention_years: 5,
            aggregate_status: "Post Construction".to_string(),
            patterns: Patterns::default(),
            contacts: Contacts::default(),
            modes: ModeProfiles::default(),
        }
    }
}

impl PipelineConfig {
    /// Profile for the given mode.
    pub fn profile(&self, mode: Mode) -> &ModeProfile {
        match mode {
            Mode::Sdif => &self.modes.sdif,
            Mode::Imcat => &self.modes.imcat,
        }
    }

    /// Where the production file for `mode` lives.
    pub fn production_path(&self, mode: Mode) -> PathBuf {
        self.prod_data_dir.join(&self.profile(mode).file_name)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load a config file, choosing the parser from the extension.
    ///
    /// Does not validate; see [`crate::validate`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_str(&text),
            Some("json") => Self::from_json_str(&text),
            _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

/// Case-insensitive regular expressions used to classify records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Patterns {
    /// Statuses rewritten to the mode's moratorium label.
    pub moratorium: String,
    pub concrete: String,
    pub slurry: String,
    pub overlay: String,
}

impl Default for Patterns {
    fn default() -> Self {
        Self {
            moratorium: "post construction|moratorium|post-construction".to_string(),
            concrete: "panel rep|pcc - reconstruc".to_string(),
            slurry: "surface treatment|scrub seal|cape seal|central mix".to_string(),
            overlay: "resurfacing|overlay|ac overlay|mill|ac - overlay|ac - ac overlay|ac - reconstruct|ac inlay"
                .to_string(),
        }
    }
}

/// Phone numbers and project-manager addresses published with each record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Contacts {
    pub utility_phone: String,
    pub other_phone: String,
    pub utility_pm: String,
    pub tsw_pm: String,
    pub overlay_concrete_pm: String,
    pub slurry_pm: String,
}

impl Default for Contacts {
    fn default() -> Self {
        Self {
            utility_phone: "858-627-3200".to_string(),
            other_phone: "619-527-7500".to_string(),
            utility_pm: "Engineering@sandiego.gov".to_string(),
            tsw_pm: "JLahmann@sandiego.gov".to_string(),
            overlay_concrete_pm: "CHudson@sandiego.gov".to_string(),
            slurry_pm: "JJaro@sandiego.gov".to_string(),
        }
    }
}
