//! Run summaries written beside each production file.

use crate::classify::{Classification, StageStat};
use crate::store::WriteReceipt;
use pave_common::{Mode, Result, RunId, SCHEMA_VERSION};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Suffix appended to the production file name.
const SUMMARY_SUFFIX: &str = ".summary.json";

/// What one classify run did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub schema_version: String,
    pub run_id: RunId,
    pub mode: Mode,
    /// Logical execution timestamp the age rules were evaluated against.
    pub reference_date: String,
    pub rows_in: usize,
    pub rows_out: usize,
    pub stages: Vec<StageSummary>,
    pub output_path: PathBuf,
    pub output_sha256: String,
    pub written_at: String,
}

/// Per-stage removal count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageSummary {
    pub stage: String,
    pub removed: usize,
}

impl From<&StageStat> for StageSummary {
    fn from(stat: &StageStat) -> Self {
        Self {
            stage: stat.stage.to_string(),
            removed: stat.removed(),
        }
    }
}

impl RunSummary {
    pub fn new(classification: &Classification, receipt: &WriteReceipt) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            run_id: RunId::new(),
            mode: classification.mode,
            reference_date: classification
                .reference
                .format("%Y-%m-%dT%H:%M:%S")
                .to_string(),
            rows_in: classification.rows_in,
            rows_out: receipt.rows,
            stages: classification.stages.iter().map(StageSummary::from).collect(),
            output_path: receipt.path.clone(),
            output_sha256: receipt.sha256.clone(),
            written_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Total records removed across all stages.
    pub fn removed(&self) -> usize {
        self.stages.iter().map(|s| s.removed).sum()
    }

    /// `<production file>.summary.json`
    pub fn path_for(production_path: &Path) -> PathBuf {
        let mut name = production_path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(SUMMARY_SUFFIX);
        production_path.with_file_name(name)
    }

    /// Write the summary atomically.
    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_vec_pretty(self)?;
        let tmp_path = path.with_extension("json.tmp");
        {
            let mut file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&tmp_path)?;
            file.write_all(&json)?;
            file.flush()?;
        }
        fs::rename(tmp_path, path)?;
        debug!(path = %path.display(), "run summary written");
        Ok(())
    }

    pub fn read(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}
