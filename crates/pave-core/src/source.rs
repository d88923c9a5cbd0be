//! Raw work-order extracts.
//!
//! The query against the streets database runs elsewhere; what arrives here is
//! its result set as a delimited file with the source column names as header.
//! Reading it also performs type coercion: text columns become strings, the
//! completion checkbox a boolean, dates timestamps, lengths numbers. A value
//! that cannot be coerced fails the whole run.

use chrono::NaiveDateTime;
use pave_common::time::parse_timestamp;
use pave_common::{Error, ProjectType, Result, WorkOrderRecord};
use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Columns that must be present in every extract.
pub const REQUIRED_COLUMNS: [&str; 4] = ["seg_id", "wo_id", "wo_status", "job_activity"];

/// Anything that can hand the classifier a batch of raw records.
pub trait RecordSource {
    /// Read and coerce every record.
    fn fetch(&mut self) -> Result<Vec<WorkOrderRecord>>;

    /// Short description for logs.
    fn describe(&self) -> String;
}

/// File-backed extract.
#[derive(Debug, Clone)]
pub struct CsvExtract {
    path: PathBuf,
}

impl CsvExtract {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSource for CsvExtract {
    fn fetch(&mut self) -> Result<Vec<WorkOrderRecord>> {
        let file = std::fs::File::open(&self.path)?;
        let records = read_extract(file)?;
        info!(path = %self.path.display(), rows = records.len(), "read extract");
        Ok(records)
    }

    fn describe(&self) -> String {
        format!("csv:{}", self.path.display())
    }
}

/// In-memory source, mostly for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    records: Vec<WorkOrderRecord>,
}

impl MemorySource {
    pub fn new(records: Vec<WorkOrderRecord>) -> Self {
        Self { records }
    }
}

impl RecordSource for MemorySource {
    fn fetch(&mut self) -> Result<Vec<WorkOrderRecord>> {
        Ok(self.records.clone())
    }

    fn describe(&self) -> String {
        format!("memory:{} records", self.records.len())
    }
}

/// Parse and coerce an extract from any reader.
pub fn read_extract<R: Read>(reader: R) -> Result<Vec<WorkOrderRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(false)
        .from_reader(reader);

    let columns = ColumnIndex::new(rdr.headers()?)?;
    let mut records = Vec::new();
    for (i, row) in rdr.records().enumerate() {
        let row = row?;
        records.push(columns.coerce(&row, i + 1)?);
    }
    debug!(rows = records.len(), "coerced extract rows");
    Ok(records)
}

/// Header name → position, checked for the required columns.
struct ColumnIndex {
    positions: HashMap<String, usize>,
}

impl ColumnIndex {
    fn new(headers: &csv::StringRecord) -> Result<Self> {
        let positions: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name.to_string(), i))
            .collect();
        for column in REQUIRED_COLUMNS {
            if !positions.contains_key(column) {
                return Err(Error::MissingColumn {
                    column: column.to_string(),
                });
            }
        }
        Ok(Self { positions })
    }

    /// Cell text, `None` when the column is absent or the cell is empty.
    fn cell<'r>(&self, row: &'r csv::StringRecord, column: &str) -> Option<&'r str> {
        self.positions
            .get(column)
            .and_then(|&i| row.get(i))
            .filter(|v| !v.is_empty())
    }

    fn text(&self, row: &csv::StringRecord, column: &str) -> Option<String> {
        self.cell(row, column).map(str::to_string)
    }

    fn timestamp(
        &self,
        row: &csv::StringRecord,
        column: &str,
        line: usize,
    ) -> Result<Option<NaiveDateTime>> {
        match self.cell(row, column) {
            None => Ok(None),
            Some(v) => parse_timestamp(v).map(Some).ok_or_else(|| Error::DateParse {
                row: line,
                column: column.to_string(),
                value: v.to_string(),
            }),
        }
    }

    fn number(&self, row: &csv::StringRecord, column: &str, line: usize) -> Result<Option<f64>> {
        match self.cell(row, column) {
            None => Ok(None),
            Some(v) => v.parse::<f64>().map(Some).map_err(|_| Error::ValueParse {
                row: line,
                column: column.to_string(),
                expected: "a number",
                value: v.to_string(),
            }),
        }
    }

    fn flag(&self, row: &csv::StringRecord, column: &str, line: usize) -> Result<bool> {
        match self.cell(row, column) {
            None => Ok(false),
            Some(v) => parse_flag(v).ok_or_else(|| Error::ValueParse {
                row: line,
                column: column.to_string(),
                expected: "a boolean",
                value: v.to_string(),
            }),
        }
    }

    fn coerce(&self, row: &csv::StringRecord, line: usize) -> Result<WorkOrderRecord> {
        let string = |column: &str| self.text(row, column).unwrap_or_default();
        Ok(WorkOrderRecord {
            pve_id: self.text(row, "pve_id"),
            seg_id: string("seg_id"),
            rd_seg_id: string("rd_seg_id"),
            wo_id: string("wo_id"),
            wo_name: string("wo_name"),
            seg_func_class: string("seg_func_class"),
            wo_status: string("wo_status"),
            wo_proj_type: self.cell(row, "wo_proj_type").and_then(ProjectType::parse),
            job_activity: self.text(row, "job_activity"),
            job_completed_cbox: self.flag(row, "job_completed_cbox", line)?,
            job_end_dt: self.timestamp(row, "job_end_dt", line)?,
            wo_design_start_dt: self.timestamp(row, "wo_design_start_dt", line)?,
            wo_design_end_dt: self.timestamp(row, "wo_design_end_dt", line)?,
            wo_resident_engineer: self.text(row, "wo_resident_engineer"),
            wo_pm: self.text(row, "wo_pm"),
            wo_pm_phone: self.text(row, "wo_pm_phone"),
            seg_length_ft: self.number(row, "seg_length_ft", line)?,
            seg_width_ft: self.number(row, "seg_width_ft", line)?,
            final_job_completion_state: false,
        })
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "t" | "yes" | "y" => Some(true),
        "0" | "false" | "f" | "no" | "n" => Some(false),
        _ => None,
    }
}
