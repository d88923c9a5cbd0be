//! Production file persistence.
//!
//! The production file is the only artifact downstream collaborators see, so
//! it is replaced atomically: rows are rendered in memory, written to a
//! temporary file beside the target, and renamed over it.

use chrono::NaiveDateTime;
use pave_common::time::parse_timestamp;
use pave_common::{Error, PavingRecord, ProjectType, Result, PAVING_COLUMNS};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Permission bits of a published production file.
#[cfg(unix)]
const PRODUCTION_FILE_MODE: u32 = 0o644;

/// What a successful write produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteReceipt {
    pub path: PathBuf,
    pub rows: usize,
    pub bytes: usize,
    /// Hex SHA-256 of the file contents.
    pub sha256: String,
}

/// Reads and writes production files with a fixed date layout.
#[derive(Debug, Clone)]
pub struct ProductionStore {
    date_format: String,
}

impl ProductionStore {
    pub fn new(date_format: impl Into<String>) -> Self {
        Self {
            date_format: date_format.into(),
        }
    }

    /// Render rows to CSV bytes, header first.
    pub fn render(&self, rows: &[PavingRecord]) -> Result<Vec<u8>> {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        wtr.write_record(PAVING_COLUMNS)?;
        for row in rows {
            wtr.write_record(self.fields(row))?;
        }
        wtr.into_inner().map_err(|e| Error::Io(e.into_error()))
    }

    /// Atomically replace `path` with `rows`.
    pub fn write(&self, path: &Path, rows: &[PavingRecord]) -> Result<WriteReceipt> {
        let bytes = self.render(rows)?;
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(&bytes)?;
        tmp.flush()?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            // Temp files are created 0600.
            tmp.as_file()
                .set_permissions(std::fs::Permissions::from_mode(PRODUCTION_FILE_MODE))?;
        }
        tmp.persist(path).map_err(|e| Error::Io(e.error))?;

        let receipt = WriteReceipt {
            path: path.to_path_buf(),
            rows: rows.len(),
            bytes: bytes.len(),
            sha256: sha256_hex(&bytes),
        };
        info!(
            path = %receipt.path.display(),
            rows = receipt.rows,
            bytes = receipt.bytes,
            "wrote production file"
        );
        Ok(receipt)
    }

    /// Load a production file.
    pub fn read(&self, path: &Path) -> Result<Vec<PavingRecord>> {
        let file = std::fs::File::open(path)?;
        let rows = self.read_from(file)?;
        debug!(path = %path.display(), rows = rows.len(), "read production file");
        Ok(rows)
    }

    pub fn read_from<R: Read>(&self, reader: R) -> Result<Vec<PavingRecord>> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = rdr.headers()?.clone();
        let positions: HashMap<&str, usize> =
            headers.iter().enumerate().map(|(i, h)| (h, i)).collect();
        let mut index = [0usize; PAVING_COLUMNS.len()];
        for (slot, column) in index.iter_mut().zip(PAVING_COLUMNS) {
            *slot = *positions.get(column).ok_or_else(|| Error::MissingColumn {
                column: column.to_string(),
            })?;
        }

        let mut rows = Vec::new();
        for (i, record) in rdr.records().enumerate() {
            let record = record?;
            let cells: Vec<Option<&str>> = index
                .iter()
                .map(|&pos| record.get(pos).filter(|v| !v.is_empty()))
                .collect();
            rows.push(self.parse_row(&cells, i + 1)?);
        }
        Ok(rows)
    }

    fn fields(&self, row: &PavingRecord) -> [String; PAVING_COLUMNS.len()] {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        let date = |v: &Option<NaiveDateTime>| {
            v.map(|d| d.format(&self.date_format).to_string())
                .unwrap_or_default()
        };
        let number = |v: &Option<f64>| v.map(|n| n.to_string()).unwrap_or_default();
        [
            text(&row.pve_id),
            row.seg_id.clone(),
            row.project_id.clone(),
            row.title.clone(),
            text(&row.pm),
            text(&row.pm_phone),
            date(&row.start),
            date(&row.end),
            text(&row.resident_engineer),
            date(&row.moratorium),
            row.status.clone(),
            row.project_type.map(|t| t.to_string()).unwrap_or_default(),
            number(&row.length),
            number(&row.width),
        ]
    }

    fn parse_row(&self, cells: &[Option<&str>], line: usize) -> Result<PavingRecord> {
        let text = |i: usize| cells[i].map(str::to_string);
        let date = |i: usize| -> Result<Option<NaiveDateTime>> {
            match cells[i] {
                None => Ok(None),
                Some(v) => NaiveDateTime::parse_from_str(v, &self.date_format)
                    .ok()
                    .or_else(|| parse_timestamp(v))
                    .map(Some)
                    .ok_or_else(|| Error::DateParse {
                        row: line,
                        column: PAVING_COLUMNS[i].to_string(),
                        value: v.to_string(),
                    }),
            }
        };
        let number = |i: usize| -> Result<Option<f64>> {
            match cells[i] {
                None => Ok(None),
                Some(v) => v.parse::<f64>().map(Some).map_err(|_| Error::ValueParse {
                    row: line,
                    column: PAVING_COLUMNS[i].to_string(),
                    expected: "a number",
                    value: v.to_string(),
                }),
            }
        };
        let project_type = match cells[11] {
            None => None,
            Some(v) => Some(ProjectType::parse(v).ok_or_else(|| Error::ValueParse {
                row: line,
                column: PAVING_COLUMNS[11].to_string(),
                expected: "a project type",
                value: v.to_string(),
            })?),
        };

        Ok(PavingRecord {
            pve_id: text(0),
            seg_id: text(1).unwrap_or_default(),
            project_id: text(2).unwrap_or_default(),
            title: text(3).unwrap_or_default(),
            pm: text(4),
            pm_phone: text(5),
            start: date(6)?,
            end: date(7)?,
            resident_engineer: text(8),
            moratorium: date(9)?,
            status: text(10).unwrap_or_default(),
            project_type,
            length: number(12)?,
            width: number(13)?,
        })
    }
}

/// Compute SHA-256 hex digest.
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
