//! Output modes and aggregate kinds.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Dataset flavour produced from the same source extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Public open-data portal dataset.
    Sdif,
    /// Street-cut map dataset with stricter filtering.
    Imcat,
}

impl Mode {
    pub const ALL: [Mode; 2] = [Mode::Sdif, Mode::Imcat];

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Sdif => "sdif",
            Mode::Imcat => "imcat",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sdif" => Ok(Mode::Sdif),
            "imcat" => Ok(Mode::Imcat),
            other => Err(Error::InvalidArgument(format!("unknown mode: {other}"))),
        }
    }
}

/// Which mile figure an aggregate query returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PavType {
    Total,
    Overlay,
    Slurry,
}

impl PavType {
    pub fn as_str(self) -> &'static str {
        match self {
            PavType::Total => "total",
            PavType::Overlay => "overlay",
            PavType::Slurry => "slurry",
        }
    }
}

impl fmt::Display for PavType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PavType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "total" => Ok(PavType::Total),
            "overlay" => Ok(PavType::Overlay),
            "slurry" => Ok(PavType::Slurry),
            other => Err(Error::InvalidArgument(format!("unknown pav_type: {other}"))),
        }
    }
}
