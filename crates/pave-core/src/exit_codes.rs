//! Exit codes for the `pave` CLI.
//!
//! Exit codes communicate operation outcome without requiring output parsing.
//! The external scheduler treats any non-zero code as a failed task.

use pave_common::Error;

/// Exit codes for pave operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Command completed
    Clean = 0,

    /// Configuration could not be loaded or failed validation
    ConfigError = 10,

    /// Extract or production file is malformed
    InputError = 11,

    /// Unknown mode, aggregate kind, or unparseable date argument
    InvalidArgument = 12,

    /// I/O error
    IoError = 13,

    /// Internal/unknown error
    InternalError = 99,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Check if this exit code indicates success.
    pub fn is_success(self) -> bool {
        matches!(self, ExitCode::Clean)
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl From<&Error> for ExitCode {
    fn from(err: &Error) -> Self {
        match err {
            Error::Config(_) | Error::Validation(_) => ExitCode::ConfigError,
            Error::MissingColumn { .. }
            | Error::DateParse { .. }
            | Error::ValueParse { .. }
            | Error::Csv(_) => ExitCode::InputError,
            Error::InvalidArgument(_) => ExitCode::InvalidArgument,
            Error::Io(_) => ExitCode::IoError,
            Error::Json(_) => ExitCode::InternalError,
        }
    }
}
