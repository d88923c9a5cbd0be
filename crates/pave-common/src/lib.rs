//! Street paving pipeline common types, IDs, and errors.
//!
//! This crate provides foundational types shared across the pave crates:
//! - Output modes and aggregate kinds
//! - Raw work-order records and projected production rows
//! - Timestamp parsing and calendar arithmetic
//! - Run identifiers and schema versioning
//! - The common error type

pub mod error;
pub mod id;
pub mod mode;
pub mod record;
pub mod schema;
pub mod time;

pub use error::{Error, Result};
pub use id::RunId;
pub use mode::{Mode, PavType};
pub use record::{is_blank, PavingRecord, ProjectType, WorkOrderRecord, PAVING_COLUMNS};
pub use schema::{DEFAULT_DATE_FORMAT, SCHEMA_VERSION};
