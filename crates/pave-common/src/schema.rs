//! Schema versioning and output format constants.

/// Current schema version for JSON run summaries.
///
/// Follows semver: MAJOR.MINOR.PATCH
/// - MAJOR: Breaking changes (field removals, type changes)
/// - MINOR: Additive changes (new optional fields)
/// - PATCH: Bug fixes, documentation
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Timestamp format used for date columns in production files.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
