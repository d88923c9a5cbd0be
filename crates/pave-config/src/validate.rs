//! Semantic validation of a loaded configuration.

use crate::pipeline::PipelineConfig;
use crate::profile::ModeProfile;
use chrono::format::{Item, StrftimeItems};
use pave_common::Mode;
use regex::RegexBuilder;
use std::fmt;

/// A single validation problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field, e.g. `modes.imcat.exclusion_pattern`.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// Upper bound for every year-count setting.
pub const MAX_AGE_YEARS: u32 = 100;

/// Check every field and return all problems found.
pub fn validate(config: &PipelineConfig) -> ValidationResult {
    let mut errors = Vec::new();

    if config.date_format.trim().is_empty() {
        errors.push(ValidationError::new("date_format", "must not be empty"));
    } else if StrftimeItems::new(&config.date_format).any(|item| matches!(item, Item::Error)) {
        errors.push(ValidationError::new(
            "date_format",
            "not a valid strftime layout",
        ));
    }
    check_years(&mut errors, "retention_years", config.retention_years);
    if config.aggregate_status.trim().is_empty() {
        errors.push(ValidationError::new("aggregate_status", "must not be empty"));
    }

    check_pattern(&mut errors, "patterns.moratorium", &config.patterns.moratorium);
    check_pattern(&mut errors, "patterns.concrete", &config.patterns.concrete);
    check_pattern(&mut errors, "patterns.slurry", &config.patterns.slurry);
    check_pattern(&mut errors, "patterns.overlay", &config.patterns.overlay);

    for mode in Mode::ALL {
        check_profile(&mut errors, mode, config.profile(mode));
    }

    if config.modes.sdif.file_name == config.modes.imcat.file_name {
        errors.push(ValidationError::new(
            "modes.imcat.file_name",
            "must differ from modes.sdif.file_name",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_profile(errors: &mut Vec<ValidationError>, mode: Mode, profile: &ModeProfile) {
    let field = |name: &str| format!("modes.{mode}.{name}");

    let file_name = profile.file_name.trim();
    if file_name.is_empty() {
        errors.push(ValidationError::new(field("file_name"), "must not be empty"));
    } else if file_name.contains('/') || file_name.contains('\\') {
        errors.push(ValidationError::new(
            field("file_name"),
            "must be a bare file name without path separators",
        ));
    }
    if profile.moratorium_label.trim().is_empty() {
        errors.push(ValidationError::new(
            field("moratorium_label"),
            "must not be empty",
        ));
    }
    check_pattern(errors, &field("exclusion_pattern"), &profile.exclusion_pattern);
    if let Some(years) = profile.slurry_max_age_years {
        check_years(errors, &field("slurry_max_age_years"), years);
    }
}

fn check_years(errors: &mut Vec<ValidationError>, field: &str, years: u32) {
    if !(1..=MAX_AGE_YEARS).contains(&years) {
        errors.push(ValidationError::new(
            field,
            format!("must be between 1 and {MAX_AGE_YEARS}"),
        ));
    }
}

fn check_pattern(errors: &mut Vec<ValidationError>, field: &str, pattern: &str) {
    if pattern.is_empty() {
        errors.push(ValidationError::new(field, "must not be empty"));
        return;
    }
    if let Err(e) = RegexBuilder::new(pattern).case_insensitive(true).build() {
        errors.push(ValidationError::new(field, format!("invalid regex: {e}")));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(validate(&PipelineConfig::default()), Ok(()));
    }

    #[test]
    fn reports_every_problem() {
        let mut config = PipelineConfig::default();
        config.retention_years = 0;
        config.patterns.slurry = "scrub seal|(".to_string();
        config.modes.imcat.file_name = "../escape.csv".to_string();
        config.modes.sdif.slurry_max_age_years = Some(0);

        let errors = validate(&config).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"retention_years"));
        assert!(fields.contains(&"patterns.slurry"));
        assert!(fields.contains(&"modes.imcat.file_name"));
        assert!(fields.contains(&"modes.sdif.slurry_max_age_years"));
    }

    #[test]
    fn year_counts_are_bounded() {
        let mut config = PipelineConfig::default();
        config.retention_years = 4_000_000;
        config.modes.imcat.slurry_max_age_years = Some(MAX_AGE_YEARS + 1);
        let errors = validate(&config).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["retention_years", "modes.imcat.slurry_max_age_years"]
        );

        config.retention_years = MAX_AGE_YEARS;
        config.modes.imcat.slurry_max_age_years = Some(MAX_AGE_YEARS);
        assert_eq!(validate(&config), Ok(()));
    }

    #[test]
    fn bad_date_format_rejected() {
        let mut config = PipelineConfig::default();
        config.date_format = "%Y-%m-%d %Q".to_string();
        let errors = validate(&config).unwrap_err();
        assert_eq!(errors[0].field, "date_format");
    }

    #[test]
    fn duplicate_file_names_rejected() {
        let mut config = PipelineConfig::default();
        config.modes.imcat.file_name = config.modes.sdif.file_name.clone();
        let errors = validate(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "modes.imcat.file_name");
    }

    #[test]
    fn error_display_includes_field() {
        let err = ValidationError::new("date_format", "must not be empty");
        assert_eq!(err.to_string(), "date_format: must not be empty");
    }
}
