//! Street paving pipeline configuration loading and validation.
//!
//! This crate provides:
//! - Typed Rust structs for the pipeline configuration file
//! - Per-mode profiles capturing every sdif/imcat difference
//! - Config resolution (CLI → env → XDG → defaults)
//! - Semantic validation that reports every problem at once

pub mod error;
pub mod pipeline;
pub mod profile;
pub mod resolve;
pub mod validate;

pub use error::ConfigError;
pub use pipeline::{Contacts, Patterns, PipelineConfig};
pub use profile::{ModeProfile, ModeProfiles};
pub use resolve::{resolve_config, ConfigPaths, ConfigSource, ResolvedConfig};
pub use validate::{validate, ValidationError, ValidationResult};

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";
