//! Config resolution: CLI → env → XDG → defaults.

use crate::error::ConfigError;
use crate::pipeline::PipelineConfig;
use crate::validate::validate;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Environment variable naming a config file.
pub const CONFIG_ENV_VAR: &str = "PAVE_CONFIG";

/// File name looked up inside the user config directory.
const USER_CONFIG_FILE: &str = "config.toml";

/// Candidate config locations, highest priority first.
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    /// `--config` on the command line.
    pub explicit: Option<PathBuf>,
    /// `PAVE_CONFIG` from the environment.
    pub env: Option<PathBuf>,
    /// `<config dir>/pave/config.toml`; used only if it exists.
    pub user: Option<PathBuf>,
}

impl ConfigPaths {
    /// Discover candidates from the CLI flag, environment and XDG config dir.
    pub fn discover(explicit: Option<&Path>) -> Self {
        Self {
            explicit: explicit.map(Path::to_path_buf),
            env: std::env::var_os(CONFIG_ENV_VAR)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            user: dirs::config_dir().map(|d| d.join("pave").join(USER_CONFIG_FILE)),
        }
    }
}

/// Where the effective configuration came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum ConfigSource {
    Explicit(PathBuf),
    Env(PathBuf),
    User(PathBuf),
    Defaults,
}

/// A validated configuration plus its provenance.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedConfig {
    pub source: ConfigSource,
    pub config: PipelineConfig,
}

/// Resolve, apply the prod-dir override, and validate.
///
/// Explicit and env paths must exist; the user path is optional.
pub fn resolve_config(
    paths: &ConfigPaths,
    prod_dir_override: Option<&Path>,
) -> Result<ResolvedConfig, ConfigError> {
    let (source, mut config) = if let Some(path) = &paths.explicit {
        (ConfigSource::Explicit(path.clone()), PipelineConfig::load(path)?)
    } else if let Some(path) = &paths.env {
        (ConfigSource::Env(path.clone()), PipelineConfig::load(path)?)
    } else if let Some(path) = paths.user.as_ref().filter(|p| p.exists()) {
        (ConfigSource::User(path.clone()), PipelineConfig::load(path)?)
    } else {
        (ConfigSource::Defaults, PipelineConfig::default())
    };

    if let Some(dir) = prod_dir_override {
        config.prod_data_dir = dir.to_path_buf();
    }

    validate(&config).map_err(ConfigError::Invalid)?;
    Ok(ResolvedConfig { source, config })
}
