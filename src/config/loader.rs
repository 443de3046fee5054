// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{ConfigFile, ConfigOverrides, RawConfigFile};
use crate::errors::Result;

/// Load a configuration file and return the raw, unvalidated `RawConfigFile`.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let contents = fs::read_to_string(path.as_ref())?;
    let config: RawConfigFile = toml::from_str(&contents)?;
    Ok(config)
}

/// Load a configuration file and validate it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    load_with_overrides(path, &ConfigOverrides::default())
}

/// Load a configuration file, apply CLI/environment overrides, then validate.
///
/// Overrides are applied first so that, for example, a branch supplied by
/// the CI job can satisfy validation even when the file leaves it out.
pub fn load_with_overrides(
    path: impl AsRef<Path>,
    overrides: &ConfigOverrides,
) -> Result<ConfigFile> {
    let mut raw_config = load_from_path(&path)?;
    raw_config.apply_overrides(overrides);
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Default config location: `Unitypipe.toml` in the working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Unitypipe.toml")
}
