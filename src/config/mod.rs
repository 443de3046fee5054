// src/config/mod.rs

//! Configuration loading and validation for unitypipe.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk and apply overrides (`loader.rs`).
//! - Validate required values (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, load_with_overrides};
pub use model::{
    BuildSection, ConfigFile, ConfigOverrides, DisplaySection, LogScanSection, PipelineSection,
    RawConfigFile, ReportsSection, UnitySection,
};
