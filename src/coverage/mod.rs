// src/coverage/mod.rs

//! Code-coverage instrumentation options.
//!
//! - [`settings`] reads the coverage package's project settings and rewrites
//!   the `PathsToExclude` filter.
//! - [`options`] turns those settings into the `-enableCodeCoverage` /
//!   `-coverageOptions` arguments of a stage.

pub mod options;
pub mod settings;

pub use options::{CoverageOptionsBuilder, CoverageSettings};
pub use settings::{read_exclude_paths, rewrite_project_placeholders};
