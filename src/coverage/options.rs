// src/coverage/options.rs

//! Coverage-argument synthesis per stage.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::coverage::settings::read_exclude_paths;
use crate::errors::Result;
use crate::fs::FileSystem;
use crate::project::find_assembly_filter;
use crate::types::Stage;

/// Static include filter applied to every instrumented test run.
pub const STATIC_PATH_FILTER: &str = "+Assets/Scripts/**";

/// Inputs of the `-coverageOptions` value for a test run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageSettings {
    /// Scripts assembly name, `None` when the project has no assembly definition.
    pub assembly_filter: Option<String>,
    pub source_path: PathBuf,
    pub static_path_filter: String,
    /// Already-rewritten exclusion filters, `None` when not configured.
    pub exclude_paths: Option<String>,
}

impl CoverageSettings {
    /// Collect settings from a project checkout.
    ///
    /// Fails only when the coverage settings file exists but is not JSON.
    pub fn load(fs: &dyn FileSystem, project_dir: &Path) -> Result<Self> {
        Ok(Self {
            assembly_filter: find_assembly_filter(fs, project_dir),
            source_path: project_dir.to_path_buf(),
            static_path_filter: STATIC_PATH_FILTER.to_string(),
            exclude_paths: read_exclude_paths(fs, project_dir)?,
        })
    }

    /// `[assemblyFilters:+<name>;]sourcePaths:<dir>;pathFilters:<filter>[,<excludes>]`
    ///
    /// The `assemblyFilters` segment is omitted entirely when the project has
    /// no assembly definition.
    pub fn options_value(&self) -> String {
        let mut segments = Vec::with_capacity(3);

        if let Some(assembly) = &self.assembly_filter {
            segments.push(format!("assemblyFilters:+{assembly}"));
        }
        segments.push(format!("sourcePaths:{}", self.source_path.display()));

        let mut path_filters = format!("pathFilters:{}", self.static_path_filter);
        if let Some(exclude) = self.exclude_paths.as_deref().filter(|e| !e.is_empty()) {
            path_filters.push(',');
            path_filters.push_str(exclude);
        }
        segments.push(path_filters);

        segments.join(";")
    }
}

/// Fixed option set for the aggregation stage.
pub fn report_options_value(assembly_filter: Option<&str>) -> String {
    let mut segments = vec![
        "generateHtmlReport".to_string(),
        "generateBadgeReport".to_string(),
    ];
    if let Some(assembly) = assembly_filter {
        segments.push(format!("assemblyFilters:+{assembly}"));
    }
    segments.join(";")
}

/// Builds the coverage part of a stage's command line.
#[derive(Debug)]
pub struct CoverageOptionsBuilder<'a> {
    fs: &'a dyn FileSystem,
    project_dir: &'a Path,
    results_dir: PathBuf,
}

impl<'a> CoverageOptionsBuilder<'a> {
    pub fn new(fs: &'a dyn FileSystem, project_dir: &'a Path, results_dir: PathBuf) -> Self {
        Self {
            fs,
            project_dir,
            results_dir,
        }
    }

    /// The `-coverageOptions` value for `stage`, or `None` for stages that
    /// take no coverage arguments.
    ///
    /// Only test stages read the project's coverage settings.
    pub fn options_value(&self, stage: Stage) -> Result<Option<String>> {
        let value = match stage {
            Stage::EditMode | Stage::PlayMode => {
                Some(CoverageSettings::load(self.fs, self.project_dir)?.options_value())
            }
            Stage::Coverage => {
                let assembly = find_assembly_filter(self.fs, self.project_dir);
                Some(report_options_value(assembly.as_deref()))
            }
            Stage::Build | Stage::SolutionSync => None,
        };

        if let Some(value) = &value {
            debug!(stage = %stage, options = %value, "coverage options");
        }
        Ok(value)
    }

    /// Full coverage argument fragment for `stage` (empty for stages without
    /// coverage).
    pub fn build(&self, stage: Stage) -> Result<Vec<String>> {
        let Some(options) = self.options_value(stage)? else {
            return Ok(Vec::new());
        };

        let mut args = Vec::with_capacity(6);
        if stage.is_test_run() {
            args.push("-debugCodeOptimization".to_string());
        }
        args.push("-enableCodeCoverage".to_string());
        args.push("-coverageResultsPath".to_string());
        args.push(self.results_dir.display().to_string());
        args.push("-coverageOptions".to_string());
        args.push(options);
        Ok(args)
    }
}
