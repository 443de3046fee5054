// src/stage.rs

//! Stage identifier validation and per-stage log targets.
//!
//! Everything here is derived from an explicit [`PipelineContext`]; nothing
//! reads process environment, so resolution is testable without a CI host.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::errors::Result;
use crate::types::Stage;

/// Job-level values the resolver needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineContext {
    /// Branch (or PR source branch) the job is running for.
    pub branch: String,
    /// Directory receiving logs, test results and coverage output.
    pub report_root: PathBuf,
    /// `true` for deployment builds, `false` for pull-request validation.
    pub deployment: bool,
    /// Report URL prefix for deployment builds.
    pub deployment_url: String,
    /// Report URL prefix for pull-request builds.
    pub pr_url: String,
}

impl PipelineContext {
    fn url_prefix(&self) -> &str {
        let prefix = if self.deployment {
            &self.deployment_url
        } else {
            &self.pr_url
        };
        prefix.trim_end_matches('/')
    }

    /// JUnit-style test results file for a test stage.
    pub fn test_results_path(&self, stage: Stage) -> PathBuf {
        self.report_root
            .join("test_results")
            .join(format!("{}-results.xml", stage.name()))
    }

    /// Directory the coverage package writes into and aggregates from.
    pub fn coverage_results_dir(&self) -> PathBuf {
        self.report_root.join("coverage_results")
    }
}

/// Where a stage's editor log lands, locally and once published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageLogTarget {
    pub local_path: PathBuf,
    pub remote_url: String,
}

/// Log location relative to the report root.
fn relative_log_path(stage: Stage) -> &'static str {
    match stage {
        Stage::EditMode => "test_results/EditMode-tests.log",
        Stage::PlayMode => "test_results/PlayMode-tests.log",
        Stage::Coverage => "coverage_results/coverage.log",
        Stage::Build => "build_project_results/build_project.log",
        Stage::SolutionSync => "rider_results/rider.log",
    }
}

/// Resolve the log target of an already-validated stage.
pub fn resolve_log_target(stage: Stage, ctx: &PipelineContext) -> StageLogTarget {
    let relative = relative_log_path(stage);
    StageLogTarget {
        local_path: ctx.report_root.join(Path::new(relative)),
        remote_url: format!("{}/{}/{}", ctx.url_prefix(), ctx.branch, relative),
    }
}

/// Validate a raw stage identifier and resolve its log target.
///
/// Unknown identifiers fail with `ConfigError` listing the valid stages.
pub fn resolve(identifier: &str, ctx: &PipelineContext) -> Result<(Stage, StageLogTarget)> {
    let stage: Stage = identifier.parse()?;
    Ok((stage, resolve_log_target(stage, ctx)))
}

/// Validate a list of identifiers up front, before anything runs.
pub fn parse_stages<S: AsRef<str>>(identifiers: &[S]) -> Result<Vec<Stage>> {
    identifiers.iter().map(|id| id.as_ref().parse()).collect()
}
