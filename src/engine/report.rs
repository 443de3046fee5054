// src/engine/report.rs

use serde::Serialize;

use crate::command::CommandSpec;
use crate::logscan::BuildLogReport;
use crate::outcome::{Classification, ExecutionOutcome};
use crate::stage::StageLogTarget;
use crate::types::Stage;

/// Result of a single stage invocation.
#[derive(Debug, Clone, Serialize)]
pub struct StageReport {
    pub outcome: ExecutionOutcome,
    pub log_target: StageLogTarget,
    /// `None` when the command could not be assembled.
    pub command: Option<CommandSpec>,
    /// Why the command could not be assembled.
    pub error: Option<String>,
    /// Extracted errors of a failed build.
    pub build_log: Option<BuildLogReport>,
}

impl StageReport {
    pub fn stage(&self) -> Stage {
        self.outcome.stage
    }

    pub fn classification(&self) -> Classification {
        self.outcome.classification
    }
}

/// Result of running a list of stages in order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineReport {
    pub stages: Vec<StageReport>,
    /// Stages never started because an earlier stage hard-failed.
    pub skipped: Vec<Stage>,
    pub aborted: bool,
}

impl PipelineReport {
    /// `true` only if every requested stage ran and succeeded.
    pub fn succeeded(&self) -> bool {
        !self.aborted && self.stages.iter().all(|s| s.classification().is_success())
    }

    pub fn failed_stages(&self) -> Vec<Stage> {
        self.stages
            .iter()
            .filter(|s| !s.classification().is_success())
            .map(StageReport::stage)
            .collect()
    }
}
