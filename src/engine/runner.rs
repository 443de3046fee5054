// src/engine/runner.rs

//! Stage runner: resolve -> coverage -> assemble -> execute -> classify.
//!
//! Stages run strictly one at a time. The editor locks the project
//! directory, so a stage's process must have exited before the next stage is
//! even assembled.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::command::{self, BuildOptions, CommandSpec};
use crate::coverage::CoverageOptionsBuilder;
use crate::engine::report::{PipelineReport, StageReport};
use crate::errors::{Result, UnitypipeError};
use crate::exec::ProcessExecutor;
use crate::fs::FileSystem;
use crate::logscan::{find_known_failure, parse_build_log, BuildLogReport};
use crate::outcome::{classify, Classification, ExecutionOutcome, NO_EXIT_CODE};
use crate::stage::{resolve_log_target, PipelineContext, StageLogTarget};
use crate::types::Stage;

/// Everything the runner needs besides the filesystem and the executor.
#[derive(Debug, Clone)]
pub struct RunnerSettings {
    /// Editor executable.
    pub editor: PathBuf,
    pub project_dir: PathBuf,
    pub context: PipelineContext,
    pub build: BuildOptions,
    /// Virtual-display wrapper argv for stages that need a display.
    pub display_wrapper: Vec<String>,
    /// Keywords whose lines are ignored when extracting build errors.
    pub log_scan_exclude: Vec<String>,
    /// Log line fragments identifying well-known failure causes.
    pub known_failures: Vec<String>,
}

/// A stage's command and log target, assembled but not run.
#[derive(Debug, Clone)]
pub struct PlannedStage {
    pub stage: Stage,
    pub log_target: StageLogTarget,
    pub command: CommandSpec,
}

pub struct StageRunner<E: ProcessExecutor> {
    fs: Arc<dyn FileSystem>,
    executor: E,
    settings: RunnerSettings,
}

impl<E: ProcessExecutor> StageRunner<E> {
    pub fn new(fs: Arc<dyn FileSystem>, executor: E, settings: RunnerSettings) -> Self {
        Self {
            fs,
            executor,
            settings,
        }
    }

    pub fn settings(&self) -> &RunnerSettings {
        &self.settings
    }

    /// Build the full command of `stage` without running it.
    ///
    /// Fails with `ParseError` if a test stage's coverage settings file is
    /// not valid JSON.
    pub fn plan_stage(&self, stage: Stage) -> Result<PlannedStage> {
        let settings = &self.settings;
        let ctx = &settings.context;
        let log_target = resolve_log_target(stage, ctx);

        let coverage = CoverageOptionsBuilder::new(
            self.fs.as_ref(),
            &settings.project_dir,
            ctx.coverage_results_dir(),
        )
        .build(stage)?;

        let command = command::assemble(
            stage,
            command::base_args(&settings.editor, &settings.project_dir, &log_target.local_path),
            command::test_args(stage, ctx),
            coverage,
            command::additional_args(stage, &settings.build),
            &settings.display_wrapper,
        );

        Ok(PlannedStage {
            stage,
            log_target,
            command,
        })
    }

    /// Assemble and run one stage.
    ///
    /// A failing process is not an error: it comes back classified in the
    /// report. Only assembly problems are returned as `Err`.
    pub async fn run_stage(&mut self, stage: Stage) -> Result<StageReport> {
        let planned = self.plan_stage(stage)?;

        info!(
            stage = %stage,
            command = %planned.command.to_command_line(),
            log = %planned.log_target.local_path.display(),
            "running stage"
        );

        let exit = self.executor.run(&planned.command).await;
        let outcome = ExecutionOutcome::new(
            stage,
            exit.code,
            exit.timed_out,
            self.settings.context.deployment,
        );

        let build_log = if outcome.classification.is_success() {
            info!(stage = %stage, "stage succeeded");
            None
        } else {
            warn!(
                stage = %stage,
                exit_code = outcome.exit_code,
                timed_out = outcome.timed_out,
                classification = %outcome.classification,
                log_url = %planned.log_target.remote_url,
                "stage failed"
            );
            self.inspect_failed_log(stage, &planned.log_target)
        };

        Ok(StageReport {
            outcome,
            log_target: planned.log_target,
            command: Some(planned.command),
            error: None,
            build_log,
        })
    }

    /// Run `stages` in the given order.
    ///
    /// A hard failure stops the run and lists the remaining stages as
    /// skipped. A soft failure is recorded and the next stage starts.
    pub async fn run_stages(&mut self, stages: &[Stage]) -> PipelineReport {
        let mut report = PipelineReport::default();

        for (idx, &stage) in stages.iter().enumerate() {
            let stage_report = match self.run_stage(stage).await {
                Ok(stage_report) => stage_report,
                Err(err) => {
                    error!(stage = %stage, error = %err, "stage command could not be assembled");
                    self.assembly_failure(stage, &err)
                }
            };

            let abort = stage_report.classification().aborts_pipeline();
            report.stages.push(stage_report);

            if abort {
                report.aborted = true;
                report.skipped = stages[idx + 1..].to_vec();
                error!(
                    stage = %stage,
                    skipped = ?report.skipped,
                    "deployment stage failed; aborting remaining stages"
                );
                break;
            }
        }

        report
    }

    /// Report for a stage whose command could not be built. The editor never
    /// started, so there is no exit code.
    ///
    /// A broken coverage settings file fails the stage that reads it but
    /// never aborts the run, not even a deployment run.
    fn assembly_failure(&self, stage: Stage, err: &UnitypipeError) -> StageReport {
        let classification = match err {
            UnitypipeError::ParseError { .. } => Classification::SoftFail,
            _ => classify(NO_EXIT_CODE, self.settings.context.deployment),
        };

        StageReport {
            outcome: ExecutionOutcome {
                stage,
                exit_code: NO_EXIT_CODE,
                timed_out: false,
                classification,
            },
            log_target: resolve_log_target(stage, &self.settings.context),
            command: None,
            error: Some(err.to_string()),
            build_log: None,
        }
    }

    /// Surface what the editor log says about a failure. Missing logs are
    /// normal (the editor may never have started).
    fn inspect_failed_log(&self, stage: Stage, target: &StageLogTarget) -> Option<BuildLogReport> {
        if !self.fs.is_file(&target.local_path) {
            return None;
        }

        let contents = match self.fs.read_to_string(&target.local_path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!(stage = %stage, error = %e, "cannot read stage log");
                return None;
            }
        };

        if let Some(line) = find_known_failure(&contents, &self.settings.known_failures) {
            warn!(stage = %stage, line = %line.trim(), "known failure found in log");
        }

        match stage {
            Stage::Build => {
                let build_log = parse_build_log(&contents, &self.settings.log_scan_exclude);
                for err in &build_log.compiler_errors {
                    warn!(
                        file = %err.file_path,
                        line = ?err.line_number,
                        code = %err.error_code,
                        "{}",
                        err.error_description
                    );
                }
                Some(build_log)
            }
            Stage::EditMode | Stage::PlayMode | Stage::Coverage | Stage::SolutionSync => None,
        }
    }
}
