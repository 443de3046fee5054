// src/lib.rs

pub mod cli;
pub mod command;
pub mod config;
pub mod coverage;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod logscan;
pub mod outcome;
pub mod project;
pub mod stage;
pub mod types;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::{CliArgs, Command, JobArgs, VersionField};
use crate::config::load_with_overrides;
use crate::engine::{PipelineReport, RunnerSettings, StageRunner};
use crate::exec::RealProcessExecutor;
use crate::fs::{FileSystem, RealFileSystem};
use crate::project::{hub_editor_executable, read_editor_version};
use crate::stage::parse_stages;
use crate::types::Stage;

/// Process exit status when at least one stage soft-failed.
pub const EXIT_SOFT_FAIL: i32 = 1;
/// Process exit status when the pipeline must stop: a hard-failed stage,
/// an invalid configuration, or an interrupted run.
pub const EXIT_HARD_FAIL: i32 = 2;

/// High-level entry point used by `main.rs`. Returns the process exit status.
pub async fn run(args: CliArgs) -> Result<i32> {
    match args.command {
        Command::Run { job, json } => run_job(&job, json).await,
        Command::Plan { job } => plan_job(&job),
        Command::Version {
            project,
            field,
            hub_root,
        } => print_version(&project, field, hub_root.as_deref()),
        Command::ScanLog { log, exclude } => print_log_scan(&log, &exclude),
    }
}

/// Load config and validate every stage identifier before anything runs.
fn prepare_job(
    job: &JobArgs,
    fs: Arc<dyn FileSystem>,
) -> Result<(StageRunner<RealProcessExecutor>, Vec<Stage>)> {
    let cfg = load_with_overrides(&job.config, &job.overrides())
        .with_context(|| format!("loading config {}", job.config.display()))?;
    let stages = parse_stages(&job.stages)?;

    let editor = cfg.editor_executable(fs.as_ref())?;
    info!(editor = %editor.display(), project = %cfg.project_dir().display(), "resolved editor");

    let settings = RunnerSettings {
        editor,
        project_dir: cfg.project_dir().to_path_buf(),
        context: cfg.pipeline_context(),
        build: cfg.build_options(),
        display_wrapper: cfg.display.wrapper.clone(),
        log_scan_exclude: cfg.log_scan.exclude.clone(),
        known_failures: cfg.log_scan.known_failures.clone(),
    };

    let executor = RealProcessExecutor::new(cfg.timeout());
    Ok((StageRunner::new(fs, executor, settings), stages))
}

async fn run_job(job: &JobArgs, json: bool) -> Result<i32> {
    let (mut runner, stages) = prepare_job(job, Arc::new(RealFileSystem))?;

    info!(
        stages = ?stages,
        deployment = runner.settings().context.deployment,
        branch = %runner.settings().context.branch,
        "starting pipeline stages"
    );

    // Dropping the run future kills the running editor (kill_on_drop).
    let report = tokio::select! {
        report = runner.run_stages(&stages) => report,
        signal = tokio::signal::ctrl_c() => {
            signal.context("listening for Ctrl+C")?;
            warn!("interrupted; running stage killed");
            return Ok(EXIT_HARD_FAIL);
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }

    Ok(exit_status(&report))
}

pub fn exit_status(report: &PipelineReport) -> i32 {
    if report.aborted {
        EXIT_HARD_FAIL
    } else if report.succeeded() {
        0
    } else {
        EXIT_SOFT_FAIL
    }
}

fn print_summary(report: &PipelineReport) {
    for stage in &report.stages {
        println!(
            "{:<13} {:<10} exit={:<4} log={}",
            stage.stage().name(),
            stage.classification(),
            stage.outcome.exit_code,
            stage.log_target.remote_url
        );
        if let Some(err) = &stage.error {
            println!("              error: {err}");
        }
    }
    for stage in &report.skipped {
        println!("{:<13} skipped", stage.name());
    }
}

fn plan_job(job: &JobArgs) -> Result<i32> {
    let (runner, stages) = prepare_job(job, Arc::new(RealFileSystem))?;
    let mut status = 0;

    println!("unitypipe plan");
    println!("  branch = {}", runner.settings().context.branch);
    println!("  deployment = {}", runner.settings().context.deployment);
    println!();

    for stage in stages {
        println!("  - {stage}");
        match runner.plan_stage(stage) {
            Ok(planned) => {
                println!("      log: {}", planned.log_target.local_path.display());
                println!("      url: {}", planned.log_target.remote_url);
                println!("      cmd: {}", planned.command.to_command_line());
            }
            Err(err) => {
                println!("      error: {err}");
                status = EXIT_SOFT_FAIL;
            }
        }
    }

    Ok(status)
}

fn print_version(project: &Path, field: VersionField, hub_root: Option<&Path>) -> Result<i32> {
    let version = read_editor_version(&RealFileSystem, project)?;
    match field {
        VersionField::Version => print!("{}", version.version),
        VersionField::Revision => print!("{}", version.revision),
        VersionField::ExecutablePath => {
            let root = hub_root.context("--hub-root (or UNITY_HUB_EDITOR_ROOT) is required")?;
            print!("{}", hub_editor_executable(root, &version).display());
        }
    }
    Ok(0)
}

fn print_log_scan(log: &Path, exclude: &[String]) -> Result<i32> {
    let report = logscan::scan_build_log(&RealFileSystem, log, exclude)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(0)
}
