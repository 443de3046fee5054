// tests/real_process.rs
#![cfg(unix)]

mod common;
use crate::common::{init_tracing, with_timeout};

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use unitypipe::command::BuildOptions;
use unitypipe::engine::{RunnerSettings, StageRunner};
use unitypipe::exec::RealProcessExecutor;
use unitypipe::fs::RealFileSystem;
use unitypipe::outcome::Classification;
use unitypipe::stage::PipelineContext;
use unitypipe::types::Stage;

/// A stand-in editor: writes its arguments to the `-logFile` path, then runs
/// `body`.
fn fake_editor(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("Unity");
    let script = format!(
        r#"#!/bin/sh
log=""
prev=""
for arg in "$@"; do
  if [ "$prev" = "-logFile" ]; then log="$arg"; fi
  prev="$arg"
done
mkdir -p "$(dirname "$log")"
echo "$@" > "$log"
{body}
"#
    );
    fs::write(&path, script).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn settings(dir: &TempDir, editor: PathBuf) -> RunnerSettings {
    RunnerSettings {
        editor,
        project_dir: dir.path().join("game"),
        context: PipelineContext {
            branch: "main".to_string(),
            report_root: dir.path().join("reports"),
            deployment: false,
            deployment_url: "https://d".to_string(),
            pr_url: "https://p".to_string(),
        },
        build: BuildOptions {
            target: "WebGL".to_string(),
            method: "BuildScript.BuildWebGL".to_string(),
        },
        // `env` runs the editor unchanged.
        display_wrapper: vec!["env".to_string()],
        log_scan_exclude: Vec::new(),
        known_failures: Vec::new(),
    }
}

#[tokio::test]
async fn editor_exit_code_is_classified() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let editor = fake_editor(dir.path(), "exit 3");

    let mut runner = StageRunner::new(
        Arc::new(RealFileSystem),
        RealProcessExecutor::new(None),
        settings(&dir, editor),
    );

    let report = with_timeout(runner.run_stages(&[Stage::EditMode])).await;
    let stage = &report.stages[0];

    assert_eq!(stage.outcome.exit_code, 3);
    assert_eq!(stage.classification(), Classification::SoftFail);

    let log = fs::read_to_string(dir.path().join("reports/test_results/EditMode-tests.log")).unwrap();
    assert!(log.contains("-runTests"));
    assert!(log.contains("-nographics"));
}

#[tokio::test]
async fn wrapped_build_runs_and_scans_its_log() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let editor = fake_editor(
        dir.path(),
        r#"echo "Build Finished, Result: Failure." >> "$log"
exit 1"#,
    );

    let mut runner = StageRunner::new(
        Arc::new(RealFileSystem),
        RealProcessExecutor::new(None),
        settings(&dir, editor),
    );

    let report = with_timeout(runner.run_stages(&[Stage::Build])).await;
    let stage = &report.stages[0];

    assert_eq!(stage.outcome.exit_code, 1);
    let build_log = stage.build_log.as_ref().unwrap();
    assert_eq!(
        build_log.build_result,
        unitypipe::logscan::BuildResult::Failure
    );
}

#[tokio::test]
async fn slow_editor_is_killed_after_timeout() {
    let dir = TempDir::new().unwrap();
    let editor = fake_editor(dir.path(), "sleep 30");

    let mut runner = StageRunner::new(
        Arc::new(RealFileSystem),
        RealProcessExecutor::new(Some(Duration::from_millis(200))),
        settings(&dir, editor),
    );

    let report = with_timeout(runner.run_stages(&[Stage::SolutionSync])).await;
    let outcome = &report.stages[0].outcome;

    assert!(outcome.timed_out);
    assert_eq!(outcome.classification, Classification::SoftFail);
}

#[tokio::test]
async fn missing_editor_is_a_failed_stage() {
    let dir = TempDir::new().unwrap();
    let mut runner = StageRunner::new(
        Arc::new(RealFileSystem),
        RealProcessExecutor::new(None),
        settings(&dir, dir.path().join("no-such-editor")),
    );

    let report = with_timeout(runner.run_stages(&[Stage::Coverage, Stage::SolutionSync])).await;

    assert_eq!(report.stages.len(), 2);
    assert!(report
        .stages
        .iter()
        .all(|s| s.classification() == Classification::SoftFail && s.outcome.exit_code == -1));
}
