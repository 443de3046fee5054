// tests/pipeline_outcomes.rs

mod common;
use crate::common::builders::{runner, ProjectBuilder, REPORT_ROOT};
use crate::common::{init_tracing, with_timeout, FakeExecutor};

use unitypipe::exit_status;
use unitypipe::logscan::BuildResult;
use unitypipe::outcome::{Classification, NO_EXIT_CODE};
use unitypipe::types::Stage;
use unitypipe::{EXIT_HARD_FAIL, EXIT_SOFT_FAIL};

const ALL_STAGES: [Stage; 5] = [
    Stage::EditMode,
    Stage::PlayMode,
    Stage::Coverage,
    Stage::Build,
    Stage::SolutionSync,
];

#[tokio::test]
async fn all_stages_succeed_in_order() {
    init_tracing();
    let executor = FakeExecutor::new();
    let mut runner = runner(
        ProjectBuilder::new().with_assembly("Game").build(),
        executor.clone(),
        true,
    );

    let report = with_timeout(runner.run_stages(&ALL_STAGES)).await;

    assert!(report.succeeded());
    assert!(!report.aborted);
    assert!(report.skipped.is_empty());
    assert_eq!(executor.executed_stages(), ALL_STAGES.to_vec());
    assert_eq!(exit_status(&report), 0);
}

#[tokio::test]
async fn pull_request_failure_keeps_running() {
    init_tracing();
    let executor = FakeExecutor::new().exit_with(Stage::PlayMode, 3);
    let mut runner = runner(ProjectBuilder::new().build(), executor.clone(), false);

    let report = with_timeout(runner.run_stages(&ALL_STAGES)).await;

    assert!(!report.aborted);
    assert_eq!(report.stages.len(), 5);
    assert_eq!(report.stages[1].classification(), Classification::SoftFail);
    assert_eq!(report.stages[1].outcome.exit_code, 3);
    assert_eq!(report.failed_stages(), vec![Stage::PlayMode]);
    assert_eq!(executor.executed_stages(), ALL_STAGES.to_vec());
    assert_eq!(exit_status(&report), EXIT_SOFT_FAIL);
}

#[tokio::test]
async fn deployment_failure_aborts_remaining_stages() {
    init_tracing();
    let executor = FakeExecutor::new().exit_with(Stage::Coverage, 1);
    let mut runner = runner(ProjectBuilder::new().build(), executor.clone(), true);

    let report = with_timeout(runner.run_stages(&ALL_STAGES)).await;

    assert!(report.aborted);
    assert_eq!(report.stages.len(), 3);
    assert_eq!(report.stages[2].classification(), Classification::HardFail);
    assert_eq!(report.skipped, vec![Stage::Build, Stage::SolutionSync]);
    assert_eq!(
        executor.executed_stages(),
        vec![Stage::EditMode, Stage::PlayMode, Stage::Coverage]
    );
    assert_eq!(exit_status(&report), EXIT_HARD_FAIL);
}

#[tokio::test]
async fn failed_stage_reports_its_published_log() {
    let executor = FakeExecutor::new().exit_with(Stage::EditMode, 2);
    let mut runner = runner(ProjectBuilder::new().build(), executor, false);

    let report = with_timeout(runner.run_stages(&[Stage::EditMode])).await;
    let stage = &report.stages[0];

    assert_eq!(
        stage.log_target.remote_url,
        "https://reports.example.com/pr/feature/login/test_results/EditMode-tests.log"
    );
    assert!(stage.command.is_some());
    assert!(stage.error.is_none());
}

#[tokio::test]
async fn broken_coverage_settings_fail_only_that_stage() {
    init_tracing();
    let executor = FakeExecutor::new();
    let fs = ProjectBuilder::new()
        .with_coverage_settings("this is not json")
        .build();
    let mut runner = runner(fs, executor.clone(), false);

    let report = with_timeout(runner.run_stages(&[Stage::EditMode, Stage::Build])).await;

    let edit_mode = &report.stages[0];
    assert_eq!(edit_mode.classification(), Classification::SoftFail);
    assert_eq!(edit_mode.outcome.exit_code, NO_EXIT_CODE);
    assert!(edit_mode.command.is_none());
    assert!(edit_mode.error.as_deref().unwrap().contains("Settings.json"));

    assert_eq!(report.stages[1].classification(), Classification::Success);
    // The editor is never started for a stage that could not be assembled.
    assert_eq!(executor.executed_stages(), vec![Stage::Build]);
}

#[tokio::test]
async fn broken_coverage_settings_do_not_abort_a_deployment() {
    init_tracing();
    let executor = FakeExecutor::new();
    let fs = ProjectBuilder::new()
        .with_coverage_settings("{")
        .build();
    let mut runner = runner(fs, executor.clone(), true);

    let report = with_timeout(runner.run_stages(&[Stage::PlayMode, Stage::Build])).await;

    assert!(!report.aborted);
    assert!(report.skipped.is_empty());
    assert_eq!(report.stages.len(), 2);
    assert_eq!(report.stages[0].classification(), Classification::SoftFail);
    assert!(report.stages[0].error.as_deref().unwrap().contains("Settings.json"));
    assert_eq!(report.stages[1].classification(), Classification::Success);
    assert_eq!(executor.executed_stages(), vec![Stage::Build]);
    assert_eq!(exit_status(&report), EXIT_SOFT_FAIL);
}

#[tokio::test]
async fn deployment_still_aborts_after_broken_settings_when_a_stage_fails() {
    let executor = FakeExecutor::new().exit_with(Stage::Build, 1);
    let fs = ProjectBuilder::new()
        .with_coverage_settings("{")
        .build();
    let mut runner = runner(fs, executor, true);

    let report = with_timeout(
        runner.run_stages(&[Stage::EditMode, Stage::Build, Stage::SolutionSync]),
    )
    .await;

    assert!(report.aborted);
    assert_eq!(report.stages[1].classification(), Classification::HardFail);
    assert_eq!(report.skipped, vec![Stage::SolutionSync]);
}

#[tokio::test]
async fn timed_out_stage_is_a_failure() {
    let executor = FakeExecutor::new().time_out(Stage::Build);
    let mut runner = runner(ProjectBuilder::new().build(), executor, false);

    let report = with_timeout(runner.run_stages(&[Stage::Build])).await;
    let outcome = &report.stages[0].outcome;

    assert!(outcome.timed_out);
    assert_eq!(outcome.exit_code, NO_EXIT_CODE);
    assert_eq!(outcome.classification, Classification::SoftFail);
}

#[tokio::test]
async fn failed_build_log_is_scanned() {
    init_tracing();
    let log = "\
Loading project
Assets/Scripts/UI/EndModal.cs(12,17): error CS0234: The type or namespace name 'Foo' does not exist
Assets/Scripts/UI/EndModal.cs(12,17): error CS0234: The type or namespace name 'Foo' does not exist
Curl error 42: Callback aborted
Build Finished, Result: Failure.
##### ExitCode
1
";
    let fs = ProjectBuilder::new()
        .with_absolute_file(
            format!("{REPORT_ROOT}/build_project_results/build_project.log"),
            log,
        )
        .build();
    let executor = FakeExecutor::new().exit_with(Stage::Build, 1);
    let mut runner = runner(fs, executor, false);

    let report = with_timeout(runner.run_stages(&[Stage::Build])).await;
    let build_log = report.stages[0].build_log.as_ref().unwrap();

    assert_eq!(build_log.build_result, BuildResult::Failure);
    assert_eq!(build_log.compiler_errors.len(), 1);
    assert_eq!(build_log.compiler_errors[0].file_path, "Assets/Scripts/UI/EndModal.cs");
    assert_eq!(build_log.compiler_errors[0].line_number, Some(12));
    assert_eq!(build_log.exit_code.as_deref(), Some("1"));
    assert!(build_log
        .system_error_messages
        .iter()
        .any(|line| line.starts_with("Curl error")));
}

#[tokio::test]
async fn successful_or_missing_logs_are_not_scanned() {
    let executor = FakeExecutor::new().exit_with(Stage::EditMode, 1);
    let mut runner = runner(ProjectBuilder::new().build(), executor, false);

    let report = with_timeout(runner.run_stages(&[Stage::EditMode, Stage::Build])).await;

    // EditMode failed but wrote no log; Build succeeded.
    assert!(report.stages.iter().all(|s| s.build_log.is_none()));
}

#[tokio::test]
async fn repeated_stage_uses_queued_exits() {
    let executor = FakeExecutor::new()
        .exit_with(Stage::EditMode, 1)
        .exit_with(Stage::EditMode, 0);
    let mut runner = runner(ProjectBuilder::new().build(), executor.clone(), false);

    let report = with_timeout(runner.run_stages(&[Stage::EditMode, Stage::EditMode])).await;

    assert_eq!(report.stages[0].classification(), Classification::SoftFail);
    assert_eq!(report.stages[1].classification(), Classification::Success);
    assert_eq!(executor.executed().len(), 2);
}

#[tokio::test]
async fn report_serializes_for_json_output() {
    let executor = FakeExecutor::new().exit_with(Stage::SolutionSync, 5);
    let mut runner = runner(ProjectBuilder::new().build(), executor, false);

    let report = with_timeout(runner.run_stages(&[Stage::SolutionSync])).await;
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["aborted"], false);
    assert_eq!(json["stages"][0]["outcome"]["stage"], "SolutionSync");
    assert_eq!(json["stages"][0]["outcome"]["classification"], "soft_fail");
    assert_eq!(json["stages"][0]["outcome"]["exit_code"], 5);
}
