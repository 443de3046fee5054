// tests/config_loading.rs

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tempfile::TempDir;

use unitypipe::config::{load_and_validate, load_with_overrides, ConfigOverrides};
use unitypipe::errors::UnitypipeError;
use unitypipe::fs::RealFileSystem;

const MINIMAL: &str = r#"
[unity]
executable = "/opt/Unity/Editor/Unity"

[reports]
deployment_url = "https://reports.example.com/deploy"
pr_url = "https://reports.example.com/pr"
"#;

fn write_config(dir: &TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("Unitypipe.toml");
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn minimal_config_gets_defaults() {
    let dir = TempDir::new().unwrap();
    let cfg = load_and_validate(write_config(&dir, MINIMAL)).unwrap();

    assert_eq!(cfg.project_dir(), Path::new("."));
    assert_eq!(cfg.pipeline.branch, "main");
    assert!(!cfg.pipeline.deployment);
    assert_eq!(cfg.timeout(), None);
    assert_eq!(cfg.build.target, "WebGL");
    assert_eq!(cfg.build.method, "BuildScript.BuildWebGL");
    assert_eq!(cfg.display.wrapper[0], "xvfb-run");
    assert!(cfg.log_scan.exclude.is_empty());

    let ctx = cfg.pipeline_context();
    assert_eq!(ctx.report_root, PathBuf::from("reports"));
    assert_eq!(ctx.pr_url, "https://reports.example.com/pr");
}

#[test]
fn full_config_round_trips_into_settings() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[unity]
project_path = "game"
executable = "/opt/Unity/Editor/Unity"

[pipeline]
branch = "release/1.2"
report_root = "/ci/reports"
deployment = true
timeout_secs = 1800

[reports]
deployment_url = "https://d.example.com"
pr_url = "https://p.example.com"

[build]
target = "StandaloneLinux64"
method = "Builds.Linux"

[display]
wrapper = ["xvfb-run", "-a"]

[log_scan]
exclude = ["Shader"]
known_failures = ["Curl error"]
"#,
    );

    let cfg = load_and_validate(path).unwrap();

    assert_eq!(cfg.project_dir(), Path::new("game"));
    assert_eq!(cfg.timeout(), Some(Duration::from_secs(1800)));
    assert_eq!(cfg.build_options().target, "StandaloneLinux64");
    assert_eq!(cfg.display.wrapper, vec!["xvfb-run", "-a"]);
    assert_eq!(cfg.log_scan.known_failures, vec!["Curl error"]);

    let ctx = cfg.pipeline_context();
    assert!(ctx.deployment);
    assert_eq!(ctx.branch, "release/1.2");
}

#[test]
fn overrides_win_over_file_values() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, MINIMAL);

    let overrides = ConfigOverrides {
        branch: Some("feature/x".to_string()),
        deployment: Some(true),
        report_root: Some(PathBuf::from("/tmp/out")),
        project_path: Some(PathBuf::from("/src/game")),
    };
    let cfg = load_with_overrides(path, &overrides).unwrap();

    assert_eq!(cfg.pipeline.branch, "feature/x");
    assert!(cfg.pipeline.deployment);
    assert_eq!(cfg.pipeline.report_root, PathBuf::from("/tmp/out"));
    assert_eq!(cfg.project_dir(), Path::new("/src/game"));
}

#[test]
fn missing_report_urls_are_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[unity]
executable = "/opt/Unity/Editor/Unity"

[reports]
pr_url = "https://reports.example.com/pr"
"#,
    );

    match load_and_validate(path) {
        Err(UnitypipeError::ConfigError(msg)) => assert!(msg.contains("deployment_url")),
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn editor_location_is_required() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[reports]
deployment_url = "https://d"
pr_url = "https://p"
"#,
    );

    assert!(matches!(
        load_and_validate(path),
        Err(UnitypipeError::ConfigError(_))
    ));
}

#[test]
fn empty_display_wrapper_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, &format!("{MINIMAL}\n[display]\nwrapper = []\n"));

    assert!(matches!(
        load_and_validate(path),
        Err(UnitypipeError::ConfigError(_))
    ));
}

#[test]
fn malformed_toml_is_a_toml_error() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[unity\nexecutable = ");

    assert!(matches!(
        load_and_validate(path),
        Err(UnitypipeError::TomlError(_))
    ));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        load_and_validate(dir.path().join("absent.toml")),
        Err(UnitypipeError::IoError(_))
    ));
}

#[test]
fn hub_editor_is_resolved_from_project_version() {
    let dir = TempDir::new().unwrap();
    let project = dir.path().join("game");
    fs::create_dir_all(project.join("ProjectSettings")).unwrap();
    fs::write(
        project.join("ProjectSettings/ProjectVersion.txt"),
        "m_EditorVersion: 2022.3.10f1\nm_EditorVersionWithRevision: 2022.3.10f1 (ff3792e53c62)\n",
    )
    .unwrap();

    let path = write_config(
        &dir,
        &format!(
            r#"
[unity]
project_path = "{}"
hub_editor_root = "/opt/Unity/Hub/Editor"

[reports]
deployment_url = "https://d"
pr_url = "https://p"
"#,
            project.display()
        ),
    );

    let cfg = load_and_validate(path).unwrap();
    let editor = cfg.editor_executable(&RealFileSystem).unwrap();

    assert_eq!(
        editor,
        PathBuf::from("/opt/Unity/Hub/Editor/2022.3.10f1/Editor/Unity")
    );
}

#[test]
fn hub_editor_without_version_file_fails() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        &format!(
            r#"
[unity]
project_path = "{}"
hub_editor_root = "/opt/Unity/Hub/Editor"

[reports]
deployment_url = "https://d"
pr_url = "https://p"
"#,
            dir.path().display()
        ),
    );

    let cfg = load_and_validate(path).unwrap();
    assert!(cfg.editor_executable(&RealFileSystem).is_err());
}
