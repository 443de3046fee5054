#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use unitypipe::command::BuildOptions;
use unitypipe::coverage::settings::settings_path;
use unitypipe::engine::{RunnerSettings, StageRunner};
use unitypipe::exec::ProcessExecutor;
use unitypipe::fs::mock::MockFileSystem;
use unitypipe::stage::PipelineContext;

pub const PROJECT_DIR: &str = "/work/game";
pub const REPORT_ROOT: &str = "/work/reports";
pub const EDITOR: &str = "/opt/Unity/Hub/Editor/2022.3.10f1/Editor/Unity";

/// Builder for an in-memory editor project.
pub struct ProjectBuilder {
    fs: MockFileSystem,
    root: PathBuf,
}

impl ProjectBuilder {
    pub fn new() -> Self {
        Self {
            fs: MockFileSystem::new(),
            root: PathBuf::from(PROJECT_DIR),
        }
    }

    pub fn with_assembly(self, name: &str) -> Self {
        self.with_file(&format!("Assets/Scripts/{name}.asmdef"), "{}")
    }

    /// Coverage settings whose `PathsToExclude` holds `value`.
    pub fn with_paths_to_exclude(self, value: &str) -> Self {
        let nested = serde_json::json!({ "m_Value": value }).to_string();
        let doc = serde_json::json!({
            "m_Name": "Settings",
            "m_Dictionary": {
                "m_DictionaryValues": [
                    { "type": "System.Boolean", "key": "EnableCodeCoverage", "value": "{\"m_Value\":true}" },
                    { "type": "System.String", "key": "PathsToExclude", "value": nested }
                ]
            }
        });
        self.with_coverage_settings(&doc.to_string())
    }

    /// Coverage settings file with arbitrary contents.
    pub fn with_coverage_settings(self, contents: &str) -> Self {
        self.fs.add_file(settings_path(&self.root), contents);
        self
    }

    pub fn with_file(self, relative: &str, contents: &str) -> Self {
        self.fs.add_file(self.root.join(relative), contents);
        self
    }

    /// Add a file at an absolute path (e.g. a stage log under the report root).
    pub fn with_absolute_file(self, path: impl AsRef<Path>, contents: &str) -> Self {
        self.fs.add_file(path, contents);
        self
    }

    pub fn build(self) -> MockFileSystem {
        self.fs
    }
}

impl Default for ProjectBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn pipeline_context(deployment: bool) -> PipelineContext {
    PipelineContext {
        branch: "feature/login".to_string(),
        report_root: PathBuf::from(REPORT_ROOT),
        deployment,
        deployment_url: "https://reports.example.com/deploy".to_string(),
        pr_url: "https://reports.example.com/pr".to_string(),
    }
}

pub fn runner_settings(deployment: bool) -> RunnerSettings {
    RunnerSettings {
        editor: PathBuf::from(EDITOR),
        project_dir: PathBuf::from(PROJECT_DIR),
        context: pipeline_context(deployment),
        build: BuildOptions {
            target: "WebGL".to_string(),
            method: "BuildScript.BuildWebGL".to_string(),
        },
        display_wrapper: vec!["xvfb-run".to_string(), "--auto-servernum".to_string()],
        log_scan_exclude: Vec::new(),
        known_failures: vec!["Curl error".to_string()],
    }
}

pub fn runner<E: ProcessExecutor>(fs: MockFileSystem, executor: E, deployment: bool) -> StageRunner<E> {
    StageRunner::new(Arc::new(fs), executor, runner_settings(deployment))
}
