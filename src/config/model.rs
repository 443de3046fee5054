// src/config/model.rs

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::command::BuildOptions;
use crate::errors::Result;
use crate::fs::FileSystem;
use crate::project::{hub_editor_executable, read_editor_version};
use crate::stage::PipelineContext;

/// Configuration as read from `Unitypipe.toml`, before validation.
///
/// ```toml
/// [unity]
/// project_path = "game"
/// hub_editor_root = "/home/ci/Unity/Hub/Editor"
///
/// [pipeline]
/// branch = "feature/login"
/// report_root = "reports"
/// deployment = false
/// timeout_secs = 3600
///
/// [reports]
/// deployment_url = "https://reports.example.com/deploy"
/// pr_url = "https://reports.example.com/pr"
///
/// [build]
/// target = "WebGL"
/// method = "BuildScript.BuildWebGL"
/// ```
///
/// Every section is optional; `[reports]` URLs and one of
/// `unity.executable` / `unity.hub_editor_root` are required by validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub unity: UnitySection,
    #[serde(default)]
    pub pipeline: PipelineSection,
    #[serde(default)]
    pub reports: ReportsSection,
    #[serde(default)]
    pub build: BuildSection,
    #[serde(default)]
    pub display: DisplaySection,
    #[serde(default)]
    pub log_scan: LogScanSection,
}

/// Validated configuration. Only obtainable through `TryFrom<RawConfigFile>`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub unity: UnitySection,
    pub pipeline: PipelineSection,
    pub reports: ReportsSection,
    pub build: BuildSection,
    pub display: DisplaySection,
    pub log_scan: LogScanSection,
}

/// `[unity]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct UnitySection {
    /// Project checkout passed as `-projectPath`.
    #[serde(default = "default_project_path")]
    pub project_path: PathBuf,

    /// Explicit editor binary. Takes precedence over `hub_editor_root`.
    #[serde(default)]
    pub executable: Option<PathBuf>,

    /// Hub install root; the editor is `<root>/<project version>/Editor/Unity`.
    #[serde(default)]
    pub hub_editor_root: Option<PathBuf>,
}

fn default_project_path() -> PathBuf {
    PathBuf::from(".")
}

impl Default for UnitySection {
    fn default() -> Self {
        Self {
            project_path: default_project_path(),
            executable: None,
            hub_editor_root: None,
        }
    }
}

/// `[pipeline]` section: job-level context.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineSection {
    #[serde(default = "default_branch")]
    pub branch: String,

    #[serde(default = "default_report_root")]
    pub report_root: PathBuf,

    /// Deployment build (`true`) or pull-request validation (`false`).
    #[serde(default)]
    pub deployment: bool,

    /// Per-stage process timeout; `0` disables it.
    #[serde(default)]
    pub timeout_secs: u64,
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_report_root() -> PathBuf {
    PathBuf::from("reports")
}

impl Default for PipelineSection {
    fn default() -> Self {
        Self {
            branch: default_branch(),
            report_root: default_report_root(),
            deployment: false,
            timeout_secs: 0,
        }
    }
}

/// `[reports]` section: where published logs can be browsed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportsSection {
    #[serde(default)]
    pub deployment_url: String,
    #[serde(default)]
    pub pr_url: String,
}

/// `[build]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildSection {
    #[serde(default = "default_build_target")]
    pub target: String,
    #[serde(default = "default_build_method")]
    pub method: String,
}

fn default_build_target() -> String {
    "WebGL".to_string()
}

fn default_build_method() -> String {
    "BuildScript.BuildWebGL".to_string()
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            target: default_build_target(),
            method: default_build_method(),
        }
    }
}

/// `[display]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct DisplaySection {
    /// Command prefix providing a virtual display for PlayMode and Build.
    #[serde(default = "default_display_wrapper")]
    pub wrapper: Vec<String>,
}

fn default_display_wrapper() -> Vec<String> {
    vec![
        "xvfb-run".to_string(),
        "--auto-servernum".to_string(),
        "--server-args=-screen 0 640x480x24".to_string(),
    ]
}

impl Default for DisplaySection {
    fn default() -> Self {
        Self {
            wrapper: default_display_wrapper(),
        }
    }
}

/// `[log_scan]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogScanSection {
    /// Lines containing any of these are not reported as build errors.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Log fragments that identify well-known failure causes.
    #[serde(default)]
    pub known_failures: Vec<String>,
}

/// Values supplied on the command line or by the CI environment, applied on
/// top of the file before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub branch: Option<String>,
    pub deployment: Option<bool>,
    pub report_root: Option<PathBuf>,
    pub project_path: Option<PathBuf>,
}

impl RawConfigFile {
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(branch) = &overrides.branch {
            self.pipeline.branch = branch.clone();
        }
        if let Some(deployment) = overrides.deployment {
            self.pipeline.deployment = deployment;
        }
        if let Some(root) = &overrides.report_root {
            self.pipeline.report_root = root.clone();
        }
        if let Some(project) = &overrides.project_path {
            self.unity.project_path = project.clone();
        }
    }
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            unity: raw.unity,
            pipeline: raw.pipeline,
            reports: raw.reports,
            build: raw.build,
            display: raw.display,
            log_scan: raw.log_scan,
        }
    }

    pub fn project_dir(&self) -> &Path {
        &self.unity.project_path
    }

    pub fn pipeline_context(&self) -> PipelineContext {
        PipelineContext {
            branch: self.pipeline.branch.clone(),
            report_root: self.pipeline.report_root.clone(),
            deployment: self.pipeline.deployment,
            deployment_url: self.reports.deployment_url.clone(),
            pr_url: self.reports.pr_url.clone(),
        }
    }

    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            target: self.build.target.clone(),
            method: self.build.method.clone(),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        match self.pipeline.timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// Editor binary: `unity.executable` if set, otherwise the Hub install
    /// matching the project's pinned version.
    pub fn editor_executable(&self, fs: &dyn FileSystem) -> Result<PathBuf> {
        if let Some(exe) = self
            .unity
            .executable
            .as_ref()
            .filter(|p| !p.as_os_str().is_empty())
        {
            return Ok(exe.clone());
        }

        // Validation guarantees one of the two is present.
        let hub_root = self.unity.hub_editor_root.as_deref().unwrap_or(Path::new("."));
        let version = read_editor_version(fs, self.project_dir())?;
        Ok(hub_editor_executable(hub_root, &version))
    }
}
