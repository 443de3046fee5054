// src/command.rs

//! Command-line assembly for a single stage.
//!
//! Assembly is pure: it never touches the filesystem or spawns anything, so
//! the exact argv of every stage can be unit tested.

use std::path::Path;

use serde::Serialize;

use crate::stage::PipelineContext;
use crate::types::Stage;

pub const BATCH_MODE_FLAG: &str = "-batchmode";
pub const NO_GRAPHICS_FLAG: &str = "-nographics";
pub const QUIT_FLAG: &str = "-quit";
pub const RUN_TESTS_FLAG: &str = "-runTests";
pub const TEST_RESULTS_FLAG: &str = "-testResults";

/// Editor method regenerating the IDE solution through the Rider package.
pub const SOLUTION_SYNC_METHOD: &str = "Packages.Rider.Editor.RiderScriptEditor.SyncSolution";

/// How the editor gets (or avoids) a display surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DisplayMode {
    /// Run the whole command under a virtual display (e.g. `xvfb-run`).
    VirtualDisplay(Vec<String>),
    /// Pass `-nographics` to the editor.
    NoGraphics,
}

/// Player build parameters for the `Build` stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    /// Value of `-buildTarget`, e.g. `WebGL`.
    pub target: String,
    /// Static editor method performing the build, e.g. `BuildScript.BuildWebGL`.
    pub method: String,
}

/// Fully assembled invocation of one stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandSpec {
    pub stage: Stage,
    pub base_args: Vec<String>,
    pub test_args: Vec<String>,
    pub coverage_args: Vec<String>,
    pub additional_args: Vec<String>,
    pub display_mode: DisplayMode,
    pub terminate: bool,
}

impl CommandSpec {
    /// Final argument vector; the first element is the program to spawn.
    pub fn argv(&self) -> Vec<String> {
        let mut argv = Vec::new();

        if let DisplayMode::VirtualDisplay(wrapper) = &self.display_mode {
            argv.extend(wrapper.iter().cloned());
        }

        argv.extend(self.base_args.iter().cloned());
        argv.extend(self.test_args.iter().cloned());
        argv.extend(self.coverage_args.iter().cloned());
        argv.extend(self.additional_args.iter().cloned());

        if self.display_mode == DisplayMode::NoGraphics {
            argv.push(NO_GRAPHICS_FLAG.to_string());
        }
        if self.terminate {
            argv.push(QUIT_FLAG.to_string());
        }

        argv
    }

    pub fn contains_arg(&self, arg: &str) -> bool {
        self.argv().iter().any(|a| a == arg)
    }

    /// Shell-quoted rendering for logs and `plan` output.
    pub fn to_command_line(&self) -> String {
        self.argv()
            .iter()
            .map(|arg| shell_quote(arg))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn shell_quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=+*,@%".contains(c));
    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

/// `<editor> -projectPath <project> -batchmode -logFile <log>`
pub fn base_args(editor: &Path, project_dir: &Path, log_file: &Path) -> Vec<String> {
    vec![
        editor.display().to_string(),
        "-projectPath".to_string(),
        project_dir.display().to_string(),
        BATCH_MODE_FLAG.to_string(),
        "-logFile".to_string(),
        log_file.display().to_string(),
    ]
}

/// Test-runner arguments; empty for stages that run no tests.
pub fn test_args(stage: Stage, ctx: &PipelineContext) -> Vec<String> {
    match stage {
        Stage::EditMode | Stage::PlayMode => vec![
            RUN_TESTS_FLAG.to_string(),
            "-testPlatform".to_string(),
            stage.name().to_string(),
            TEST_RESULTS_FLAG.to_string(),
            ctx.test_results_path(stage).display().to_string(),
        ],
        Stage::Coverage | Stage::Build | Stage::SolutionSync => Vec::new(),
    }
}

/// Stage-specific editor method invocation for non-test stages.
pub fn additional_args(stage: Stage, build: &BuildOptions) -> Vec<String> {
    match stage {
        Stage::Build => vec![
            "-buildTarget".to_string(),
            build.target.clone(),
            "-executeMethod".to_string(),
            build.method.clone(),
        ],
        Stage::SolutionSync => vec![
            "-executeMethod".to_string(),
            SOLUTION_SYNC_METHOD.to_string(),
        ],
        Stage::EditMode | Stage::PlayMode | Stage::Coverage => Vec::new(),
    }
}

/// Compose the command of `stage` from its parts.
///
/// - test stages take `test` then `coverage`, `Coverage` takes `coverage`,
///   build-like stages take `additional`;
/// - `PlayMode` and `Build` run under `display_wrapper`, the rest get
///   `-nographics`;
/// - every stage except the test stages gets `-quit`. Test stages must stay
///   resident until the coverage package has flushed its results.
pub fn assemble(
    stage: Stage,
    base: Vec<String>,
    test: Vec<String>,
    coverage: Vec<String>,
    additional: Vec<String>,
    display_wrapper: &[String],
) -> CommandSpec {
    let (test_args, coverage_args, additional_args) = match stage {
        Stage::EditMode | Stage::PlayMode => (test, coverage, Vec::new()),
        Stage::Coverage => (Vec::new(), coverage, Vec::new()),
        Stage::Build | Stage::SolutionSync => (Vec::new(), Vec::new(), additional),
    };

    let display_mode = if stage.needs_display() {
        DisplayMode::VirtualDisplay(display_wrapper.to_vec())
    } else {
        DisplayMode::NoGraphics
    };

    CommandSpec {
        stage,
        base_args: base,
        test_args,
        coverage_args,
        additional_args,
        display_mode,
        terminate: !stage.is_test_run(),
    }
}
