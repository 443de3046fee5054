// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! Job context the CI host normally exports (branch, job type, report
//! directory) can come from the environment; it is read here, once, and
//! passed down explicitly.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::{default_config_path, ConfigOverrides};

/// Command-line arguments for `unitypipe`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "unitypipe",
    version,
    about = "Run Unity editor pipeline stages in batch mode and classify their outcome.",
    long_about = None
)]
pub struct CliArgs {
    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `UNITYPIPE_LOG` or a default level will be used.
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run stages in the given order.
    Run {
        #[command(flatten)]
        job: JobArgs,

        /// Print the pipeline report as JSON on stdout.
        #[arg(long)]
        json: bool,
    },

    /// Print each stage's command line and log target without running it.
    Plan {
        #[command(flatten)]
        job: JobArgs,
    },

    /// Print the editor version pinned by a project.
    Version {
        /// Project directory containing `ProjectSettings/ProjectVersion.txt`.
        project: PathBuf,

        /// Which value to print.
        #[arg(value_enum)]
        field: VersionField,

        /// Hub editor root, required for `executable-path`.
        #[arg(long, value_name = "PATH", env = "UNITY_HUB_EDITOR_ROOT")]
        hub_root: Option<PathBuf>,
    },

    /// Extract build result and errors from an editor log as JSON.
    ScanLog {
        /// Editor log file (e.g. `build_project.log`).
        log: PathBuf,

        /// Ignore error lines containing any of these keywords.
        #[arg(long, num_args = 0..)]
        exclude: Vec<String>,
    },
}

/// Arguments shared by `run` and `plan`.
#[derive(Debug, Clone, Args)]
pub struct JobArgs {
    /// Path to the config file (TOML).
    #[arg(long, value_name = "PATH", default_value_os_t = default_config_path())]
    pub config: PathBuf,

    /// Stage identifier; repeat for several stages
    /// (EditMode, PlayMode, Coverage, Build/Webgl, SolutionSync/Rider).
    #[arg(long = "stage", value_name = "STAGE", required = true)]
    pub stages: Vec<String>,

    /// Branch being built.
    #[arg(long, env = "BRANCH_NAME")]
    pub branch: Option<String>,

    /// Deployment build (hard-fail on any failing stage).
    #[arg(long, env = "DEPLOYMENT_BUILD")]
    pub deployment: Option<bool>,

    /// Directory receiving logs and results.
    #[arg(long, value_name = "DIR", env = "REPORT_DIR")]
    pub report_root: Option<PathBuf>,

    /// Project directory, overriding `[unity].project_path`.
    #[arg(long, value_name = "DIR")]
    pub project: Option<PathBuf>,
}

impl JobArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            branch: self.branch.clone(),
            deployment: self.deployment,
            report_root: self.report_root.clone(),
            project_path: self.project.clone(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum VersionField {
    Version,
    Revision,
    ExecutablePath,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
