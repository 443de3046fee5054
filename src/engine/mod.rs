// src/engine/mod.rs

//! Stage orchestration.
//!
//! - [`runner`] turns one stage into a command, runs it through a
//!   [`ProcessExecutor`](crate::exec::ProcessExecutor) and classifies the
//!   result; it also runs a caller-ordered list of stages one after another.
//! - [`report`] holds the per-stage and whole-run results handed back to the
//!   caller.

pub mod report;
pub mod runner;

pub use report::{PipelineReport, StageReport};
pub use runner::{PlannedStage, RunnerSettings, StageRunner};
