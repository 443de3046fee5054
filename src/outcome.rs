// src/outcome.rs

//! Exit-code classification.
//!
//! A failing stage never surfaces as an `Err` from this crate. It comes back
//! as a [`Classification`] the caller has to act on.

use std::fmt;

use serde::Serialize;

use crate::types::Stage;

/// Exit code reported for processes that never produced one (spawn failure,
/// timeout, killed by signal).
pub const NO_EXIT_CODE: i32 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Success,
    /// Stage failed; later stages still run and the pipeline ends failed.
    SoftFail,
    /// Stage failed in a deployment run; nothing after it may run or publish.
    HardFail,
}

impl Classification {
    pub fn is_success(&self) -> bool {
        matches!(self, Classification::Success)
    }

    pub fn aborts_pipeline(&self) -> bool {
        matches!(self, Classification::HardFail)
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Classification::Success => "success",
            Classification::SoftFail => "soft-fail",
            Classification::HardFail => "hard-fail",
        })
    }
}

/// Map an exit code to an outcome.
///
/// Deployment runs must never publish an artifact from a failing stage, so
/// any failure there is hard. PR runs keep going to produce a full report.
pub fn classify(exit_code: i32, deployment: bool) -> Classification {
    match (exit_code, deployment) {
        (0, _) => Classification::Success,
        (_, true) => Classification::HardFail,
        (_, false) => Classification::SoftFail,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionOutcome {
    pub stage: Stage,
    pub exit_code: i32,
    pub timed_out: bool,
    pub classification: Classification,
}

impl ExecutionOutcome {
    pub fn new(stage: Stage, exit_code: i32, timed_out: bool, deployment: bool) -> Self {
        // A timed-out run counts as failed even if the kill raced a clean exit.
        let effective = if timed_out && exit_code == 0 {
            NO_EXIT_CODE
        } else {
            exit_code
        };
        Self {
            stage,
            exit_code: effective,
            timed_out,
            classification: classify(effective, deployment),
        }
    }
}
