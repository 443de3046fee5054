// src/exec/backend.rs

//! Pluggable process executor abstraction.
//!
//! The stage runner hands a finished [`CommandSpec`] to a `ProcessExecutor`
//! and only ever looks at the exit status that comes back.
//!
//! - `RealProcessExecutor` spawns the editor through [`run_process`].
//! - Tests provide their own executor that never spawns anything.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::command::CommandSpec;

use super::process::{run_process, ProcessExit};

/// Trait abstracting how an assembled stage command is run.
///
/// Implementations must not return before the process has exited (or been
/// killed): stages share the project directory and the editor holds a lock
/// on it.
pub trait ProcessExecutor: Send {
    fn run<'a>(
        &'a mut self,
        command: &'a CommandSpec,
    ) -> Pin<Box<dyn Future<Output = ProcessExit> + Send + 'a>>;
}

/// Production executor.
#[derive(Debug, Clone, Default)]
pub struct RealProcessExecutor {
    timeout: Option<Duration>,
}

impl RealProcessExecutor {
    /// `timeout` of `None` waits for the process indefinitely.
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

impl ProcessExecutor for RealProcessExecutor {
    fn run<'a>(
        &'a mut self,
        command: &'a CommandSpec,
    ) -> Pin<Box<dyn Future<Output = ProcessExit> + Send + 'a>> {
        let timeout = self.timeout;
        Box::pin(async move { run_process(command.stage, &command.argv(), timeout).await })
    }
}
